use super::record::scan_until_terminator;
use super::{BufferDecoder, DecoderKind};
use crate::bytes::ByteReader;
use crate::{BufferHeader, DecodedBuffer, Error, RawBuffer, Result};
use std::sync::Arc;
use tracefmt_types::ThreadId;

const HEADER_LEN: usize = 40;
const THREAD_NAME_LEN: usize = 32;

/// Pre-5.0 buffers: thread id and name only, records until a zero length.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDecoder;

impl BufferDecoder for LegacyDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Legacy
    }

    fn header_len(&self) -> usize {
        HEADER_LEN
    }

    fn decode(&self, raw: RawBuffer) -> Result<DecodedBuffer> {
        let offset = raw.offset;
        let short = || Error::buffer(offset, "buffer shorter than its header");

        let mut r = ByteReader::new(&raw.bytes);
        let thread_id = ThreadId::new(r.u64().ok_or_else(short)?);
        let thread_name = r.padded_str(THREAD_NAME_LEN).ok_or_else(short)?;

        let mut records = Vec::new();
        scan_until_terminator(&raw.bytes, HEADER_LEN, raw.bytes.len(), &mut records)
            .map_err(|reason| Error::buffer(offset, reason))?;

        let header = BufferHeader {
            thread_id,
            thread_name: Arc::from(thread_name),
            last_write: None,
            wrapped: false,
        };
        Ok(DecodedBuffer::new(raw, header, records))
    }
}
