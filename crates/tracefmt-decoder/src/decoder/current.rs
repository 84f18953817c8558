use super::record::scan_segment;
use super::{BufferDecoder, DecoderKind};
use crate::bytes::ByteReader;
use crate::{BufferHeader, DecodedBuffer, Error, RawBuffer, Result};
use std::sync::Arc;
use tracefmt_types::{ThreadId, TimeValue};

const HEADER_LEN: usize = 64;
const THREAD_NAME_LEN: usize = 32;

/// Buffers from format 5.0 onwards: a 64 byte header carrying last-write
/// clocks and a ring wrap offset, followed by the data region.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentDecoder;

impl BufferDecoder for CurrentDecoder {
    fn kind(&self) -> DecoderKind {
        DecoderKind::Current
    }

    fn header_len(&self) -> usize {
        HEADER_LEN
    }

    fn decode(&self, raw: RawBuffer) -> Result<DecodedBuffer> {
        let offset = raw.offset;
        let invalid = |reason: String| Error::buffer(offset, reason);
        let short = || invalid("buffer shorter than its header".to_string());

        let mut r = ByteReader::new(&raw.bytes);
        let thread_id = ThreadId::new(r.u64().ok_or_else(short)?);
        let write_platform = TimeValue::new(r.u64().ok_or_else(short)?);
        let write_system = TimeValue::new(r.u64().ok_or_else(short)?);
        let wrap_offset = r.u32().ok_or_else(short)? as usize;
        let data_len = r.u32().ok_or_else(short)? as usize;
        let thread_name = r.padded_str(THREAD_NAME_LEN).ok_or_else(short)?;

        let data_end = HEADER_LEN + data_len;
        if data_end > raw.bytes.len() {
            return Err(invalid(format!(
                "data length {} exceeds buffer capacity {}",
                data_len,
                raw.bytes.len() - HEADER_LEN
            )));
        }
        if wrap_offset > data_len {
            return Err(invalid(format!(
                "wrap offset {} beyond data length {}",
                wrap_offset, data_len
            )));
        }

        // Oldest records sit after the wrap point; newest before it.
        let mut records = Vec::new();
        let wrapped = wrap_offset != 0;
        if wrapped {
            let wrap = HEADER_LEN + wrap_offset;
            scan_segment(&raw.bytes, wrap, data_end, &mut records).map_err(&invalid)?;
            scan_segment(&raw.bytes, HEADER_LEN, wrap, &mut records).map_err(&invalid)?;
        } else {
            scan_segment(&raw.bytes, HEADER_LEN, data_end, &mut records).map_err(&invalid)?;
        }

        log::debug!(
            "Buffer at {} belongs to thread {} ({} records{})",
            raw.offset,
            thread_id,
            records.len(),
            if wrapped { ", wrapped" } else { "" }
        );

        let header = BufferHeader {
            thread_id,
            thread_name: Arc::from(thread_name),
            last_write: Some((write_platform, write_system)),
            wrapped,
        };
        Ok(DecodedBuffer::new(raw, header, records))
    }
}
