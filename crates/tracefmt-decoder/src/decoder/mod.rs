//! Buffer decoding strategies.
//!
//! Two on-disk buffer layouts exist. Which one applies is decided once per
//! run by [`select_decoder`] from the first file's header version and the
//! legacy override flag.

mod current;
mod legacy;
pub(crate) mod record;

pub use current::CurrentDecoder;
pub use legacy::LegacyDecoder;
pub use record::RECORD_HEADER_LEN;

use crate::{DecodedBuffer, RawBuffer, Result};
use tracefmt_types::FormatVersion;

/// Turns one raw buffer into a validated, lazily materialised record sequence.
pub trait BufferDecoder: Send + Sync {
    fn kind(&self) -> DecoderKind;

    /// Bytes occupied by the per-buffer header.
    fn header_len(&self) -> usize;

    /// Smallest buffer that can hold the header and one record.
    fn min_buffer_size(&self) -> usize {
        self.header_len() + RECORD_HEADER_LEN
    }

    /// Validate a buffer and index its records in logical order.
    fn decode(&self, raw: RawBuffer) -> Result<DecodedBuffer>;
}

/// Processing path for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderKind {
    /// Whole-file eager decode before any output.
    Legacy,
    /// Per-buffer decode on demand during the merge.
    Current,
}

impl DecoderKind {
    pub fn decoder(self) -> Box<dyn BufferDecoder> {
        match self {
            DecoderKind::Legacy => Box::new(LegacyDecoder),
            DecoderKind::Current => Box::new(CurrentDecoder),
        }
    }

    pub fn is_eager(self) -> bool {
        matches!(self, DecoderKind::Legacy)
    }
}

/// Pick the processing path from the header version and the override flag.
pub fn select_decoder(version: FormatVersion, force_legacy: bool) -> DecoderKind {
    if force_legacy || version.is_legacy() {
        DecoderKind::Legacy
    } else {
        DecoderKind::Current
    }
}
