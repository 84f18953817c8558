use crate::bytes::ByteReader;
use crate::{Error, Result};
use tracefmt_types::{FormatVersion, TimeValue};

/// Eyecatcher at the start of every trace file.
pub const MAGIC: [u8; 4] = *b"UTTH";

/// Size of the fixed file header.
pub const HEADER_LEN: usize = 64;

const SERVICE_LEVEL_LEN: usize = 16;

/// Whether the trace was captured to in-memory rings or streamed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceType {
    Internal,
    External,
}

impl TraceType {
    pub fn label(self) -> &'static str {
        match self {
            TraceType::Internal => "internal",
            TraceType::External => "external",
        }
    }
}

/// Parsed, validated file header. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFileHeader {
    pub version: FormatVersion,
    pub pointer_width: u8,
    pub trace_type: TraceType,
    pub buffer_size: u32,
    pub data_start: u64,
    pub generations: u32,
    pub start_platform: TimeValue,
    pub start_system: TimeValue,
    pub service_level: String,
}

impl TraceFileHeader {
    /// Parse and structurally validate the first [`HEADER_LEN`] bytes of a file.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::header(format!(
                "file is {} bytes, shorter than the {} byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let mut r = ByteReader::new(bytes);
        let magic = r.take(4).ok_or_else(|| Error::header("missing magic"))?;
        if magic != MAGIC {
            return Err(Error::header(format!(
                "bad magic {:02X?}, expected {:02X?}",
                magic, MAGIC
            )));
        }

        let short = || Error::header("header truncated");
        let major = r.u16().ok_or_else(short)?;
        let minor = r.u16().ok_or_else(short)?;
        let pointer_width = r.u8().ok_or_else(short)?;
        let trace_type = match r.u8().ok_or_else(short)? {
            0 => TraceType::Internal,
            1 => TraceType::External,
            other => return Err(Error::header(format!("unknown trace type {}", other))),
        };
        r.skip(2).ok_or_else(short)?;
        let buffer_size = r.u32().ok_or_else(short)?;
        let data_start = r.u32().ok_or_else(short)? as u64;
        let generations = r.u32().ok_or_else(short)?;
        let start_platform = TimeValue::new(r.u64().ok_or_else(short)?);
        let start_system = TimeValue::new(r.u64().ok_or_else(short)?);
        let service_level = r.padded_str(SERVICE_LEVEL_LEN).ok_or_else(short)?;

        if pointer_width != 4 && pointer_width != 8 {
            return Err(Error::header(format!(
                "unsupported pointer width {}",
                pointer_width
            )));
        }
        if data_start < HEADER_LEN as u64 {
            return Err(Error::header(format!(
                "data start {} overlaps the header",
                data_start
            )));
        }
        if buffer_size == 0 {
            return Err(Error::header("buffer size is zero"));
        }

        Ok(Self {
            version: FormatVersion::new(major, minor),
            pointer_width,
            trace_type,
            buffer_size,
            data_start,
            generations,
            start_platform,
            start_system,
            service_level,
        })
    }

    /// Reject buffer sizes that cannot hold a buffer header and one record.
    pub fn check_buffer_size(&self, minimum: usize) -> Result<()> {
        if (self.buffer_size as usize) < minimum {
            return Err(Error::header(format!(
                "buffer size {} is smaller than the minimum {}",
                self.buffer_size, minimum
            )));
        }
        Ok(())
    }
}
