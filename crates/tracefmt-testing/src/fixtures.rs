//! Fixtures for synthetic binary trace files.
//!
//! Layouts mirror the on-disk format: a 64 byte file header, then whole
//! buffers of `buffer_size` bytes starting at `data_start`.

use anyhow::{Result, ensure};
use std::fs;
use std::path::Path;
use tracefmt_types::TracePointType;

const FILE_HEADER_LEN: usize = 64;
const RECORD_HEADER_LEN: usize = 25;
const CURRENT_BUFFER_HEADER_LEN: usize = 64;
const LEGACY_BUFFER_HEADER_LEN: usize = 40;

/// Little-endian parameter bytes in directive order.
#[derive(Debug, Clone, Default)]
pub struct Params {
    bytes: Vec<u8>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn ptr(mut self, value: u64, pointer_width: u8) -> Self {
        let bytes = value.to_le_bytes();
        self.bytes.extend_from_slice(&bytes[..pointer_width as usize]);
        self
    }

    pub fn f64(mut self, value: f64) -> Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn str(mut self, value: &str) -> Self {
        self.bytes
            .extend_from_slice(&(value.len() as u16).to_le_bytes());
        self.bytes.extend_from_slice(value.as_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// One record as written by the trace engine.
#[derive(Debug, Clone)]
pub struct RecordSpec {
    kind: u8,
    type_code: u8,
    tp_id: u32,
    platform: u64,
    system: u64,
    component: String,
    params: Vec<u8>,
}

impl RecordSpec {
    pub fn tracepoint(component: &str, tp_id: u32, tp_type: TracePointType, platform: u64) -> Self {
        Self {
            kind: 0,
            type_code: tp_type.code(),
            tp_id,
            platform,
            system: 0,
            component: component.to_string(),
            params: Vec::new(),
        }
    }

    pub fn event(component: &str, tp_id: u32, platform: u64) -> Self {
        Self::tracepoint(component, tp_id, TracePointType::Normal, platform)
    }

    pub fn entry(component: &str, tp_id: u32, platform: u64) -> Self {
        Self::tracepoint(component, tp_id, TracePointType::Entry, platform)
    }

    pub fn exit(component: &str, tp_id: u32, platform: u64) -> Self {
        Self::tracepoint(component, tp_id, TracePointType::Exit, platform)
    }

    /// In-band marker for records the engine discarded.
    pub fn lost(count: u32, platform: u64) -> Self {
        Self {
            kind: 1,
            type_code: 0,
            tp_id: 0,
            platform,
            system: 0,
            component: String::new(),
            params: count.to_le_bytes().to_vec(),
        }
    }

    /// In-band marker for a ring overwrite.
    pub fn wrap(platform: u64) -> Self {
        Self {
            kind: 2,
            type_code: 0,
            tp_id: 0,
            platform,
            system: 0,
            component: String::new(),
            params: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: u64) -> Self {
        self.system = system;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params.build();
        self
    }

    pub fn with_raw_params(mut self, params: &[u8]) -> Self {
        self.params = params.to_vec();
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let len = RECORD_HEADER_LEN + self.component.len() + self.params.len();
        let mut b = Vec::with_capacity(len);
        b.extend_from_slice(&(len as u16).to_le_bytes());
        b.push(self.kind);
        b.push(self.type_code);
        b.extend_from_slice(&self.tp_id.to_le_bytes());
        b.extend_from_slice(&self.platform.to_le_bytes());
        b.extend_from_slice(&self.system.to_le_bytes());
        b.push(self.component.len() as u8);
        b.extend_from_slice(self.component.as_bytes());
        b.extend_from_slice(&self.params);
        b
    }
}

/// One thread's buffer. Records are listed in logical (oldest first) order.
#[derive(Debug, Clone)]
pub struct BufferSpec {
    thread_id: u64,
    thread_name: String,
    records: Vec<RecordSpec>,
    wrap_after: Option<usize>,
    last_write: (u64, u64),
    corrupt: bool,
}

impl BufferSpec {
    pub fn new(thread_id: u64, thread_name: &str) -> Self {
        Self {
            thread_id,
            thread_name: thread_name.to_string(),
            records: Vec::new(),
            wrap_after: None,
            last_write: (0, 0),
            corrupt: false,
        }
    }

    pub fn record(mut self, record: RecordSpec) -> Self {
        self.records.push(record);
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = RecordSpec>) -> Self {
        self.records.extend(records);
        self
    }

    /// Store the buffer as a wrapped ring: the first `oldest` logical
    /// records are placed physically after the newer ones.
    pub fn wrapped_after(mut self, oldest: usize) -> Self {
        self.wrap_after = Some(oldest);
        self
    }

    pub fn last_write(mut self, platform: u64, system: u64) -> Self {
        self.last_write = (platform, system);
        self
    }

    /// Declare a data length larger than the buffer can hold.
    pub fn corrupt(mut self) -> Self {
        self.corrupt = true;
        self
    }

    /// Encode in the current (5.0+) buffer layout, zero-padded to `buffer_size`.
    pub fn encode_current(&self, buffer_size: usize) -> Result<Vec<u8>> {
        let (oldest, newest) = match self.wrap_after {
            Some(k) => self.records.split_at(k.min(self.records.len())),
            None => (&self.records[..], &[][..]),
        };
        let newest_bytes: Vec<u8> = newest.iter().flat_map(RecordSpec::encode).collect();
        let oldest_bytes: Vec<u8> = oldest.iter().flat_map(RecordSpec::encode).collect();
        let wrap_offset = if self.wrap_after.is_some() {
            newest_bytes.len()
        } else {
            0
        };

        let mut data = newest_bytes;
        data.extend(oldest_bytes);
        let data_len = if self.corrupt {
            buffer_size as u32
        } else {
            data.len() as u32
        };

        let mut b = Vec::with_capacity(buffer_size);
        b.extend_from_slice(&self.thread_id.to_le_bytes());
        b.extend_from_slice(&self.last_write.0.to_le_bytes());
        b.extend_from_slice(&self.last_write.1.to_le_bytes());
        b.extend_from_slice(&(wrap_offset as u32).to_le_bytes());
        b.extend_from_slice(&data_len.to_le_bytes());
        b.extend_from_slice(&padded::<32>(&self.thread_name));
        debug_assert_eq!(b.len(), CURRENT_BUFFER_HEADER_LEN);
        b.extend(data);
        ensure!(
            b.len() <= buffer_size,
            "buffer for thread {:#x} needs {} bytes, buffer size is {}",
            self.thread_id,
            b.len(),
            buffer_size
        );
        b.resize(buffer_size, 0);
        Ok(b)
    }

    /// Encode in the legacy buffer layout, zero-padded to `buffer_size`.
    pub fn encode_legacy(&self, buffer_size: usize) -> Result<Vec<u8>> {
        let mut b = Vec::with_capacity(buffer_size);
        b.extend_from_slice(&self.thread_id.to_le_bytes());
        b.extend_from_slice(&padded::<32>(&self.thread_name));
        debug_assert_eq!(b.len(), LEGACY_BUFFER_HEADER_LEN);
        for record in &self.records {
            b.extend(record.encode());
        }
        if self.corrupt {
            // Length field that overruns the buffer end.
            b.extend_from_slice(&u16::MAX.to_le_bytes());
        }
        ensure!(
            b.len() <= buffer_size,
            "legacy buffer for thread {:#x} needs {} bytes, buffer size is {}",
            self.thread_id,
            b.len(),
            buffer_size
        );
        b.resize(buffer_size, 0);
        Ok(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Current,
    Legacy,
}

/// Builder for a complete trace file.
#[derive(Debug, Clone)]
pub struct TraceFileBuilder {
    magic: [u8; 4],
    major: u16,
    minor: u16,
    pointer_width: u8,
    trace_type: u8,
    buffer_size: u32,
    data_start: u32,
    generations: u32,
    start_platform: u64,
    start_system: u64,
    service_level: String,
    layout: Layout,
    buffers: Vec<BufferSpec>,
    trailing: usize,
}

impl Default for TraceFileBuilder {
    fn default() -> Self {
        Self::current()
    }
}

impl TraceFileBuilder {
    /// Format 5.1 file with 8 byte pointers and 512 byte buffers.
    pub fn current() -> Self {
        Self {
            magic: *b"UTTH",
            major: 5,
            minor: 1,
            pointer_width: 8,
            trace_type: 0,
            buffer_size: 512,
            data_start: FILE_HEADER_LEN as u32,
            generations: 1,
            start_platform: 0,
            start_system: 0,
            service_level: "R51".to_string(),
            layout: Layout::Current,
            buffers: Vec::new(),
            trailing: 0,
        }
    }

    /// Format 4.0 file using the legacy buffer layout.
    pub fn legacy() -> Self {
        Self {
            major: 4,
            minor: 0,
            service_level: "R40".to_string(),
            layout: Layout::Legacy,
            ..Self::current()
        }
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    /// Write buffers in the legacy layout regardless of the header version.
    pub fn legacy_layout(mut self) -> Self {
        self.layout = Layout::Legacy;
        self
    }

    pub fn pointer_width(mut self, width: u8) -> Self {
        self.pointer_width = width;
        self
    }

    pub fn external(mut self) -> Self {
        self.trace_type = 1;
        self
    }

    pub fn buffer_size(mut self, size: u32) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn data_start(mut self, offset: u32) -> Self {
        self.data_start = offset;
        self
    }

    pub fn generations(mut self, count: u32) -> Self {
        self.generations = count;
        self
    }

    pub fn start(mut self, platform: u64, system: u64) -> Self {
        self.start_platform = platform;
        self.start_system = system;
        self
    }

    pub fn service_level(mut self, level: &str) -> Self {
        self.service_level = level.to_string();
        self
    }

    pub fn magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    pub fn buffer(mut self, buffer: BufferSpec) -> Self {
        self.buffers.push(buffer);
        self
    }

    /// Append `bytes` of garbage after the last whole buffer.
    pub fn trailing_bytes(mut self, bytes: usize) -> Self {
        self.trailing = bytes;
        self
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let mut b = Vec::new();
        b.extend_from_slice(&self.magic);
        b.extend_from_slice(&self.major.to_le_bytes());
        b.extend_from_slice(&self.minor.to_le_bytes());
        b.push(self.pointer_width);
        b.push(self.trace_type);
        b.extend_from_slice(&[0, 0]);
        b.extend_from_slice(&self.buffer_size.to_le_bytes());
        b.extend_from_slice(&self.data_start.to_le_bytes());
        b.extend_from_slice(&self.generations.to_le_bytes());
        b.extend_from_slice(&self.start_platform.to_le_bytes());
        b.extend_from_slice(&self.start_system.to_le_bytes());
        b.extend_from_slice(&padded::<16>(&self.service_level));
        b.resize(FILE_HEADER_LEN, 0);

        if (self.data_start as usize) > b.len() {
            b.resize(self.data_start as usize, 0);
        }

        let size = self.buffer_size as usize;
        for buffer in &self.buffers {
            let encoded = match self.layout {
                Layout::Current => buffer.encode_current(size)?,
                Layout::Legacy => buffer.encode_legacy(size)?,
            };
            b.extend(encoded);
        }
        b.extend(std::iter::repeat_n(0xEEu8, self.trailing));
        Ok(b)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.build()?)?;
        Ok(())
    }
}

fn padded<const N: usize>(text: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let len = text.len().min(N);
    out[..len].copy_from_slice(&text.as_bytes()[..len]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_length_is_header_plus_buffers() {
        let bytes = TraceFileBuilder::current()
            .buffer(BufferSpec::new(1, "main").record(RecordSpec::event("vm", 1, 10)))
            .buffer(BufferSpec::new(2, "worker"))
            .trailing_bytes(7)
            .build()
            .unwrap();
        assert_eq!(bytes.len(), 64 + 2 * 512 + 7);
        assert_eq!(&bytes[..4], b"UTTH");
    }

    #[test]
    fn test_record_encoding_length() {
        let record = RecordSpec::event("vm", 3, 99).with_params(Params::new().u32(1));
        let encoded = record.encode();
        assert_eq!(encoded.len(), 25 + 2 + 4);
        assert_eq!(u16::from_le_bytes([encoded[0], encoded[1]]) as usize, encoded.len());
    }

    #[test]
    fn test_oversized_buffer_is_rejected() {
        let mut buffer = BufferSpec::new(1, "main");
        for i in 0..100 {
            buffer = buffer.record(RecordSpec::event("component", i, i as u64));
        }
        let result = TraceFileBuilder::current().buffer(buffer).build();
        assert!(result.is_err());
    }
}
