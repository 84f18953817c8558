use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tracefmt_types::{
    SourceLocator, ThreadId, TimeValue, TracePoint, TracePointKind, TracePointType,
};

/// A fixed-size region read from a trace file.
#[derive(Debug, Clone)]
pub struct RawBuffer {
    pub file: Arc<Path>,
    /// Position of the buffer within its file.
    pub index: u64,
    /// Byte offset of the buffer within its file.
    pub offset: u64,
    /// Arrival order across every file of the run; breaks timestamp ties.
    pub sequence: u64,
    pub bytes: Vec<u8>,
}

/// Ownership and write-time information from a buffer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferHeader {
    pub thread_id: ThreadId,
    pub thread_name: Arc<str>,
    /// `(platform, system)` clocks at the last write; absent in legacy buffers.
    pub last_write: Option<(TimeValue, TimeValue)>,
    /// The ring wrapped and records were reordered into logical order.
    pub wrapped: bool,
}

/// Aggregates gathered while indexing a buffer's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferScan {
    /// Earliest platform time of any record.
    pub first: Option<TimeValue>,
    /// Latest platform time of any record.
    pub last: Option<TimeValue>,
    pub records: usize,
    /// Sum of in-band lost-record counts.
    pub lost_records: u64,
}

impl BufferScan {
    pub(crate) fn observe(&mut self, meta: &RecordMeta) {
        self.first = Some(self.first.map_or(meta.platform, |t| t.min(meta.platform)));
        self.last = Some(self.last.map_or(meta.platform, |t| t.max(meta.platform)));
        self.records += 1;
        if let RecordClass::Lost(count) = meta.class {
            self.lost_records += count as u64;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordClass {
    Tracepoint(TracePointType),
    Lost(u32),
    Wrap,
}

/// Pre-validated location and fixed fields of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordMeta {
    pub offset: usize,
    pub class: RecordClass,
    pub tp_id: u32,
    pub platform: TimeValue,
    pub system: TimeValue,
    pub component: Range<usize>,
    pub params: Range<usize>,
}

/// A structurally validated buffer whose records are materialised on demand.
#[derive(Debug, Clone)]
pub struct DecodedBuffer {
    raw: RawBuffer,
    header: BufferHeader,
    records: Vec<RecordMeta>,
    scan: BufferScan,
}

impl DecodedBuffer {
    pub(crate) fn new(raw: RawBuffer, header: BufferHeader, records: Vec<RecordMeta>) -> Self {
        let mut scan = BufferScan::default();
        for meta in &records {
            scan.observe(meta);
        }
        Self {
            raw,
            header,
            records,
            scan,
        }
    }

    pub fn header(&self) -> &BufferHeader {
        &self.header
    }

    pub fn scan(&self) -> &BufferScan {
        &self.scan
    }

    pub fn sequence(&self) -> u64 {
        self.raw.sequence
    }

    pub fn offset(&self) -> u64 {
        self.raw.offset
    }

    pub fn file(&self) -> &Arc<Path> {
        &self.raw.file
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in logical order.
    pub fn records(&self) -> Records<'_> {
        Records {
            buffer: self,
            next: 0,
        }
    }

    fn materialise(&self, meta: &RecordMeta) -> TracePoint {
        let bytes = &self.raw.bytes;
        let kind = match meta.class {
            RecordClass::Tracepoint(tp_type) => TracePointKind::Tracepoint {
                tp_type,
                component: Arc::from(String::from_utf8_lossy(&bytes[meta.component.clone()])),
                tp_id: meta.tp_id,
                params: bytes[meta.params.clone()].to_vec(),
            },
            RecordClass::Lost(count) => TracePointKind::LostRecords { count },
            RecordClass::Wrap => TracePointKind::BufferWrap,
        };

        TracePoint {
            thread_id: self.header.thread_id,
            thread_name: Arc::clone(&self.header.thread_name),
            platform: meta.platform,
            system: meta.system,
            kind,
            source: SourceLocator {
                file: Arc::clone(&self.raw.file),
                offset: self.raw.offset + meta.offset as u64,
            },
        }
    }
}

/// Lazy iterator over a buffer's records.
pub struct Records<'a> {
    buffer: &'a DecodedBuffer,
    next: usize,
}

impl Iterator for Records<'_> {
    type Item = TracePoint;

    fn next(&mut self) -> Option<Self::Item> {
        let meta = self.buffer.records.get(self.next)?;
        self.next += 1;
        Some(self.buffer.materialise(meta))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.records.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Records<'_> {}
