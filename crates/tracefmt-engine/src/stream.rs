use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tracefmt_decoder::DecodedBuffer;
use tracefmt_types::{ThreadId, TimeValue, TracePoint};

/// Ordering key: platform time, then arrival order.
type PendingKey = (TimeValue, u64);

/// One thread's tracepoints in chronological order.
///
/// Buffers are held decoded but unmaterialised. Records of a buffer are
/// only built once the buffer might hold the next tracepoint, so memory
/// stays proportional to the buffers that overlap in time.
#[derive(Debug)]
pub struct ThreadStream {
    thread_id: ThreadId,
    thread_name: Arc<str>,
    queued: VecDeque<DecodedBuffer>,
    pending: BTreeMap<PendingKey, TracePoint>,
    buffers: usize,
    indent: usize,
}

impl ThreadStream {
    pub fn new(thread_id: ThreadId, thread_name: Arc<str>) -> Self {
        Self {
            thread_id,
            thread_name,
            queued: VecDeque::new(),
            pending: BTreeMap::new(),
            buffers: 0,
            indent: 0,
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn thread_name(&self) -> &Arc<str> {
        &self.thread_name
    }

    /// Buffers appended to this stream.
    pub fn buffer_count(&self) -> usize {
        self.buffers
    }

    pub fn push_buffer(&mut self, buffer: DecodedBuffer) {
        if self.thread_name.is_empty() && !buffer.header().thread_name.is_empty() {
            self.thread_name = Arc::clone(&buffer.header().thread_name);
        }
        self.buffers += 1;
        self.queued.push_back(buffer);
    }

    /// Stable sort of the queued buffers by earliest record; empty buffers last.
    pub fn sort(&mut self) {
        self.queued
            .make_contiguous()
            .sort_by_key(|buffer| match buffer.scan().first {
                Some(first) => (false, first),
                None => (true, TimeValue::ZERO),
            });
    }

    /// Materialise every queued buffer now.
    pub fn load_all(&mut self) {
        while let Some(buffer) = self.queued.pop_front() {
            self.load(&buffer);
        }
    }

    fn load(&mut self, buffer: &DecodedBuffer) {
        let base = buffer.sequence() << 32;
        for (index, tp) in buffer.records().enumerate() {
            self.pending.insert((tp.platform, base | index as u64), tp);
        }
    }

    /// Load buffers until the pending minimum cannot be undercut by a queued one.
    fn fill(&mut self) {
        loop {
            let Some(front) = self.queued.front() else {
                return;
            };
            let load = match (self.pending.first_key_value(), front.scan().first) {
                (_, None) => true,
                (None, Some(_)) => true,
                (Some(((pending, _), _)), Some(first)) => first <= *pending,
            };
            if !load {
                return;
            }
            if let Some(buffer) = self.queued.pop_front() {
                self.load(&buffer);
            }
        }
    }

    /// Platform time of the next tracepoint.
    pub fn peek_time(&mut self) -> Option<TimeValue> {
        self.fill();
        self.pending.first_key_value().map(|((time, _), _)| *time)
    }

    /// Remove and return the next tracepoint.
    pub fn next_tracepoint(&mut self) -> Option<TracePoint> {
        self.fill();
        self.pending.pop_first().map(|(_, tp)| tp)
    }

    pub fn is_exhausted(&self) -> bool {
        self.queued.is_empty() && self.pending.is_empty()
    }

    pub fn indent_depth(&self) -> usize {
        self.indent
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease the depth, never below zero.
    pub fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }
}
