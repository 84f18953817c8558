use crate::ThreadStream;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracefmt_types::{TimeValue, TracePoint};

/// K-way merge of thread streams by platform time.
///
/// The heap is keyed by `(pending time, stream index)`, so among streams
/// whose next tracepoints share a timestamp the lowest index is emitted first.
#[derive(Debug)]
pub struct MergeEngine {
    streams: Vec<ThreadStream>,
    heap: BinaryHeap<Reverse<(TimeValue, usize)>>,
}

impl MergeEngine {
    pub fn new(mut streams: Vec<ThreadStream>) -> Self {
        let mut heap = BinaryHeap::with_capacity(streams.len());
        for (index, stream) in streams.iter_mut().enumerate() {
            if let Some(time) = stream.peek_time() {
                heap.push(Reverse((time, index)));
            }
        }
        Self { streams, heap }
    }

    /// Next tracepoint in global order, with the index of its stream.
    pub fn next_tracepoint(&mut self) -> Option<(usize, TracePoint)> {
        while let Some(Reverse((_, index))) = self.heap.pop() {
            let stream = &mut self.streams[index];
            let Some(tp) = stream.next_tracepoint() else {
                continue;
            };
            if let Some(time) = stream.peek_time() {
                self.heap.push(Reverse((time, index)));
            }
            return Some((index, tp));
        }
        None
    }

    pub fn stream_mut(&mut self, index: usize) -> Option<&mut ThreadStream> {
        self.streams.get_mut(index)
    }

    pub fn streams(&self) -> &[ThreadStream] {
        &self.streams
    }

    pub fn is_finished(&self) -> bool {
        self.heap.is_empty()
    }
}
