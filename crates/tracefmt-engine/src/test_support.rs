use crate::ThreadStream;
use std::path::Path;
use std::sync::Arc;
use tracefmt_decoder::{BufferDecoder, CurrentDecoder, DecodedBuffer, RawBuffer};
use tracefmt_testing::{BufferSpec, RecordSpec};
use tracefmt_types::ThreadId;

pub const BUFFER_SIZE: usize = 512;

pub fn decoded(sequence: u64, spec: BufferSpec) -> DecodedBuffer {
    let raw = RawBuffer {
        file: Arc::from(Path::new("run.trc")),
        index: sequence,
        offset: 64 + sequence * BUFFER_SIZE as u64,
        sequence,
        bytes: spec.encode_current(BUFFER_SIZE).unwrap(),
    };
    CurrentDecoder.decode(raw).unwrap()
}

/// A stream for `thread_id` with one buffer per record list.
pub fn stream(thread_id: u64, buffers: &[(u64, Vec<RecordSpec>)]) -> ThreadStream {
    let mut stream = ThreadStream::new(ThreadId::new(thread_id), Arc::from(""));
    for (sequence, records) in buffers {
        let spec = BufferSpec::new(thread_id, &format!("thread-{}", thread_id))
            .records(records.iter().cloned());
        stream.push_buffer(decoded(*sequence, spec));
    }
    stream.sort();
    stream
}

pub fn events(component: &str, times: &[u64]) -> Vec<RecordSpec> {
    times
        .iter()
        .enumerate()
        .map(|(i, t)| RecordSpec::event(component, i as u32, *t))
        .collect()
}
