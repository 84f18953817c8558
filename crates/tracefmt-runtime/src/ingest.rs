use crate::{Error, FormatOptions, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracefmt_decoder::{
    BufferDecoder, DecodedBuffer, DecoderKind, TraceFile, TraceFileHeader, open_generations,
    select_decoder,
};
use tracefmt_engine::{RunContext, ThreadStream};
use tracefmt_types::ThreadId;

/// Decoded input ready for merging.
#[derive(Debug)]
pub struct Ingested {
    /// Header of the first file; governs the whole run.
    pub header: TraceFileHeader,
    pub first_file: Arc<Path>,
    pub kind: DecoderKind,
    /// One stream per thread, in order of first appearance.
    pub streams: Vec<ThreadStream>,
}

impl Ingested {
    pub fn threads(&self) -> Vec<(ThreadId, Arc<str>)> {
        self.streams
            .iter()
            .map(|s| (s.thread_id(), Arc::clone(s.thread_name())))
            .collect()
    }
}

/// Open every generation, decode every whole buffer and group buffers by thread.
///
/// Only a missing or structurally invalid first file is fatal. Other
/// problems are counted in `ctx` and logged.
pub fn ingest(options: &FormatOptions, ctx: &mut RunContext) -> Result<Ingested> {
    let generations = open_generations(&options.input)?;
    ctx.generations_declared = generations.declared;
    ctx.missing_generations = generations.missing;

    let mut files = generations.files.into_iter();
    let Some(first) = files.next() else {
        return Err(Error::InvalidOperation("no trace files opened".to_string()));
    };
    let header = first.header().clone();
    let first_file = Arc::clone(first.path());

    let kind = select_decoder(header.version, options.force_legacy);
    let decoder = kind.decoder();
    header.check_buffer_size(decoder.min_buffer_size())?;
    log::info!(
        "Trace format {} ({} path, {} byte pointers)",
        header.version,
        if kind.is_eager() { "legacy" } else { "current" },
        header.pointer_width
    );

    let mut streams: Vec<ThreadStream> = Vec::new();
    let mut by_thread: HashMap<ThreadId, usize> = HashMap::new();
    let mut sequence = 0u64;

    log::info!("Starting data extraction from binary trace file(s)");
    for mut file in std::iter::once(first).chain(files) {
        if options.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Err(err) = file.header().check_buffer_size(decoder.min_buffer_size()) {
            log::warn!("Skipping {}: {}", file.path().display(), err);
            ctx.missing_generations.push(file.path().to_path_buf());
            continue;
        }
        ctx.generations_found += 1;
        ctx.observe_start(file.header().start_platform, file.header().start_system);

        let layout = file.geometry().layout();
        if layout.truncated {
            ctx.truncated = true;
            log::warn!(
                "Trace file {} is truncated or corrupted; incomplete data at the end is ignored",
                file.path().display()
            );
        }
        if layout.clamped {
            ctx.clamped_files.push(file.path().to_path_buf());
            log::warn!(
                "Trace file {} holds more buffers than can be indexed; only the first {} are processed",
                file.path().display(),
                layout.count
            );
        }
        if layout.count == 0 {
            log::warn!("{} contains no trace data", file.path().display());
            ctx.empty_files.push(file.path().to_path_buf());
            continue;
        }

        log::info!(
            "Extracting {} buffers from {}",
            layout.count,
            file.path().display()
        );
        ctx.buffers_total += layout.count;

        for index in 0..layout.count {
            let decoded = read_and_decode(&mut file, index, sequence, decoder.as_ref());
            sequence += 1;
            let buffer = match decoded {
                Ok(buffer) => buffer,
                Err(err) => {
                    log::warn!("{}", err);
                    ctx.record_invalid_buffer();
                    continue;
                }
            };

            ctx.observe_buffer(buffer.header(), buffer.scan());
            let thread_id = buffer.header().thread_id;
            let slot = *by_thread.entry(thread_id).or_insert_with(|| {
                streams.push(ThreadStream::new(
                    thread_id,
                    Arc::clone(&buffer.header().thread_name),
                ));
                streams.len() - 1
            });
            streams[slot].push_buffer(buffer);
        }
    }

    log::info!("Sorting buffers for {} threads", streams.len());
    for stream in &mut streams {
        stream.sort();
        if kind.is_eager() {
            stream.load_all();
        }
    }

    Ok(Ingested {
        header,
        first_file,
        kind,
        streams,
    })
}

fn read_and_decode(
    file: &mut TraceFile,
    index: u64,
    sequence: u64,
    decoder: &dyn BufferDecoder,
) -> tracefmt_decoder::Result<DecodedBuffer> {
    let mut raw = file.read_buffer(index)?;
    raw.sequence = sequence;
    log::debug!("Processing buffer {} at {}", index, raw.offset);
    decoder.decode(raw)
}
