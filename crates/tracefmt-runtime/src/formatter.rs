use crate::config::FORMAT_DIR_ENV;
use crate::{Error, FormatOptions, Result, default_catalog_dir, ingest};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracefmt_catalog::{CatalogSearch, MessageCatalog};
use tracefmt_decoder::{DecoderKind, TraceFileHeader};
use tracefmt_engine::{
    MergeEngine, RenderOptions, Renderer, RunContext, Summary, TITLE, TimeFormatter, write_banner,
};
use tracefmt_types::{ThreadId, TracePoint};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Formatted file written, absent in summary mode.
    pub output: Option<PathBuf>,
    pub summary: Summary,
    pub context: RunContext,
}

/// State built by [`TraceFormatter::prime`].
#[derive(Debug)]
struct Primed {
    header: TraceFileHeader,
    first_file: Arc<Path>,
    threads: Vec<(ThreadId, Arc<str>)>,
    catalog: MessageCatalog,
    engine: MergeEngine,
    renderer: Renderer,
    time: TimeFormatter,
}

/// Drives ingestion, merge and rendering for one set of options.
///
/// A formatter may be reused: every [`prime`](Self::prime) starts from a
/// fresh [`RunContext`].
#[derive(Debug)]
pub struct TraceFormatter {
    options: FormatOptions,
    context: RunContext,
    primed: Option<Primed>,
}

impl TraceFormatter {
    pub fn new(options: FormatOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            context: RunContext::new(),
            primed: None,
        })
    }

    /// Replace the options; the next run starts from scratch.
    pub fn configure(&mut self, options: FormatOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        self.primed = None;
        Ok(())
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Header of the first input file, after [`prime`](Self::prime).
    pub fn header(&self) -> Option<&TraceFileHeader> {
        self.primed.as_ref().map(|p| &p.header)
    }

    /// Threads found in the input, in order of first appearance.
    pub fn threads(&self) -> &[(ThreadId, Arc<str>)] {
        match &self.primed {
            Some(primed) => &primed.threads,
            None => &[],
        }
    }

    /// Ingest and sort the input and load catalogs, without rendering.
    pub fn prime(&mut self) -> Result<()> {
        self.primed = None;
        self.context.reset();

        let ingested = ingest(&self.options, &mut self.context)?;
        let catalog = MessageCatalog::load(&self.catalog_search(&ingested.header, ingested.kind));
        let time = TimeFormatter::for_run(
            ingested.header.version,
            &self.context,
            self.options.timezone_offset(),
        );
        let renderer = Renderer::new(
            RenderOptions {
                indent: self.options.indent,
                debug: self.options.debug,
                user_tag: self.options.user_tag.clone(),
                pointer_width: ingested.header.pointer_width,
                filter: self.options.threads.clone(),
            },
            time.clone(),
        );
        let threads = ingested.threads();
        log::info!("Number of traced threads = {}", threads.len());

        self.primed = Some(Primed {
            header: ingested.header,
            first_file: ingested.first_file,
            threads,
            catalog,
            engine: MergeEngine::new(ingested.streams),
            renderer,
            time,
        });
        Ok(())
    }

    fn catalog_search(&self, header: &TraceFileHeader, kind: DecoderKind) -> CatalogSearch {
        let default_dir = default_catalog_dir(self.options.runtime_home.as_deref());
        let search = CatalogSearch::new(self.options.catalog_dir.as_deref(), default_dir.as_deref());
        match kind {
            DecoderKind::Current => search.standard(&header.service_level),
            DecoderKind::Legacy => {
                let search = search.legacy(&header.service_level);
                match std::env::var_os(FORMAT_DIR_ENV) {
                    Some(dir) => search.with_dir(dir),
                    None => search,
                }
            }
        }
    }

    /// Pull the next tracepoint in global time order, priming on first use.
    ///
    /// Tracepoints of filtered-out threads are skipped; control records are
    /// always returned.
    pub fn next_tracepoint(&mut self) -> Result<Option<TracePoint>> {
        if self.primed.is_none() {
            self.prime()?;
        }
        let Some(primed) = self.primed.as_mut() else {
            return Ok(None);
        };
        loop {
            if self.options.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let Some((_, tp)) = primed.engine.next_tracepoint() else {
                break;
            };
            if !tp.is_normal() || self.options.threads.matches(tp.thread_id) {
                return Ok(Some(tp));
            }
        }
        Ok(None)
    }

    /// No records are left to pull.
    pub fn is_finished(&self) -> bool {
        self.primed
            .as_ref()
            .is_none_or(|primed| primed.engine.is_finished())
    }

    /// Summary of the primed input.
    pub fn summary(&self) -> Result<Summary> {
        let primed = self
            .primed
            .as_ref()
            .ok_or_else(|| Error::InvalidOperation("summary requested before prime".to_string()))?;
        Ok(Summary::build(
            &primed.first_file,
            &primed.header,
            &self.context,
            &primed.threads,
            &primed.time,
        ))
    }

    /// Write the complete formatted document to `out`.
    pub fn format_into<W: Write>(&mut self, out: &mut W) -> Result<Summary> {
        if self.primed.is_none() {
            self.prime()?;
        }
        let summary = self.summary()?;
        let Some(primed) = self.primed.as_mut() else {
            return Err(Error::InvalidOperation("formatter is not primed".to_string()));
        };

        writeln!(out, "{}", TITLE)?;
        writeln!(out)?;
        summary.write_to(out)?;
        writeln!(out, "{}", primed.renderer.headings())?;

        log::info!("Starting formatting of entries");
        loop {
            if self.options.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let Some((index, tp)) = primed.engine.next_tracepoint() else {
                break;
            };
            let Some(stream) = primed.engine.stream_mut(index) else {
                continue;
            };
            if let Some(line) = primed.renderer.render(&tp, stream, &primed.catalog) {
                writeln!(out, "{}", line)?;
                if tp.is_normal() {
                    self.context.tracepoints_formatted += 1;
                }
            }
        }

        write_banner(out, &self.context)?;
        out.flush()?;
        log::info!(
            "Number of formatted tracepoints = {}",
            self.context.tracepoints_formatted
        );
        Ok(summary)
    }

    /// Run to completion. In summary mode the summary goes to `console`;
    /// otherwise the formatted document is written to the output file.
    pub fn run_with<W: Write>(&mut self, console: &mut W) -> Result<RunReport> {
        self.prime()?;

        if self.options.summary_only {
            let summary = self.summary()?;
            summary.write_to(console)?;
            console.flush()?;
            return Ok(RunReport {
                output: None,
                summary,
                context: self.context.clone(),
            });
        }

        let output = self.options.output_path();
        let file = File::create(&output).map_err(|err| {
            Error::Io(io::Error::new(
                err.kind(),
                format!("cannot create {}: {}", output.display(), err),
            ))
        })?;
        let mut writer = BufWriter::new(file);
        let summary = self.format_into(&mut writer)?;
        log::info!("Formatted output written to file: {}", output.display());

        Ok(RunReport {
            output: Some(output),
            summary,
            context: self.context.clone(),
        })
    }

    pub fn run(&mut self) -> Result<RunReport> {
        let stdout = io::stdout();
        let mut console = stdout.lock();
        self.run_with(&mut console)
    }
}
