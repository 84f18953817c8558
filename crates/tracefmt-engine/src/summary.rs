use crate::{RunContext, TimeFormatter};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracefmt_decoder::TraceFileHeader;
use tracefmt_types::ThreadId;

const TAB: &str = "        ";

/// Title written at the top of every formatted file.
pub const TITLE: &str = "                Trace Formatted Data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSummary {
    pub trace_started: String,
    pub last_buffer_write: String,
    pub span_platform: u64,
    pub span_system_ms: u64,
    pub ticks_per_ms: u64,
}

/// Statistics shown before the formatted entries, or alone in summary mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub file: String,
    pub version: String,
    pub trace_type: String,
    pub pointer_width: u8,
    pub buffer_size: u32,
    pub service_level: String,
    pub generations_declared: u32,
    pub generations_found: usize,
    pub missing_generations: Vec<String>,
    pub buffers_total: u64,
    pub buffers_processed: u64,
    pub threads: Vec<ThreadSummary>,
    pub clock: Option<ClockSummary>,
    pub first_tracepoint: String,
    pub last_tracepoint: String,
    pub lost_records: u64,
    pub invalid_buffers: u64,
    pub truncated: bool,
}

impl Summary {
    pub fn build(
        file: &Path,
        header: &TraceFileHeader,
        ctx: &RunContext,
        threads: &[(ThreadId, Arc<str>)],
        time: &TimeFormatter,
    ) -> Self {
        let mut threads: Vec<_> = threads.to_vec();
        threads.sort_by_key(|(id, _)| *id);
        let threads = threads
            .into_iter()
            .map(|(id, name)| ThreadSummary {
                id: id.to_hex(header.pointer_width),
                name: name.to_string(),
            })
            .collect();

        let clock = header.version.supports_dual_clock().then(|| {
            let conversion = ctx.conversion();
            let (write_platform, _) = ctx.last_write();
            ClockSummary {
                trace_started: time.format_long(ctx.overall_start_platform),
                last_buffer_write: time.format_long(write_platform),
                span_platform: conversion.span_platform,
                span_system_ms: conversion.span_system,
                ticks_per_ms: conversion.ticks_per_ms,
            }
        });

        Self {
            file: file.display().to_string(),
            version: header.version.to_string(),
            trace_type: header.trace_type.label().to_string(),
            pointer_width: header.pointer_width,
            buffer_size: header.buffer_size,
            service_level: header.service_level.clone(),
            generations_declared: ctx.generations_declared,
            generations_found: ctx.generations_found,
            missing_generations: ctx
                .missing_generations
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            buffers_total: ctx.buffers_total,
            buffers_processed: ctx.buffers_processed,
            threads,
            clock,
            first_tracepoint: time.format(ctx.first_tracepoint()),
            last_tracepoint: time.format(ctx.last_tracepoint()),
            lost_records: ctx.lost_records,
            invalid_buffers: ctx.invalid_buffers,
            truncated: ctx.truncated,
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "                Trace Summary")?;
        writeln!(out)?;
        writeln!(out, "Trace file       : {}", self.file)?;
        writeln!(out, "Format version   : {}", self.version)?;
        writeln!(out, "Trace type       : {}", self.trace_type)?;
        writeln!(out, "Pointer size     : {}", self.pointer_width)?;
        writeln!(out, "Buffer size      : {}", self.buffer_size)?;
        writeln!(out, "Service level    : {}", self.service_level)?;
        writeln!(
            out,
            "Generations      : {} of {}",
            self.generations_found, self.generations_declared
        )?;
        for missing in &self.missing_generations {
            writeln!(out, "{}missing: {}", TAB, missing)?;
        }
        writeln!(
            out,
            "Buffers          : {} of {}",
            self.buffers_processed, self.buffers_total
        )?;
        writeln!(out)?;

        writeln!(out, "Active Threads :")?;
        for thread in &self.threads {
            writeln!(out, "{}{}  {}", TAB, thread.id, thread.name)?;
        }
        writeln!(out)?;

        if let Some(clock) = &self.clock {
            writeln!(out, "Trace started    : {}", clock.trace_started)?;
            writeln!(out)?;
            writeln!(out, "Last buffer write: {}", clock.last_buffer_write)?;
            writeln!(out)?;
            writeln!(
                out,
                "Clock ratio      : {} platform ticks per ms ({} ticks over {} ms)",
                clock.ticks_per_ms, clock.span_platform, clock.span_system_ms
            )?;
            writeln!(out)?;
        }

        writeln!(out, "First tracepoint:  {}", self.first_tracepoint)?;
        writeln!(out)?;
        writeln!(out, "Last tracepoint :  {}", self.last_tracepoint)?;
        writeln!(out)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Completion banner closing every formatted file.
pub fn write_banner<W: Write>(out: &mut W, ctx: &RunContext) -> io::Result<()> {
    writeln!(
        out,
        "*** Formatting complete: {} tracepoints formatted",
        ctx.tracepoints_formatted
    )?;
    if ctx.lost_records > 0 {
        writeln!(
            out,
            "*** {} records were discarded during trace data generation",
            ctx.lost_records
        )?;
    }
    if ctx.invalid_buffers > 0 {
        writeln!(
            out,
            "*** {} buffers failed validation and were skipped",
            ctx.invalid_buffers
        )?;
    }
    if ctx.buffers_processed < ctx.buffers_total {
        writeln!(
            out,
            "*** {}/{} buffers processed successfully",
            ctx.buffers_processed, ctx.buffers_total
        )?;
    }
    for missing in &ctx.missing_generations {
        writeln!(out, "*** Trace file {} is missing", missing.display())?;
    }
    for clamped in &ctx.clamped_files {
        writeln!(
            out,
            "*** Trace file {} holds more buffers than can be indexed; the rest were skipped",
            clamped.display()
        )?;
    }
    if ctx.truncated {
        writeln!(
            out,
            " NOTE - PROBLEMS WERE ENCOUNTERED PROCESSING THE TRACE FILE(S), MOST LIKELY DUE TO TRACE FILE CORRUPTION OR TRUNCATION"
        )?;
        writeln!(
            out,
            " THE CONTENT OF THIS FORMATTED FILE COULD THEREFORE BE TRUNCATED OR CORRUPTED ALSO - REFER TO FORMATTER OUTPUT FOR FURTHER DETAILS"
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tracefmt_decoder::TraceType;
    use tracefmt_types::{FormatVersion, TimeValue};

    fn header(minor: u16) -> TraceFileHeader {
        TraceFileHeader {
            version: FormatVersion::new(5, minor),
            pointer_width: 4,
            trace_type: TraceType::Internal,
            buffer_size: 512,
            data_start: 64,
            generations: 1,
            start_platform: TimeValue::new(100),
            start_system: TimeValue::new(0),
            service_level: "R51".to_string(),
        }
    }

    fn ctx() -> RunContext {
        let mut ctx = RunContext::new();
        ctx.observe_start(TimeValue::new(0x100), TimeValue::ZERO);
        ctx.first_platform = Some(TimeValue::new(0x110));
        ctx.last_platform = Some(TimeValue::new(0x1FF));
        ctx.generations_declared = 1;
        ctx.generations_found = 1;
        ctx.buffers_total = 2;
        ctx.buffers_processed = 2;
        ctx
    }

    #[test]
    fn test_summary_without_dual_clock() {
        let threads = vec![
            (ThreadId::new(0x20), Arc::from("worker")),
            (ThreadId::new(0x10), Arc::from("main")),
        ];
        let summary = Summary::build(
            Path::new("run.trc"),
            &header(0),
            &ctx(),
            &threads,
            &TimeFormatter::Raw,
        );
        assert!(summary.clock.is_none());
        assert_eq!(summary.threads[0].id, "0x00000010");

        let mut out = Vec::new();
        summary.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("                Trace Summary\n\n"));
        assert!(text.contains("Active Threads :\n        0x00000010  main\n        0x00000020  worker\n"));
        assert!(text.contains("First tracepoint:  0000000000000110\n"));
        assert!(text.contains("Last tracepoint :  00000000000001FF\n"));
        assert!(!text.contains("Clock ratio"));
    }

    #[test]
    fn test_summary_with_dual_clock() {
        let summary = Summary::build(
            Path::new("run.trc"),
            &header(1),
            &ctx(),
            &[],
            &TimeFormatter::Raw,
        );
        let clock = summary.clock.unwrap();
        assert_eq!(clock.ticks_per_ms, 1);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = Summary::build(
            Path::new("run.trc"),
            &header(0),
            &ctx(),
            &[],
            &TimeFormatter::Raw,
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["buffer_size"], 512);
        assert_eq!(json["truncated"], false);
    }

    #[test]
    fn test_clean_banner() {
        let mut ctx = ctx();
        ctx.tracepoints_formatted = 4;
        let mut out = Vec::new();
        write_banner(&mut out, &ctx).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "*** Formatting complete: 4 tracepoints formatted\n"
        );
    }

    #[test]
    fn test_degraded_banner() {
        let mut ctx = ctx();
        ctx.lost_records = 3;
        ctx.invalid_buffers = 1;
        ctx.buffers_processed = 1;
        ctx.truncated = true;
        ctx.missing_generations = vec![PathBuf::from("t1.trc")];
        ctx.clamped_files = vec![PathBuf::from("t0.trc")];
        let mut out = Vec::new();
        write_banner(&mut out, &ctx).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("*** 3 records were discarded"));
        assert!(text.contains("*** 1 buffers failed validation"));
        assert!(text.contains("*** 1/2 buffers processed successfully"));
        assert!(text.contains("*** Trace file t1.trc is missing"));
        assert!(text.contains("*** Trace file t0.trc holds more buffers than can be indexed"));
        assert!(text.contains(" NOTE - PROBLEMS WERE ENCOUNTERED"));
    }
}
