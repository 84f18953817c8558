use serde::Serialize;
use std::path::PathBuf;
use tracefmt_decoder::{BufferHeader, BufferScan};
use tracefmt_types::TimeValue;

/// Aggregates for one formatting run.
///
/// Created fresh (or [`reset`](Self::reset)) at the start of every run and
/// passed by reference through ingestion, summary and rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunContext {
    /// Latest start platform time declared by any file header.
    pub overall_start_platform: TimeValue,
    /// Latest start system time declared by any file header.
    pub overall_start_system: TimeValue,
    pub last_write_platform: TimeValue,
    pub last_write_system: TimeValue,
    pub first_platform: Option<TimeValue>,
    pub last_platform: Option<TimeValue>,
    /// Records the trace engine reported as discarded.
    pub lost_records: u64,
    pub invalid_buffers: u64,
    pub buffers_total: u64,
    pub buffers_processed: u64,
    /// Some input was truncated or otherwise inconsistent with its header.
    pub truncated: bool,
    pub generations_declared: u32,
    pub generations_found: usize,
    pub missing_generations: Vec<PathBuf>,
    pub empty_files: Vec<PathBuf>,
    /// Files holding more buffers than could be indexed; the excess was skipped.
    pub clamped_files: Vec<PathBuf>,
    pub tracepoints_formatted: u64,
}

/// Platform ticks per millisecond of system time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockConversion {
    pub span_platform: u64,
    pub span_system: u64,
    pub ticks_per_ms: u64,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a file's start clocks. Keeps the maximum seen, treating zero as unset.
    pub fn observe_start(&mut self, platform: TimeValue, system: TimeValue) {
        if self.overall_start_platform.is_zero() || platform > self.overall_start_platform {
            self.overall_start_platform = platform;
        }
        if self.overall_start_system.is_zero() || system > self.overall_start_system {
            self.overall_start_system = system;
        }
    }

    /// Fold a successfully decoded buffer into the run totals.
    pub fn observe_buffer(&mut self, header: &BufferHeader, scan: &BufferScan) {
        self.buffers_processed += 1;
        if let Some((platform, system)) = header.last_write {
            self.last_write_platform = self.last_write_platform.max(platform);
            self.last_write_system = self.last_write_system.max(system);
        }
        if let Some(first) = scan.first {
            self.first_platform = Some(self.first_platform.map_or(first, |t| t.min(first)));
        }
        if let Some(last) = scan.last {
            self.last_platform = Some(self.last_platform.map_or(last, |t| t.max(last)));
        }
        self.lost_records += scan.lost_records;
    }

    pub fn record_invalid_buffer(&mut self) {
        self.invalid_buffers += 1;
    }

    /// Last write clocks, falling back to the start clocks when no buffer carried them.
    pub fn last_write(&self) -> (TimeValue, TimeValue) {
        if self.last_write_platform.is_zero() && self.last_write_system.is_zero() {
            (self.overall_start_platform, self.overall_start_system)
        } else {
            (self.last_write_platform, self.last_write_system)
        }
    }

    pub fn first_tracepoint(&self) -> TimeValue {
        self.first_platform.unwrap_or(self.overall_start_platform)
    }

    pub fn last_tracepoint(&self) -> TimeValue {
        self.last_platform.unwrap_or(self.overall_start_platform)
    }

    /// Ratio of the platform and system clock spans from start to last write.
    ///
    /// Defaults to one tick per millisecond when the start system time was
    /// never set or the system span is zero.
    pub fn conversion(&self) -> ClockConversion {
        let (write_platform, write_system) = self.last_write();
        let span_platform = write_platform.span_since(self.overall_start_platform);
        let span_system = write_system.span_since(self.overall_start_system);

        let ticks_per_ms = if self.overall_start_system.is_zero() {
            None
        } else {
            TimeValue::ratio(span_platform, span_system)
        }
        .filter(|ratio| *ratio != 0)
        .unwrap_or(1);

        log::debug!(
            "Clock spans: platform {} system {} ratio {}",
            span_platform,
            span_system,
            ticks_per_ms
        );

        ClockConversion {
            span_platform,
            span_system,
            ticks_per_ms,
        }
    }

    /// Any condition that means the output may be incomplete.
    pub fn is_degraded(&self) -> bool {
        self.truncated
            || self.invalid_buffers > 0
            || self.lost_records > 0
            || !self.missing_generations.is_empty()
            || !self.clamped_files.is_empty()
            || self.buffers_processed < self.buffers_total
    }
}
