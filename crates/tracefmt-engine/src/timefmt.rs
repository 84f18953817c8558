use crate::RunContext;
use chrono::DateTime;
use tracefmt_types::{FormatVersion, TimeValue};

const NANOS_PER_MS: i128 = 1_000_000;
const NANOS_PER_HOUR: i128 = 3_600_000_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;

/// Renders platform timestamps for the time column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormatter {
    /// Wall clock derived from the system clock and the clock ratio.
    WallClock {
        start_platform: TimeValue,
        start_system_ms: TimeValue,
        ticks_per_ms: u64,
        offset_hours: i32,
    },
    /// Raw platform ticks in hex.
    Raw,
}

impl TimeFormatter {
    /// Wall-clock rendering needs both clocks, available from format 5.1.
    pub fn for_run(version: FormatVersion, ctx: &RunContext, offset_hours: i32) -> Self {
        if !version.supports_dual_clock() {
            return TimeFormatter::Raw;
        }
        TimeFormatter::WallClock {
            start_platform: ctx.overall_start_platform,
            start_system_ms: ctx.overall_start_system,
            ticks_per_ms: ctx.conversion().ticks_per_ms,
            offset_hours,
        }
    }

    pub fn format(&self, time: TimeValue) -> String {
        match self {
            TimeFormatter::Raw => time.to_hex(),
            TimeFormatter::WallClock { .. } => {
                let nanos = self.wall_nanos(time);
                let secs = nanos.div_euclid(NANOS_PER_SEC);
                let sub = nanos.rem_euclid(NANOS_PER_SEC) as u32;
                match i64::try_from(secs)
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, sub))
                {
                    Some(dt) => dt.format("%H:%M:%S%.9f").to_string(),
                    None => time.to_hex(),
                }
            }
        }
    }

    /// Date and time with millisecond precision, for the summary block.
    pub fn format_long(&self, time: TimeValue) -> String {
        match self {
            TimeFormatter::Raw => time.to_hex(),
            TimeFormatter::WallClock { .. } => {
                let ms = self.wall_nanos(time).div_euclid(NANOS_PER_MS);
                match i64::try_from(ms)
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
                {
                    Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
                    None => time.to_hex(),
                }
            }
        }
    }

    /// Nanoseconds since the Unix epoch in the requested time zone.
    fn wall_nanos(&self, time: TimeValue) -> i128 {
        match *self {
            TimeFormatter::Raw => 0,
            TimeFormatter::WallClock {
                start_platform,
                start_system_ms,
                ticks_per_ms,
                offset_hours,
            } => {
                let elapsed = time.offset_from(start_platform) * NANOS_PER_MS
                    / ticks_per_ms.max(1) as i128;
                start_system_ms.as_u64() as i128 * NANOS_PER_MS
                    + elapsed
                    + offset_hours as i128 * NANOS_PER_HOUR
            }
        }
    }

    /// Characters produced by [`format`](Self::format).
    pub fn width(&self) -> usize {
        match self {
            TimeFormatter::Raw => 16,
            TimeFormatter::WallClock { .. } => 18,
        }
    }

    /// Column heading for the time column.
    pub fn heading(&self) -> String {
        match self {
            TimeFormatter::Raw => "Platform Time".to_string(),
            TimeFormatter::WallClock { offset_hours: 0, .. } => "Time (UTC)".to_string(),
            TimeFormatter::WallClock { offset_hours, .. } => {
                format!("Time (UTC{:+})", offset_hours)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(offset_hours: i32) -> TimeFormatter {
        TimeFormatter::WallClock {
            start_platform: TimeValue::new(1_000_000),
            // 2024-01-01T12:00:00Z
            start_system_ms: TimeValue::new(1_704_110_400_000),
            ticks_per_ms: 1_000,
            offset_hours,
        }
    }

    #[test]
    fn test_raw_is_hex() {
        let f = TimeFormatter::Raw;
        assert_eq!(f.format(TimeValue::new(0xABC)), "0000000000000ABC");
        assert_eq!(f.format(TimeValue::MAX), "FFFFFFFFFFFFFFFF");
        assert_eq!(f.width(), 16);
    }

    #[test]
    fn test_wall_clock_scales_ticks() {
        let f = wall(0);
        assert_eq!(f.format(TimeValue::new(1_000_000)), "12:00:00.000000000");
        // 1_500_500 ticks later is 1500.5 ms.
        assert_eq!(f.format(TimeValue::new(2_500_500)), "12:00:01.500500000");
        assert_eq!(f.format(TimeValue::new(2_500_500)).len(), f.width());
    }

    #[test]
    fn test_timezone_offset() {
        assert_eq!(wall(-5).format(TimeValue::new(1_000_000)), "07:00:00.000000000");
        assert_eq!(wall(13).format(TimeValue::new(1_000_000)), "01:00:00.000000000");
        assert_eq!(wall(-5).heading(), "Time (UTC-5)");
        assert_eq!(wall(0).heading(), "Time (UTC)");
    }

    #[test]
    fn test_before_start_does_not_wrap() {
        let f = wall(0);
        assert_eq!(f.format(TimeValue::new(0)), "11:59:59.000000000");
    }

    #[test]
    fn test_long_form() {
        assert_eq!(
            wall(0).format_long(TimeValue::new(1_250_000)),
            "2024-01-01 12:00:00.250"
        );
    }

    #[test]
    fn test_version_selects_mode() {
        let ctx = RunContext::new();
        assert_eq!(
            TimeFormatter::for_run(FormatVersion::new(5, 0), &ctx, 0),
            TimeFormatter::Raw
        );
        assert!(matches!(
            TimeFormatter::for_run(FormatVersion::new(5, 1), &ctx, 0),
            TimeFormatter::WallClock { ticks_per_ms: 1, .. }
        ));
    }
}
