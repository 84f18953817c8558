use serde::{Deserialize, Serialize};
use std::fmt;

/// Unsigned 64-bit hardware clock reading.
///
/// Platform and system clocks both occupy the full `u64` range, so values are
/// never routed through signed arithmetic. Differences saturate at zero and
/// products are widened to `u128` before scaling.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeValue(u64);

impl TimeValue {
    pub const ZERO: TimeValue = TimeValue(0);
    pub const MAX: TimeValue = TimeValue(u64::MAX);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Elapsed ticks from `earlier` to `self`, zero when `earlier` is later.
    pub fn span_since(self, earlier: TimeValue) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Signed distance from `origin` to `self` without overflow.
    pub fn offset_from(self, origin: TimeValue) -> i128 {
        self.0 as i128 - origin.0 as i128
    }

    /// `span_a / span_b` in integer arithmetic, `None` when `span_b` is zero.
    pub fn ratio(span_a: u64, span_b: u64) -> Option<u64> {
        span_a.checked_div(span_b)
    }

    /// Sixteen upper-case hex digits.
    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }
}

impl From<u64> for TimeValue {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
