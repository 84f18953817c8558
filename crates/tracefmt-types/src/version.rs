use serde::{Deserialize, Serialize};
use std::fmt;

/// Trace file format version as declared in the file header.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
}

impl FormatVersion {
    /// Oldest version decoded buffer-by-buffer; anything older is legacy.
    pub const CURRENT_THRESHOLD: FormatVersion = FormatVersion::new(5, 0);

    /// Oldest version whose buffers carry both clocks at write time.
    pub const DUAL_CLOCK: FormatVersion = FormatVersion::new(5, 1);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn is_legacy(self) -> bool {
        self < Self::CURRENT_THRESHOLD
    }

    pub fn supports_dual_clock(self) -> bool {
        self >= Self::DUAL_CLOCK
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_comparison() {
        assert!(FormatVersion::new(4, 9).is_legacy());
        assert!(!FormatVersion::new(5, 0).is_legacy());
        assert!(!FormatVersion::new(5, 0).supports_dual_clock());
        assert!(FormatVersion::new(5, 1).supports_dual_clock());
        assert!(FormatVersion::new(6, 0).supports_dual_clock());
    }

    #[test]
    fn test_display() {
        assert_eq!(FormatVersion::new(5, 1).to_string(), "5.1");
    }
}
