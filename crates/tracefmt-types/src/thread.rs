use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Identity of a traced thread as recorded in buffer headers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ThreadId(u64);

impl ThreadId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// `0x` followed by upper-case hex padded to two digits per pointer byte.
    pub fn to_hex(self, pointer_width: u8) -> String {
        let digits = pointer_width as usize * 2;
        format!("0x{:0digits$X}", self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X}", self.0)
    }
}

/// Thread ids are always hex, with or without a `0x` prefix.
impl FromStr for ThreadId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        u64::from_str_radix(digits, 16)
            .map(ThreadId)
            .map_err(|_| Error::InvalidThreadId(s.to_string()))
    }
}

/// Set of threads selected for rendering; empty means every thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    ids: BTreeSet<ThreadId>,
}

impl ThreadFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ThreadId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Parse a comma separated list such as `0x1a,2b`.
    pub fn parse_list(list: &str) -> Result<Self> {
        let ids = list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(ThreadId::from_str)
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { ids })
    }

    pub fn extend(&mut self, other: ThreadFilter) {
        self.ids.extend(other.ids);
    }

    pub fn is_all(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn matches(&self, id: ThreadId) -> bool {
        self.ids.is_empty() || self.ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!("0x1A".parse::<ThreadId>().unwrap(), ThreadId::new(0x1a));
        assert_eq!("ff".parse::<ThreadId>().unwrap(), ThreadId::new(0xff));
        assert!("zz".parse::<ThreadId>().is_err());
    }

    #[test]
    fn test_hex_padding_follows_pointer_width() {
        let id = ThreadId::new(0xA01);
        assert_eq!(id.to_hex(4), "0x00000A01");
        assert_eq!(id.to_hex(8), "0x0000000000000A01");
    }

    #[test]
    fn test_filter_matching() {
        let filter = ThreadFilter::parse_list("0x10, 0x20,").unwrap();
        assert!(filter.matches(ThreadId::new(0x10)));
        assert!(!filter.matches(ThreadId::new(0x30)));
        assert!(ThreadFilter::all().matches(ThreadId::new(0x30)));
    }

    #[test]
    fn test_filter_rejects_bad_entry() {
        let err = ThreadFilter::parse_list("0x10,nope").unwrap_err();
        assert_eq!(err, Error::InvalidThreadId("nope".to_string()));
    }
}
