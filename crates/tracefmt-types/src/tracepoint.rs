use crate::{Error, Result, ThreadId, TimeValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Call-nesting role of a tracepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TracePointType {
    Normal,
    Exception,
    Entry,
    EntryException,
    Exit,
    ExitException,
}

impl TracePointType {
    /// Decode the numeric code shared by trace records and catalog lines.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::Normal),
            1 => Ok(Self::Exception),
            2 => Ok(Self::Entry),
            3 => Ok(Self::EntryException),
            4 => Ok(Self::Exit),
            5 => Ok(Self::ExitException),
            other => Err(Error::UnknownTypeCode(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Exception => 1,
            Self::Entry => 2,
            Self::EntryException => 3,
            Self::Exit => 4,
            Self::ExitException => 5,
        }
    }

    /// Column label used in formatted output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Event",
            Self::Exception => "Exception",
            Self::Entry => "Entry",
            Self::EntryException => "EntryExcp",
            Self::Exit => "Exit",
            Self::ExitException => "ExitExcp",
        }
    }

    /// Opens a nesting level before rendering.
    pub fn is_entry(self) -> bool {
        matches!(self, Self::Entry | Self::EntryException)
    }

    /// Closes a nesting level after rendering.
    pub fn is_exit(self) -> bool {
        matches!(self, Self::Exit | Self::ExitException)
    }
}

impl fmt::Display for TracePointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload of a decoded record.
///
/// Only `Tracepoint` carries instrumented data; the other variants are
/// control records written by the trace engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TracePointKind {
    Tracepoint {
        tp_type: TracePointType,
        component: Arc<str>,
        tp_id: u32,
        params: Vec<u8>,
    },
    /// The engine discarded `count` records before this point.
    LostRecords { count: u32 },
    /// The thread's ring buffer wrapped and overwrote older records.
    BufferWrap,
}

/// Where a record was found in the binary input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    pub file: Arc<Path>,
    pub offset: u64,
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@0x{:X}", self.file.display(), self.offset)
    }
}

/// One decoded record from one thread's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracePoint {
    pub thread_id: ThreadId,
    pub thread_name: Arc<str>,
    pub platform: TimeValue,
    pub system: TimeValue,
    pub kind: TracePointKind,
    pub source: SourceLocator,
}

impl TracePoint {
    pub fn is_normal(&self) -> bool {
        matches!(self.kind, TracePointKind::Tracepoint { .. })
    }

    /// `(component, id)` for data records.
    pub fn identity(&self) -> Option<(&str, u32)> {
        match &self.kind {
            TracePointKind::Tracepoint {
                component, tp_id, ..
            } => Some((component, *tp_id)),
            _ => None,
        }
    }

    pub fn tp_type(&self) -> Option<TracePointType> {
        match &self.kind {
            TracePointKind::Tracepoint { tp_type, .. } => Some(*tp_type),
            _ => None,
        }
    }

    pub fn params(&self) -> &[u8] {
        match &self.kind {
            TracePointKind::Tracepoint { params, .. } => params,
            _ => &[],
        }
    }
}
