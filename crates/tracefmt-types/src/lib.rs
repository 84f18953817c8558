pub mod error;
pub mod thread;
pub mod time;
pub mod tracepoint;
pub mod version;

pub use error::{Error, Result};
pub use thread::{ThreadFilter, ThreadId};
pub use time::TimeValue;
pub use tracepoint::{SourceLocator, TracePoint, TracePointKind, TracePointType};
pub use version::FormatVersion;
