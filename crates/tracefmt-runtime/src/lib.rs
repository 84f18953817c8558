pub mod cancel;
pub mod config;
pub mod error;
pub mod formatter;
pub mod ingest;
pub mod options;

pub use cancel::CancelToken;
pub use config::{Config, FORMAT_DIR_ENV, HOME_ENV, default_catalog_dir, resolve_runtime_home};
pub use error::{Error, Result};
pub use formatter::{RunReport, TraceFormatter};
pub use ingest::{Ingested, ingest};
pub use options::FormatOptions;
