// Engine module - chronological merge and rendering
// Sits between decoded buffers (decoder) and the formatting pipeline (runtime)

pub mod context;
pub mod merge;
pub mod render;
pub mod stream;
pub mod summary;
pub mod timefmt;

pub use context::{ClockConversion, RunContext};
pub use merge::MergeEngine;
pub use render::{RenderOptions, Renderer};
pub use stream::ThreadStream;
pub use summary::{ClockSummary, Summary, TITLE, ThreadSummary, write_banner};
pub use timefmt::TimeFormatter;

#[cfg(test)]
pub(crate) mod test_support;
