mod args;
mod commands;
mod report;

pub use args::{Cli, OutputFormat};
pub use commands::run;
