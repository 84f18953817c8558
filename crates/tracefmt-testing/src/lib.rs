//! Testing infrastructure for tracefmt integration tests.
//!
//! This crate provides utilities for writing robust integration tests:
//! - `fixtures`: byte-exact builders for synthetic trace files
//! - `catalog`: builders for message catalog files
//! - `TestWorld`: isolated temp directory with CLI execution helpers
//!
//! The encoders here are written independently of `tracefmt-decoder` so a
//! decoder bug cannot hide behind a matching encoder bug.

pub mod catalog;
pub mod fixtures;
pub mod world;

pub use catalog::CatalogBuilder;
pub use fixtures::{BufferSpec, Params, RecordSpec, TraceFileBuilder};
pub use world::{CliResult, TestWorld};
