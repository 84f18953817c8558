// Error types
pub mod error;

// File-level structures
pub mod file;
pub mod generation;
pub mod geometry;
pub mod header;

// Buffer decoding
pub mod buffer;
pub mod decoder;

mod bytes;

pub use buffer::{BufferHeader, BufferScan, DecodedBuffer, RawBuffer, Records};
pub use decoder::{BufferDecoder, CurrentDecoder, DecoderKind, LegacyDecoder, select_decoder};
pub use error::{Error, Result};
pub use file::TraceFile;
pub use generation::{GENERATION_PLACEHOLDER, Generations, generation_name, open_generations};
pub use geometry::{BufferGeometry, BufferLayout, MAX_BUFFERS_PER_FILE};
pub use header::{HEADER_LEN, MAGIC, TraceFileHeader, TraceType};
