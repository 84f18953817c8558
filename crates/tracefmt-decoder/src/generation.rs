use crate::{Error, Result, TraceFile};
use std::path::{Path, PathBuf};

/// Character in a file name replaced by the generation digit.
pub const GENERATION_PLACEHOLDER: char = '#';

/// Generation digits run 0-9 then A-Z.
pub const MAX_GENERATIONS: u32 = 36;

/// File name of `generation` within a rotating family.
pub fn generation_name(spec: &str, generation: u32) -> String {
    let digit = std::char::from_digit(generation, MAX_GENERATIONS)
        .unwrap_or('0')
        .to_ascii_uppercase();
    spec.replace(GENERATION_PLACEHOLDER, &digit.to_string())
}

/// Trace files opened for one run, in generation order.
#[derive(Debug)]
pub struct Generations {
    pub files: Vec<TraceFile>,
    /// Generation count declared by the first file's header (1 for a plain file).
    pub declared: u32,
    /// Names of generations that could not be opened.
    pub missing: Vec<PathBuf>,
}

impl Generations {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Open a single trace file, or every generation of a `#` family.
///
/// The first file must open; later generations that are missing or
/// unreadable are reported in [`Generations::missing`] and skipped.
pub fn open_generations(spec: &str) -> Result<Generations> {
    if !spec.contains(GENERATION_PLACEHOLDER) {
        let file = TraceFile::open(Path::new(spec))?;
        return Ok(Generations {
            files: vec![file],
            declared: 1,
            missing: Vec::new(),
        });
    }

    let first = TraceFile::open(Path::new(&generation_name(spec, 0)))?;
    let declared = first.header().generations;
    let mut files = vec![first];
    let mut missing = Vec::new();

    // A family that does not declare its size is probed until the first gap.
    let known_size = declared > 1;
    let limit = if known_size {
        declared.min(MAX_GENERATIONS)
    } else {
        MAX_GENERATIONS
    };

    for generation in 1..limit {
        let name = PathBuf::from(generation_name(spec, generation));
        match TraceFile::open(&name) {
            Ok(file) => files.push(file),
            Err(Error::NotFound(path)) => {
                if !known_size {
                    log::debug!("Generations found: {}", generation);
                    break;
                }
                log::warn!("Trace file {} is missing", path.display());
                missing.push(path);
            }
            Err(err) => {
                log::warn!("Skipping generation {}: {}", name.display(), err);
                missing.push(name);
            }
        }
    }

    if known_size {
        log::info!(
            "Processing {} of the {} generations specified at runtime",
            if missing.is_empty() {
                "all".to_string()
            } else {
                files.len().to_string()
            },
            declared
        );
    }

    let declared = if known_size {
        declared
    } else {
        files.len() as u32
    };
    Ok(Generations {
        files,
        declared,
        missing,
    })
}
