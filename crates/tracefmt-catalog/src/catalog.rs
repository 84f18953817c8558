use crate::template::is_version_line;
use crate::{Error, MessageTemplate, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime catalog; a service-level specific variant is preferred.
pub const RUNTIME_CATALOG: &str = "RuntimeTraceFormat.dat";
/// Secondary catalog for runtime subsystems.
pub const SUBSYSTEM_CATALOG: &str = "SubsystemTraceFormat.dat";
/// Class-library catalog.
pub const CLASS_LIBRARY_CATALOG: &str = "TraceFormat.dat";

/// Where to look for catalogs and which names to try.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSearch {
    /// Directories in priority order.
    pub dirs: Vec<PathBuf>,
    /// Each chain loads at most one file: the first name found in any directory.
    pub chains: Vec<Vec<String>>,
}

impl CatalogSearch {
    /// Override directory first, then the working directory, then the default.
    pub fn new(override_dir: Option<&Path>, default_dir: Option<&Path>) -> Self {
        let mut dirs = Vec::new();
        if let Some(dir) = override_dir {
            dirs.push(dir.to_path_buf());
        }
        dirs.push(PathBuf::from("."));
        if let Some(dir) = default_dir {
            dirs.push(dir.to_path_buf());
        }
        Self {
            dirs,
            chains: Vec::new(),
        }
    }

    /// Runtime, subsystem and class-library chains for the current format.
    pub fn standard(mut self, service_level: &str) -> Self {
        self.chains = vec![
            runtime_chain(service_level),
            vec![SUBSYSTEM_CATALOG.to_string()],
            vec![CLASS_LIBRARY_CATALOG.to_string()],
        ];
        self
    }

    /// A single monolithic catalog for legacy files.
    pub fn legacy(mut self, service_level: &str) -> Self {
        let mut chain = runtime_chain(service_level);
        chain.push(CLASS_LIBRARY_CATALOG.to_string());
        self.chains = vec![chain];
        self
    }

    /// Append a lowest-priority directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// First existing `name` across the search directories.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }
}

fn runtime_chain(service_level: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let level = service_level.trim();
    if !level.is_empty() {
        chain.push(format!("RuntimeTraceFormat{}.dat", level));
    }
    chain.push(RUNTIME_CATALOG.to_string());
    chain
}

/// Templates keyed by component then tracepoint id.
///
/// Files are merged in load order; the first template loaded for a key wins.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, HashMap<u32, MessageTemplate>>,
    sources: Vec<PathBuf>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every chain of `search`. Never fails: a catalog that cannot be
    /// read is logged and the next candidate is tried.
    pub fn load(search: &CatalogSearch) -> Self {
        let mut catalog = Self::new();

        for chain in &search.chains {
            let loaded = chain.iter().any(|name| {
                search.dirs.iter().any(|dir| {
                    let path = dir.join(name);
                    if !path.is_file() {
                        return false;
                    }
                    match catalog.load_file(&path) {
                        Ok(count) => {
                            log::debug!("Loaded {} templates from {}", count, path.display());
                            true
                        }
                        Err(err) => {
                            log::warn!("{}", err);
                            false
                        }
                    }
                })
            });
            if !loaded {
                log::debug!("No catalog found for {}", chain.join(" / "));
            }
        }

        if catalog.is_empty() {
            log::warn!("No message catalog loaded; tracepoints will be unformatted");
        }
        catalog
    }

    /// Merge one catalog file, returning how many templates it defined.
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let text = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&text);
        let count = self.merge_text(&text, path);
        self.sources.push(path.to_path_buf());
        Ok(count)
    }

    fn merge_text(&mut self, text: &str, origin: &Path) -> usize {
        let mut count = 0;
        let mut seen_content = false;

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !seen_content {
                seen_content = true;
                if is_version_line(line) {
                    log::debug!("Catalog {} version {}", origin.display(), line);
                    continue;
                }
            }
            match MessageTemplate::parse_line(line) {
                Ok(template) => {
                    count += 1;
                    self.insert(template);
                }
                Err(err) => {
                    log::warn!("{}:{}: {}", origin.display(), number + 1, err);
                }
            }
        }
        count
    }

    /// Add a template unless its key is already present.
    pub fn insert(&mut self, template: MessageTemplate) -> bool {
        let by_id = self.templates.entry(template.component.clone()).or_default();
        if by_id.contains_key(&template.tp_id) {
            return false;
        }
        by_id.insert(template.tp_id, template);
        true
    }

    pub fn lookup(&self, component: &str, tp_id: u32) -> Option<&MessageTemplate> {
        self.templates.get(component)?.get(&tp_id)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.values().all(HashMap::is_empty)
    }

    pub fn len(&self) -> usize {
        self.templates.values().map(HashMap::len).sum()
    }

    /// Files loaded, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}
