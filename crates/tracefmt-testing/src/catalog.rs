//! Builders for message catalog files.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracefmt_types::TracePointType;

/// Text catalog in the `<component>.<id> <type> <level> <symbol> "<format>"` layout.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    version: Option<String>,
    lines: Vec<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            version: Some("5.1".to_string()),
            lines: Vec::new(),
        }
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn entry(
        mut self,
        component: &str,
        tp_id: u32,
        tp_type: TracePointType,
        format: &str,
    ) -> Self {
        self.lines.push(format!(
            "{}.{} {} 1 Trc_{}_{} \"{}\"",
            component,
            tp_id,
            tp_type.code(),
            component,
            tp_id,
            format
        ));
        self
    }

    /// Append a line verbatim, e.g. to exercise malformed input.
    pub fn raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::from("# generated catalog\n");
        if let Some(version) = &self.version {
            out.push_str(version);
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.build())?;
        Ok(())
    }
}
