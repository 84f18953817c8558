use crate::directive::{check_format, render_params};
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracefmt_types::TracePointType;

static TEMPLATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+)\.(\d+)\s+(\d+)\s+(\d+)\s+(\S+)\s+"(.*)"\s*$"#).unwrap()
});

static VERSION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

/// Message text for one `(component, id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub component: String,
    pub tp_id: u32,
    pub tp_type: TracePointType,
    pub level: u8,
    pub symbol: String,
    /// Format string with `%` directives.
    pub format: String,
}

impl MessageTemplate {
    /// Parse `<component>.<id> <type> <level> <symbol> "<format>"`.
    pub fn parse_line(line: &str) -> Result<Self> {
        let caps = TEMPLATE_LINE
            .captures(line)
            .ok_or_else(|| Error::MalformedLine(line.to_string()))?;

        let number = |idx: usize| -> Result<u32> {
            caps[idx]
                .parse::<u32>()
                .map_err(|e| Error::MalformedLine(format!("{}: {}", line, e)))
        };
        let tp_id = number(2)?;
        let type_code = u8::try_from(number(3)?)
            .map_err(|_| Error::MalformedLine(format!("{}: type code out of range", line)))?;
        let level = u8::try_from(number(4)?)
            .map_err(|_| Error::MalformedLine(format!("{}: level out of range", line)))?;

        check_format(&caps[6]).map_err(|e| Error::MalformedLine(format!("{}: {}", line, e)))?;

        Ok(Self {
            component: caps[1].to_string(),
            tp_id,
            tp_type: TracePointType::from_code(type_code)?,
            level,
            symbol: caps[5].to_string(),
            format: caps[6].to_string(),
        })
    }

    /// Substitute `params` into the format string.
    pub fn render(&self, params: &[u8], pointer_width: u8) -> String {
        render_params(&self.format, params, pointer_width)
    }
}

/// Bare catalog version line such as `5.1`.
pub(crate) fn is_version_line(line: &str) -> bool {
    VERSION_LINE.is_match(line)
}
