use crate::{CancelToken, Config, Error, Result};
use std::path::PathBuf;
use tracefmt_types::ThreadFilter;

/// Largest accepted timezone adjustment, in hours.
pub const MAX_TIMEZONE_OFFSET: i32 = 24;

/// Everything a formatting run can be configured with.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Trace file, or a generation family containing `#`.
    pub input: String,
    /// Output file; defaults to the input name with `.fmt` appended.
    pub output: Option<PathBuf>,
    /// Searched for catalogs before the working and default directories.
    pub catalog_dir: Option<PathBuf>,
    /// Runtime home whose `lib` directory is the default catalog location.
    pub runtime_home: Option<PathBuf>,
    pub user_tag: Option<String>,
    pub threads: ThreadFilter,
    /// Unset means UTC; `Some(0)` still overrides the config file.
    pub timezone_offset_hours: Option<i32>,
    pub indent: bool,
    /// Treat every file as legacy format regardless of its header.
    pub force_legacy: bool,
    pub summary_only: bool,
    pub debug: bool,
    pub verbose: bool,
    pub cancel: CancelToken,
}

impl FormatOptions {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.fmt", self.input)))
    }

    /// Fill settings not given on the command line from `config`.
    pub fn apply_config(&mut self, config: &Config) {
        if self.catalog_dir.is_none() {
            self.catalog_dir = config.catalog_dir.clone();
        }
        if self.user_tag.is_none() {
            self.user_tag = config.user_tag.clone();
        }
        if self.timezone_offset_hours.is_none() {
            self.timezone_offset_hours = config.timezone_offset_hours;
        }
        self.indent |= config.indent.unwrap_or(false);
        self.debug |= config.debug.unwrap_or(false);
    }

    pub fn timezone_offset(&self) -> i32 {
        self.timezone_offset_hours.unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(Error::Config("no input trace file given".to_string()));
        }
        if self.timezone_offset().abs() > MAX_TIMEZONE_OFFSET {
            return Err(Error::Config(format!(
                "timezone offset {} is outside -{}..={} hours",
                self.timezone_offset(), MAX_TIMEZONE_OFFSET, MAX_TIMEZONE_OFFSET
            )));
        }
        if let Some(tag) = &self.user_tag
            && tag.chars().any(char::is_whitespace)
        {
            return Err(Error::Config(format!(
                "user tag {:?} must not contain whitespace",
                tag
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let options = FormatOptions::new("traces/run.trc");
        assert_eq!(options.output_path(), PathBuf::from("traces/run.trc.fmt"));
    }

    #[test]
    fn test_command_line_beats_config() {
        let mut options = FormatOptions::new("run.trc");
        options.user_tag = Some("cli".to_string());
        options.timezone_offset_hours = Some(2);
        options.apply_config(&Config {
            catalog_dir: Some(PathBuf::from("/cat")),
            indent: Some(true),
            timezone_offset_hours: Some(5),
            debug: None,
            user_tag: Some("file".to_string()),
        });
        assert_eq!(options.user_tag.as_deref(), Some("cli"));
        assert_eq!(options.timezone_offset_hours, Some(2));
        assert_eq!(options.catalog_dir, Some(PathBuf::from("/cat")));
        assert!(options.indent);
        assert!(!options.debug);
    }

    #[test]
    fn test_explicit_utc_beats_config() {
        let config = Config {
            timezone_offset_hours: Some(5),
            ..Config::default()
        };

        let mut options = FormatOptions::new("run.trc");
        options.timezone_offset_hours = Some(0);
        options.apply_config(&config);
        assert_eq!(options.timezone_offset(), 0);

        let mut options = FormatOptions::new("run.trc");
        options.apply_config(&config);
        assert_eq!(options.timezone_offset(), 5);
    }

    #[test]
    fn test_validation() {
        assert!(FormatOptions::new("run.trc").validate().is_ok());
        assert!(FormatOptions::new(" ").validate().is_err());

        let mut options = FormatOptions::new("run.trc");
        options.timezone_offset_hours = Some(-25);
        assert!(options.validate().is_err());

        let mut options = FormatOptions::new("run.trc");
        options.user_tag = Some("two words".to_string());
        assert!(options.validate().is_err());
    }
}
