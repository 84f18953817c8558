use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the runtime home; catalogs live in its `lib` directory.
pub const HOME_ENV: &str = "TRACEFMT_HOME";

/// Environment variable naming an extra catalog directory for legacy files.
pub const FORMAT_DIR_ENV: &str = "TRACEFMT_FORMAT_DIR";

/// Resolve the runtime home directory based on priority:
/// 1. Explicit path
/// 2. TRACEFMT_HOME environment variable
/// 3. Platform data directory
pub fn resolve_runtime_home(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os(HOME_ENV) {
        return Some(PathBuf::from(env_path));
    }

    dirs::data_dir().map(|dir| dir.join("tracefmt"))
}

/// Default catalog directory: `<runtime home>/lib`.
pub fn default_catalog_dir(explicit_home: Option<&Path>) -> Option<PathBuf> {
    resolve_runtime_home(explicit_home).map(|home| home.join("lib"))
}

/// Settings read from `config.toml`. Command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog_dir: Option<PathBuf>,
    pub indent: Option<bool>,
    pub timezone_offset_hours: Option<i32>,
    pub debug: Option<bool>,
    pub user_tag: Option<String>,
}

impl Config {
    /// Load the default config file, if present.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tracefmt").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "indent = true\ntimezone_offset_hours = -3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.indent, Some(true));
        assert_eq!(config.timezone_offset_hours, Some(-3));
        assert_eq!(config.catalog_dir, None);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "indent = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_explicit_home_wins() {
        let home = resolve_runtime_home(Some(Path::new("/opt/runtime"))).unwrap();
        assert_eq!(home, PathBuf::from("/opt/runtime"));
        assert_eq!(
            default_catalog_dir(Some(Path::new("/opt/runtime"))),
            Some(PathBuf::from("/opt/runtime/lib"))
        );
    }
}
