//! TestWorld pattern for declarative integration test setup.
//!
//! Provides a fluent interface for:
//! - Creating isolated test environments
//! - Placing trace files and catalogs
//! - Executing CLI commands with proper context

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::{CatalogBuilder, TraceFileBuilder};

/// Isolated test environment rooted in a temp directory.
///
/// # Example
/// ```no_run
/// use tracefmt_testing::{TestWorld, TraceFileBuilder};
///
/// let world = TestWorld::new();
/// let trace = world.write_trace("run.trc", &TraceFileBuilder::current()).unwrap();
/// let result = world.run(&[trace.to_str().unwrap()]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    cwd: PathBuf,
    home: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    /// Create a new isolated test environment.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path().to_path_buf();
        let home = base_path.join("runtime-home");
        std::fs::create_dir_all(home.join("lib")).expect("Failed to create runtime home");

        Self {
            cwd: base_path,
            temp_dir,
            home,
            env_vars: HashMap::new(),
        }
    }

    /// Get the temp directory root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Runtime home whose `lib` directory is the default catalog location.
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve a path relative to the temp root.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Change the current working directory (relative to temp root).
    pub fn enter_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        let new_cwd = self.path(path);
        std::fs::create_dir_all(&new_cwd).expect("Failed to create directory");
        self.cwd = new_cwd;
        self
    }

    /// Set an environment variable for CLI execution.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    pub fn write_trace(&self, relative: &str, builder: &TraceFileBuilder) -> Result<PathBuf> {
        let path = self.path(relative);
        builder.write_to(&path)?;
        Ok(path)
    }

    pub fn write_catalog(&self, relative: &str, builder: &CatalogBuilder) -> Result<PathBuf> {
        let path = self.path(relative);
        builder.write_to(&path)?;
        Ok(path)
    }

    /// Place a catalog in the runtime home's `lib` directory.
    pub fn install_catalog(&self, name: &str, builder: &CatalogBuilder) -> Result<PathBuf> {
        let path = self.home.join("lib").join(name);
        builder.write_to(&path)?;
        Ok(path)
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> Result<String> {
        Ok(std::fs::read_to_string(self.path(relative))?)
    }

    /// Configure a CLI command with this test environment's settings.
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(&self.cwd);
        cmd.env("TRACEFMT_HOME", &self.home);
        cmd.env("XDG_CONFIG_HOME", self.root().join("config"));
        cmd.env_remove("TRACEFMT_FORMAT_DIR");
        cmd.env_remove("RUST_LOG");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Execute the `tracefmt` binary with `args`.
    ///
    /// Uses `Command::cargo_bin()`, which needs the binary built by the
    /// surrounding `cargo test` run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("tracefmt")
            .map_err(|e| anyhow::anyhow!("Failed to find tracefmt binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Check if the command succeeded.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
