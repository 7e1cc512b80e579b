//! cscope-db configuration
//!
//! Configuration file: ~/.config/cscope-db/config.yaml (override with
//! `--config` or `$CSCOPE_DB_CONFIG`). Every key is optional; a missing file
//! means all defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "CSCOPE_DB_CONFIG";

/// What to do when a generator exits unsuccessfully
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log a warning and record the run as successful
    #[default]
    Ignore,
    /// Abort the command with `GeneratorFailed`
    Fail,
}

/// Settings handed to the project manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding one executable per generator
    pub generator_dir: PathBuf,

    /// Generator used by `init` when none is given
    pub default_generator: String,

    /// Registry document
    pub registry_file: PathBuf,

    /// Parent of `<name>` index directories for projects created without `-o`
    pub output_dir: PathBuf,

    /// File name of the runner script written into each output directory
    pub runner_name: String,

    /// Handling of non-zero generator exits
    pub on_generator_failure: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        let paths = Paths::new();
        Self {
            generator_dir: paths.generators(),
            default_generator: "basic".to_string(),
            registry_file: paths.registry(),
            output_dir: paths.indexes(),
            runner_name: "cscope_db.sh".to_string(),
            on_generator_failure: FailurePolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration, honoring an explicit path, then `$CSCOPE_DB_CONFIG`,
    /// then the default location
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| Paths::new().config_file()),
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Parse a YAML config document
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
