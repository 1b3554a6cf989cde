//! Client configuration.
//!
//! [`ClientConfig`] is stored as `config.json` in the platform configuration
//! directory (see [`crate::core::dirs`]). A missing file means defaults; the
//! file is only written by an explicit [`ClientConfig::save`].

use crate::core::chunk::DEFAULT_MAX_COMMAND_LENGTH;
use crate::core::dirs::get_config_directory;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the hg executable
pub const HG_EXECUTABLE_ENV: &str = "HGSCC_HG";

/// External diff tool launched by non-silent diffs.
///
/// `{base}` and `{other}` in `args` are replaced by the two file paths.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DiffToolConfig {
    pub program: PathBuf,
    #[serde(default = "default_diff_args")]
    pub args: Vec<String>,
}

fn default_diff_args() -> Vec<String> {
    vec!["{base}".to_string(), "{other}".to_string()]
}

impl DiffToolConfig {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: default_diff_args(),
        }
    }

    pub fn command_args(&self, base: &Path, other: &Path) -> Vec<String> {
        let base = base.to_string_lossy();
        let other = other.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{base}", &base).replace("{other}", &other))
            .collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub hg_executable: PathBuf,
    pub max_command_length: usize,
    pub case_insensitive_paths: bool,
    pub diff_tool: Option<DiffToolConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hg_executable: PathBuf::from("hg"),
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            case_insensitive_paths: cfg!(windows),
            diff_tool: None,
        }
    }
}

impl ClientConfig {
    pub fn config_file() -> Result<PathBuf> {
        Ok(get_config_directory()?.join("config.json"))
    }

    /// Load the user configuration, falling back to defaults when absent,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_file = Self::config_file()?;
        let config = if config_file.exists() {
            Self::load_from(&config_file)?
        } else {
            log::debug!("No config at {}, using defaults", config_file.display());
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(executable) = std::env::var_os(HG_EXECUTABLE_ENV) {
            self.hg_executable = PathBuf::from(executable);
        }
        self
    }
}
