// Configuration loading for the todostore CLI

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";
const DATA_FILE: &str = "tasks.json";

/// Settings read from `config.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Backing JSON file for the store
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Tracing filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            log_level: default_log_level(),
        }
    }
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DATA_FILE)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Where the config file lives when none is given explicitly
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, data_file = ?config.data_file, "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse YAML")
    }

    /// Data file to use: an explicit override wins over the configured one
    pub fn resolve_data_file(&self, cli_override: Option<&Path>) -> PathBuf {
        cli_override.map(Path::to_path_buf).unwrap_or_else(|| self.data_file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, "warn");
        assert!(config.data_file.ends_with("todostore/tasks.json"));
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse("data-file: /tmp/my-tasks.json\nlog-level: debug\n").unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/my-tasks.json"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_parse_partial_and_empty_config() {
        let config = Config::parse("log-level: info\n").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_file, default_data_file());

        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(Config::parse("data_dir: /tmp\n").is_err());
    }

    #[test]
    fn test_load_explicit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "data-file: elsewhere.json\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_file, PathBuf::from("elsewhere.json"));

        let missing = temp.path().join("missing.yaml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_resolve_data_file() {
        let config = Config::parse("data-file: from-config.json\n").unwrap();
        assert_eq!(config.resolve_data_file(None), PathBuf::from("from-config.json"));
        assert_eq!(
            config.resolve_data_file(Some(Path::new("from-cli.json"))),
            PathBuf::from("from-cli.json")
        );
    }
}
