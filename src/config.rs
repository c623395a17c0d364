//! TOML configuration.
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:8081"
//!
//! [tracker]
//! default_jql = "Project = GEN"
//! default_max_results = 273
//! api_path = "/rest/api/3"
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8081".to_string()
}

/// Defaults applied to Jira requests when the caller leaves them out.
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    /// JQL used when a search request carries none.
    #[serde(default = "default_jql")]
    pub default_jql: String,
    /// Result cap used when a search request carries none.
    ///
    /// 273 has no documented rationale; it is kept for compatibility with
    /// existing clients, not because Jira requires it.
    #[serde(default = "default_max_results")]
    pub default_max_results: u64,
    /// REST API prefix appended to the base URL.
    #[serde(default = "default_api_path")]
    pub api_path: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            default_jql: default_jql(),
            default_max_results: default_max_results(),
            api_path: default_api_path(),
        }
    }
}

fn default_jql() -> String {
    "Project = GEN".to_string()
}
fn default_max_results() -> u64 {
    273
}
fn default_api_path() -> String {
    "/rest/api/3".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

/// Loads `path` if it exists, otherwise returns the built-in defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.tracker.default_max_results == 0 {
        anyhow::bail!("tracker.default_max_results must be > 0");
    }

    if config.tracker.default_jql.trim().is_empty() {
        anyhow::bail!("tracker.default_jql must not be empty");
    }

    if !config.tracker.api_path.starts_with('/') {
        anyhow::bail!(
            "tracker.api_path must start with '/', got '{}'",
            config.tracker.api_path
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("intake.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(&write_config(&tmp, "")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:8081");
        assert_eq!(cfg.tracker.default_jql, "Project = GEN");
        assert_eq!(cfg.tracker.default_max_results, 273);
        assert_eq!(cfg.tracker.api_path, "/rest/api/3");
    }

    #[test]
    fn test_overrides() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            &tmp,
            r#"
[server]
bind = "0.0.0.0:9000"

[tracker]
default_jql = "project = QA ORDER BY created DESC"
default_max_results = 10
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:9000");
        assert_eq!(cfg.tracker.default_jql, "project = QA ORDER BY created DESC");
        assert_eq!(cfg.tracker.default_max_results, 10);
        assert_eq!(cfg.tracker.api_path, "/rest/api/3");
    }

    #[test]
    fn test_rejects_zero_max_results() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[tracker]\ndefault_max_results = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("default_max_results"));
    }

    #[test]
    fn test_rejects_relative_api_path() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(&tmp, "[tracker]\napi_path = \"rest/api/3\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.tracker.default_max_results, 273);
    }
}
