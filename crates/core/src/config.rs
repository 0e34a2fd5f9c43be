//! Application configuration loaded from disk and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Hosted backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://leaguedesk-api.onrender.com";
/// Versioned path appended to the API URL.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
/// Prefix for environment overrides, e.g. `LEAGUEDESK_API_URL`.
pub const ENV_PREFIX: &str = "LEAGUEDESK";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_CONFIG_TOML: &str = r#"# leaguedesk configuration
#
# Every key can also be set through the environment, e.g.
# LEAGUEDESK_API_URL=http://localhost:5000

# api_url = "https://leaguedesk-api.onrender.com"
# api_prefix = "/api/v1"
# request_timeout_secs = 30
"#;

/// Runtime settings for the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scheme and host of the backend.
    pub api_url: String,
    /// Versioned API path appended to `api_url`.
    pub api_prefix: String,
    /// Directory holding the persisted session.
    pub storage_dir: PathBuf,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            storage_dir: default_storage_dir(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load from the default config file plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load from an explicit file (missing files are allowed) plus environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("api_prefix", defaults.api_prefix)?
            .set_default(
                "storage_dir",
                defaults.storage_dir.to_string_lossy().to_string(),
            )?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Base URL every endpoint path is appended to.
    pub fn api_base(&self) -> String {
        let url = self.api_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            url.to_string()
        } else {
            format!("{url}/{prefix}")
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Location of the user config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leaguedesk")
        .join("config.toml")
}

fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leaguedesk")
}

/// Write a commented config file on first run. Existing files are left alone.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.api_prefix, DEFAULT_API_PREFIX);
        assert_eq!(config.request_timeout_secs, 30);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_url = \"http://localhost:5000/\"\nrequest_timeout_secs = 5\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base(), "http://localhost:5000/api/v1");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        Ok(())
    }

    #[test]
    fn default_config_is_written_once() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        write_default_config(&path)?;
        assert!(fs::read_to_string(&path)?.contains("LEAGUEDESK_API_URL"));

        fs::write(&path, "api_url = \"http://custom\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "api_url = \"http://custom\"\n");
        Ok(())
    }

    #[test]
    fn empty_prefix_keeps_bare_url() {
        let config = AppConfig {
            api_url: "http://api.test".to_string(),
            api_prefix: String::new(),
            ..AppConfig::default()
        };
        assert_eq!(config.api_base(), "http://api.test");
    }
}
