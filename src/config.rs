//! Optional TOML configuration
//!
//! Looked up at `$XDG_CONFIG_HOME/rendafixa/config.toml` (or the platform
//! config directory). A missing file means defaults.
//!
//! ```toml
//! [rates]
//! base_url = "https://api.bcb.gov.br"
//! cdi_series = 12
//! selic_series = 432
//! format = "json"
//! ```

use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SimulatorError};

const CONFIG_FILENAME: &str = "config.toml";

/// Response format requested from the SGS API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Csv,
}

impl PayloadFormat {
    pub fn as_query(&self) -> &'static str {
        match self {
            PayloadFormat::Json => "json",
            PayloadFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatesConfig {
    pub base_url: String,
    pub cdi_series: u32,
    pub selic_series: u32,
    pub format: PayloadFormat,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.bcb.gov.br".to_string(),
            cdi_series: 12,
            selic_series: 432,
            format: PayloadFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rates: RatesConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SimulatorError::Config(e.to_string()).into())
    }

    /// Load from an explicit path; the file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load from the default location, falling back to defaults when absent.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path()?;
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_default(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("rendafixa").join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_bcb() {
        let config = Config::default();
        assert_eq!(config.rates.base_url, "https://api.bcb.gov.br");
        assert_eq!(config.rates.cdi_series, 12);
        assert_eq!(config.rates.selic_series, 432);
        assert_eq!(config.rates.format, PayloadFormat::Json);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("[rates]\nformat = \"csv\"\n").unwrap();
        assert_eq!(config.rates.format, PayloadFormat::Csv);
        assert_eq!(config.rates.selic_series, 432);

        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Config::from_toml("[rates]\ncdi_series = \"twelve\"\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimulatorError>(),
            Some(SimulatorError::Config(_))
        ));

        assert!(Config::from_toml("[rates]\nunknown = 1\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[rates]\nbase_url = \"http://127.0.0.1:8080\"\ncdi_series = 4389\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.rates.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.rates.cdi_series, 4389);

        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
