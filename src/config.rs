// Configuration - optional sales_dashboard.toml in the working directory
// Every key has a default, so the file may be partial or absent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sales_dashboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log at debug level instead of info.
    #[serde(default)]
    pub verbose: bool,
}

/// Where the sales data lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("sales_data.csv")
}

/// How the binary renders a view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Digits after the decimal point for amounts.
    #[serde(default = "default_decimals")]
    pub decimals: usize,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            decimals: default_decimals(),
            format: OutputFormat::default(),
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_decimals() -> usize {
    2
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `sales_dashboard.toml` from `dir` if it exists.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate the default configuration as TOML.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.general.verbose);
        assert_eq!(config.data.path, PathBuf::from("sales_data.csv"));
        assert_eq!(config.display.currency_symbol, "₹");
        assert_eq!(config.display.decimals, 2);
        assert_eq!(config.display.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
[data]
path = "exports/q1.csv"

[display]
currency_symbol = "$"
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.path, PathBuf::from("exports/q1.csv"));
        assert_eq!(config.display.currency_symbol, "$");
        assert_eq!(config.display.format, OutputFormat::Json);
        assert_eq!(config.display.decimals, 2, "unset keys keep defaults");
        assert!(!config.general.verbose);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[general]\nverbose = true\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(config.general.verbose);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[display]\ndecimals = \"two\"\n").unwrap();

        let err = Config::load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[display]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.data.path, PathBuf::from("sales_data.csv"));
    }
}
