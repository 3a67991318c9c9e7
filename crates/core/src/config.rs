use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://cloud.acquia.com/api";
pub const TOKEN_ENV: &str = "CLOUDENV_API_TOKEN";
pub const BASE_URL_ENV: &str = "CLOUDENV_API_URL";

/// Global configuration, stored as ~/.cloudenv/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

/// Connection settings for the management API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub token: String,
    /// Per-request timeout; no timeout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ApiConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            token: token.into(),
            timeout_secs: None,
        }
    }

    /// Override fields from `CLOUDENV_API_TOKEN` / `CLOUDENV_API_URL`
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(TOKEN_ENV).ok(),
            std::env::var(BASE_URL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, token: Option<String>, base_url: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = token;
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
    }

    /// Check the settings are usable before any request is attempted
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::ConfigParse(
                "Empty value in 'api.token' field".to_string(),
            ));
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::ConfigParse(format!(
                "'api.base_url' must start with http:// or https://: '{}'",
                self.base_url
            )));
        }

        Ok(())
    }
}

/// Path to the global config file
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| Error::ConfigParse("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".cloudenv").join("config.toml"))
}

/// Parse config.toml from a file path
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse config.toml from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.api.validate()?;
    Ok(config)
}

/// Write the config, creating its parent directory if needed
pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let path = path.as_ref();
    config.api.validate()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[api]
token = "abc123"
        "#;

        let config = parse_config_str(toml).unwrap();
        assert_eq!(config.api.token, "abc123");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[api]
base_url = "https://api.example"
token = "abc123"
timeout_secs = 30
        "#;

        let config = parse_config_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://api.example");
        assert_eq!(config.api.timeout_secs, Some(30));
    }

    #[test]
    fn test_parse_config_rejects_blank_token() {
        let toml = r#"
[api]
token = "   "
        "#;

        let result = parse_config_str(toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api.token"));
    }

    #[test]
    fn test_parse_config_rejects_missing_token() {
        let result = parse_config_str("[api]\n");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_parse_config_rejects_non_http_url() {
        let toml = r#"
[api]
base_url = "ftp://api.example"
token = "abc123"
        "#;

        let result = parse_config_str(toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("api.base_url"));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut api = ApiConfig::new("from-file");
        api.apply_overrides(
            Some("from-env".to_string()),
            Some("http://localhost:8080".to_string()),
        );
        assert_eq!(api.token, "from-env");
        assert_eq!(api.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_blank_overrides_ignored() {
        let mut api = ApiConfig::new("from-file");
        api.apply_overrides(Some("".to_string()), None);
        assert_eq!(api.token, "from-file");
        assert_eq!(api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            api: ApiConfig {
                base_url: "https://api.example".to_string(),
                token: "abc123".to_string(),
                timeout_secs: Some(10),
            },
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api, config.api);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
