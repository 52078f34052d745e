// Configuration management for playgen
// Optional TOML file for tuning, environment for the catalog endpoint + key

use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_URL_VAR: &str = "CATALOG_URL";
pub const CATALOG_KEY_VAR: &str = "CATALOG_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub table: String,
    /// PostgREST `order` value; keeps offset paging stable. Empty disables it.
    pub order_by: String,
    pub page_size: usize,
    pub max_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub path_column_width: u16,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            table: "songs".to_string(),
            order_by: "path,title,artist,tempo,energy".to_string(),
            page_size: 1000,
            max_rows: 10_000,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: dirs::data_local_dir()
                .map(|dir| dir.join("playgen").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { path_column_width: 40 }
    }
}

impl Config {
    /// File (if present) -> `.env` -> process environment, then validate.
    ///
    /// The config file is never written back.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Config::default(),
            },
        };

        dotenvy::dotenv().ok();
        config.apply_env(|key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Environment wins over whatever the file said
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(CATALOG_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.catalog.url = url.trim().to_string();
        }
        if let Some(key) = lookup(CATALOG_KEY_VAR).filter(|v| !v.trim().is_empty()) {
            self.catalog.api_key = key.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.catalog.url.is_empty() {
            bail!("{} must be set to the catalog endpoint", CATALOG_URL_VAR);
        }
        if self.catalog.api_key.is_empty() {
            bail!("{} must be set to the catalog access key", CATALOG_KEY_VAR);
        }
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("playgen").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.catalog.table, "songs");
        assert_eq!(config.catalog.order_by, "path,title,artist,tempo,energy");
        assert_eq!(config.catalog.page_size, 1000);
        assert_eq!(config.catalog.max_rows, 10_000);
        assert_eq!(config.export.directory, PathBuf::from("."));
        assert_eq!(config.ui.path_column_width, 40);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [catalog]
            table = "canciones"
            page_size = 250

            [export]
            directory = "/tmp/playlists"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.table, "canciones");
        assert_eq!(config.catalog.page_size, 250);
        assert_eq!(config.catalog.max_rows, 10_000);
        assert_eq!(config.export.directory, PathBuf::from("/tmp/playlists"));
        assert_eq!(config.ui.path_column_width, 40);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: Config = toml::from_str(
            r#"
            [catalog]
            url = "https://old.example.com"
            "#,
        )
        .unwrap();

        config.apply_env(env_of(&[
            (CATALOG_URL_VAR, " https://new.example.com "),
            (CATALOG_KEY_VAR, "secret"),
        ]));

        assert_eq!(config.catalog.url, "https://new.example.com");
        assert_eq!(config.catalog.api_key, "secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_env_does_not_clear_file_value() {
        let mut config = Config::default();
        config.catalog.url = "https://catalog.example.com".to_string();

        config.apply_env(env_of(&[(CATALOG_URL_VAR, "  ")]));

        assert_eq!(config.catalog.url, "https://catalog.example.com");
    }

    #[test]
    fn test_missing_credentials_fail_validation() {
        let mut config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(CATALOG_URL_VAR));

        config.apply_env(env_of(&[(CATALOG_URL_VAR, "https://catalog.example.com")]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(CATALOG_KEY_VAR));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[catalog\nurl = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.catalog.api_key = "secret".to_string();

        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(!rendered.contains("secret"));
    }
}
