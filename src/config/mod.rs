//! # Configuration Management Module
//!
//! Type-safe configuration for the challenge registry with serde
//! serialization, sensible defaults, and validation on load.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [storage]
//! data_dir = "data/challenges"
//!
//! [seeds]
//! dir = "data/seeds"
//! import_on_first_run = true
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub seeds: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the sled database with challenge and level records.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/challenges".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Directory with levels.json / challenges.json starter content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Import the seed directory when the registry loads empty.
    #[serde(default = "default_import_on_first_run")]
    pub import_on_first_run: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            dir: None,
            import_on_first_run: true,
        }
    }
}

fn default_import_on_first_run() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: error, warn, info, debug, trace.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow!("Invalid config file {}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Write a default configuration file. Fails if `path` already exists.
    pub async fn create_default(path: &str) -> Result<()> {
        if fs::try_exists(path).await? {
            return Err(anyhow!("Config file {} already exists", path));
        }
        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if let Some(dir) = &self.seeds.dir {
            if dir.trim().is_empty() {
                return Err(anyhow!("seeds.dir must not be empty when set"));
            }
        }
        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(anyhow!(
                "logging.level must be one of error, warn, info, debug, trace"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.data_dir, "data/challenges");
        assert!(config.seeds.import_on_first_run);
    }

    #[test]
    fn bad_values_fail_validation() {
        let mut config = Config::default();
        config.storage.data_dir = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn create_default_then_load_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        let path = path.to_str().expect("utf-8 path");

        Config::create_default(path).await.expect("create");
        assert!(Config::create_default(path).await.is_err());

        let config = Config::load(path).await.expect("load");
        assert_eq!(config.logging.level, "info");
        assert!(config.seeds.dir.is_none());
    }

    #[tokio::test]
    async fn partial_file_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[storage]\ndata_dir = \"/tmp/ch\"\n")
            .await
            .expect("write");

        let config = Config::load(path.to_str().expect("utf-8 path"))
            .await
            .expect("load");
        assert_eq!(config.storage.data_dir, "/tmp/ch");
        assert_eq!(config.logging.level, "info");
    }
}
