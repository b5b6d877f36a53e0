//! Application configuration.
//!
//! Every section is optional; anything left out falls back to the built-in
//! defaults. Command-line flags are applied on top afterwards.
//!
//! ```toml
//! [pricing]
//! loading_rate = "0.10"
//! other_fee = "580"
//!
//! [history]
//! max_entries = 1000
//! expiry_days = 365
//!
//! [storage]
//! backend = "sqlite"
//! connection_string = "smartrent.db"
//!
//! [directory]
//! path = "suburbs.csv"
//!
//! [logging]
//! level = "info"
//! file = "smartrent.log"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rent_core::calculations::PricingConfig;
use rent_core::db::StoreConfig;
use rent_core::history::HistoryConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "smartrent.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub path: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("suburbs.csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub history: HistoryConfig,
    pub storage: StoreConfig,
    pub directory: DirectoryConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used if present and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(path = %path.display(), "loading configuration");
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        self.pricing
            .validate()
            .context("Invalid [pricing] section")?;
        anyhow::ensure!(
            self.history.max_entries > 0,
            "[history] max_entries must be greater than 0"
        );
        anyhow::ensure!(
            self.history.expiry_days >= 0,
            "[history] expiry_days must not be negative"
        );
        Ok(())
    }
}
