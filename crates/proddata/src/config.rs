//! Configuration management for proddata.
//!
//! Loaded with figment from defaults, a TOML file and `PRODDATA_`
//! environment variables, highest precedence last.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::CsvExporter;
use crate::master::MasterKind;
use crate::repository::DEFAULT_COLLECTION_KEY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "proddata";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "proddata.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PRODDATA_`)
/// 2. TOML config file at `~/.config/proddata/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/proddata/proddata.db`
    pub database_path: Option<PathBuf>,
    /// Slot holding the production data collection.
    pub collection_key: String,
}

/// Export-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// CSV field delimiter.
    pub delimiter: char,
    /// Write a UTF-8 byte order mark at the start of CSV files.
    pub include_bom: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            include_bom: false,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PRODDATA_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let key = self.storage.collection_key.trim();
        if key.is_empty() {
            return Err(Error::ConfigValidation {
                message: "collection_key must not be empty".to_string(),
            });
        }
        if MasterKind::is_master_key(key) {
            return Err(Error::ConfigValidation {
                message: format!("collection_key '{key}' is reserved for master data"),
            });
        }

        if matches!(self.export.delimiter, '"' | '\r' | '\n') {
            return Err(Error::ConfigValidation {
                message: format!(
                    "delimiter {:?} cannot be a quote or line break",
                    self.export.delimiter
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Build the CSV exporter described by the export settings.
    #[must_use]
    pub fn csv_exporter(&self) -> CsvExporter {
        CsvExporter::new(self.export.delimiter).with_bom(self.export.include_bom)
    }
}
