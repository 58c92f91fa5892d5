//! TOML configuration: logging filter and factory seed states.
//!
//! ```toml
//! [logging]
//! filter = "debug"
//!
//! [factory]
//! seed = [["BMW", "M5", "red"], ["BMW", "X6", "white"]]
//! ```

use crate::error::CacheError;
use crate::record::{Attributes, CarModel};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub factory: FactoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    // Kept untyped so malformed entries are reported per index.
    pub seed: Vec<Value>,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, CacheError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let content =
            fs::read_to_string(path).map_err(|err| CacheError::config_read(path, err))?;
        Self::from_toml_str(&content)
    }

    pub fn seed_attributes(&self) -> Result<Vec<Attributes>, CacheError> {
        self.factory
            .seed
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                Attributes::try_from(entry).map_err(|err| match err {
                    CacheError::InvalidInput { reason } => {
                        CacheError::invalid_input(format!("seed entry {index}: {reason}"))
                    }
                    other => other,
                })
            })
            .collect()
    }

    pub fn seed_cars(&self) -> Result<Vec<CarModel>, CacheError> {
        self.seed_attributes()?
            .into_iter()
            .map(CarModel::try_from)
            .collect()
    }
}
