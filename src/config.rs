use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Region, ValueType};
use crate::error::MetError;
use crate::metoffice::{ClientOptions, DEFAULT_BASE_URL};
use crate::store::JsonFileStore;

pub const DEFAULT_CONFIG_FILE: &str = "met-history.json";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub store_path: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub retries: Option<usize>,
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub value_types: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub store_path: Utf8PathBuf,
    pub client: ClientOptions,
    pub bind: String,
    pub regions: Vec<Region>,
    pub value_types: Vec<ValueType>,
}

impl ResolvedConfig {
    /// Every (region, value type) pair the ingestion job should visit.
    pub fn targets(&self) -> Vec<(Region, ValueType)> {
        self.regions
            .iter()
            .flat_map(|&region| {
                self.value_types
                    .iter()
                    .map(move |&value_type| (region, value_type))
            })
            .collect()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, MetError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| MetError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| MetError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, MetError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let store_path = match config.store_path {
            Some(path) => Utf8PathBuf::from(path),
            None => JsonFileStore::default_path()?,
        };

        let defaults = ClientOptions::default();
        let client = ClientOptions {
            base_url: config.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retries: config.retries.unwrap_or(defaults.retries),
        };

        let regions = if config.regions.is_empty() {
            Region::ALL.to_vec()
        } else {
            config
                .regions
                .iter()
                .map(|value| value.parse())
                .collect::<Result<Vec<Region>, MetError>>()?
        };

        let value_types = if config.value_types.is_empty() {
            ValueType::ALL.to_vec()
        } else {
            config
                .value_types
                .iter()
                .map(|value| value.parse())
                .collect::<Result<Vec<ValueType>, MetError>>()?
        };

        Ok(ResolvedConfig {
            schema_version,
            store_path,
            client,
            bind: config.bind.unwrap_or_else(|| DEFAULT_BIND.to_string()),
            regions,
            value_types,
        })
    }
}
