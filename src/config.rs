use serde::Deserialize;

use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Plain,
    Json,
}

impl StorageKind {
    pub fn from_name(name: &str) -> Option<StorageKind> {
        match name {
            "plain" => Some(StorageKind::Plain),
            "json" => Some(StorageKind::Json),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub city: String,
    pub latitude: f32,
    pub longitude: f32,
    pub storage: StorageKind,
    pub history_file: PathBuf,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            city: "Moscow".to_string(),
            latitude: 55.75,
            longitude: 37.62,
            storage: StorageKind::Json,
            history_file: PathBuf::from("history.json"),
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let conf_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let conf: Config = serde_json::from_str(&conf_str).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        Ok(conf)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Unable to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}
