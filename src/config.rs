use std::fs;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::collector::runner::CatalogRefresh;
use crate::collector::snapshot::ClassificationPolicy;
use crate::util::{parse_env, require_env};

pub const CONFIG_FILE_ENV: &str = "EXPORTER_CONFIG_FILE";
pub const INTERVAL_ENV: &str = "EXPORTER_AWS_API_INTERVAL_SECONDS";
pub const PORT_ENV: &str = "EXPORTER_SERVER_PORT";
pub const CATALOG_REFRESH_ENV: &str = "EXPORTER_CATALOG_REFRESH";
pub const CLASSIFICATION_POLICY_ENV: &str = "EXPORTER_CLASSIFICATION_POLICY";

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// Effective exporter settings after merging the optional JSON
// file with the environment. Environment always wins.
//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Seconds between snapshot cycles
    pub interval_secs: u64,

    /// Port the `/metrics` endpoint listens on
    pub port: u16,

    /// When the deprecation catalog is rebuilt
    pub catalog_refresh: CatalogRefresh,

    /// What an unclassifiable resource does to a cycle
    pub classification_policy: ClassificationPolicy,
}

// ------------------------------------------------------------
// File configuration
// ------------------------------------------------------------
//
// Shape of the JSON file named by EXPORTER_CONFIG_FILE. Every
// field is optional; missing ones must come from the environment.
//
// Example:
//   {
//     "interval_secs": 300,
//     "port": 9150,
//     "catalog_refresh": "every_cycle",
//     "classification_policy": "skip_and_continue"
//   }
//
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub interval_secs: Option<u64>,
    pub port: Option<u16>,
    pub catalog_refresh: Option<CatalogRefresh>,
    pub classification_policy: Option<ClassificationPolicy>,
}

impl Config {
    /// Loads from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match parse_env::<String, _>(&lookup, CONFIG_FILE_ENV)? {
            Some(path) => load_config(&path)?,
            None => FileConfig::default(),
        };

        let interval_secs = match parse_env(&lookup, INTERVAL_ENV)?.or(file.interval_secs) {
            Some(v) => v,
            None => require_env(&lookup, INTERVAL_ENV)?,
        };
        let port = match parse_env(&lookup, PORT_ENV)?.or(file.port) {
            Some(v) => v,
            None => require_env(&lookup, PORT_ENV)?,
        };

        if interval_secs == 0 {
            bail!("{INTERVAL_ENV} must be greater than zero");
        }

        Ok(Self {
            interval_secs,
            port,
            catalog_refresh: parse_env(&lookup, CATALOG_REFRESH_ENV)?
                .or(file.catalog_refresh)
                .unwrap_or_default(),
            classification_policy: parse_env(&lookup, CLASSIFICATION_POLICY_ENV)?
                .or(file.classification_policy)
                .unwrap_or_default(),
        })
    }
}

/// Reads a JSON configuration file.
pub fn load_config(path: &str) -> Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path}"))?;
    parse_config(&data).with_context(|| format!("invalid config file {path}"))
}

pub fn parse_config(data: &str) -> Result<FileConfig> {
    Ok(serde_json::from_str(data)?)
}

/// Environment values use the same spelling as the JSON file.
fn from_snake_case<T: DeserializeOwned>(s: &str) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
}

impl FromStr for CatalogRefresh {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_snake_case(s)
    }
}

impl FromStr for ClassificationPolicy {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_snake_case(s)
    }
}
