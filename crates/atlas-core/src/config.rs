//! Dashboard configuration.

use crate::Metric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SKI_ATLAS_CONFIG";
/// Config file picked up when present and nothing else is given.
pub const DEFAULT_CONFIG_PATH: &str = "assets/config/dashboard.yaml";
/// Dataset location relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "assets/data/resorts.csv";
/// Bind address of the dashboard host.
pub const DEFAULT_BIND: &str = "127.0.0.1:1102";

/// How the map's feature checkboxes combine with the price limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePolicy {
    /// Each enabled feature replaces the selection; the last one wins and the
    /// price limit is dropped. Summer, then night, then snowparks.
    #[default]
    LastWins,
    /// Price limit and every enabled feature must all hold.
    Intersect,
}

/// Initial control values, also used when a request omits a control.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlDefaults {
    /// Price slider value.
    pub max_price: f64,
    pub continent: String,
    pub country: String,
    pub metric: Metric,
    /// Resort reported on before the user hovers any bar.
    pub hovered_resort: String,
}

impl Default for ControlDefaults {
    fn default() -> Self {
        Self {
            max_price: 50.0,
            continent: "Europe".to_string(),
            country: "Norway".to_string(),
            metric: Metric::Price,
            hovered_resort: "Hemsedal".to_string(),
        }
    }
}

/// Top-level configuration shared by the dashboard host and the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Resort table location.
    pub data_path: PathBuf,
    /// Socket address the host listens on.
    pub bind: String,
    pub feature_policy: FeaturePolicy,
    pub defaults: ControlDefaults,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind: DEFAULT_BIND.to_string(),
            feature_policy: FeaturePolicy::default(),
            defaults: ControlDefaults::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DashboardConfig {
    /// Parse a YAML document; omitted keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse a YAML config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Resolve the config: an explicit path, then `SKI_ATLAS_CONFIG`, then
    /// [`DEFAULT_CONFIG_PATH`] if it exists, then built-in defaults.
    ///
    /// An explicit or env-named file must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = named {
            info!(path = %path.display(), "loading config");
            return Self::from_path(&path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.is_file() {
            info!(path = %fallback.display(), "loading config");
            return Self::from_path(fallback);
        }
        Ok(Self::default())
    }
}
