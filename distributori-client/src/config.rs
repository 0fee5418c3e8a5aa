use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::map::{LatLon, Viewport};

pub const CONFIG_ENV: &str = "DISTRIBUTORI_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout unless set; a pending request otherwise runs until the
    /// transport gives up on its own.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Zoom used when recentering on the first record of a result
    #[serde(default = "default_focus_zoom")]
    pub focus_zoom: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_prefix")]
    pub prefix: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_center_lat() -> f64 {
    41.8719
}

fn default_center_lon() -> f64 {
    12.5674
}

fn default_zoom() -> u8 {
    6
}

fn default_focus_zoom() -> u8 {
    10
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "distributori-client".to_string()
}

fn default_retention_days() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lon: default_center_lon(),
            zoom: default_zoom(),
            focus_zoom: default_focus_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            retention_days: default_retention_days(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            map: MapConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MapConfig {
    pub fn initial_viewport(&self) -> Viewport {
        Viewport {
            center: LatLon::new(self.center_lat, self.center_lon),
            zoom: self.zoom,
        }
    }
}

impl ClientConfig {
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

pub static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(String),
    /// The named file did not exist; built-in defaults are in use.
    Defaults { missing: String },
}

/// Read `path`, falling back to the built-in defaults when it does not exist.
/// A file that exists but does not parse is an error.
pub fn load_config(path: &str) -> anyhow::Result<(ClientConfig, ConfigSource)> {
    if Path::new(path).exists() {
        Ok((ClientConfig::from_file(path)?, ConfigSource::File(path.to_string())))
    } else {
        Ok((
            ClientConfig::default(),
            ConfigSource::Defaults {
                missing: path.to_string(),
            },
        ))
    }
}

/// Load the config named by `DISTRIBUTORI_CONFIG` (or `config.toml`) into
/// [`CONFIG`]. Runs before logging exists, so the caller reports the source.
pub fn read_config() -> anyhow::Result<(&'static ClientConfig, ConfigSource)> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (config, source) = load_config(&path)?;
    Ok((CONFIG.get_or_init(|| config), source))
}
