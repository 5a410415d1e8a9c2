//! Configuration module for mapwatch.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::{MapwatchError, Result};

/// Listing poll configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// URL of the beatmap listing page.
    #[serde(default = "default_listing_url")]
    pub url: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Poll interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Notification window in minutes.
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
}

fn default_listing_url() -> String {
    "https://osu.ppy.sh/beatmapsets/".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    600 // 10 minutes
}

fn default_window_minutes() -> i64 {
    30
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: default_listing_url(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            poll_interval_secs: default_poll_interval(),
            window_minutes: default_window_minutes(),
        }
    }
}

/// Messaging backend API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the OneBot-compatible HTTP API.
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Optional bearer token for the API.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5700".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            access_token: None,
        }
    }
}

/// Event gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

/// Durable state storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the watermark and subscription files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mapwatch.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Listing poll settings.
    #[serde(default)]
    pub listing: ListingConfig,
    /// Messaging backend API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Event gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// State storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| MapwatchError::Config(format!("failed to parse config: {e}")))
    }
}
