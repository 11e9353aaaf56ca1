use crate::error::{BidError, BidResult};
use crate::types::AgentSpec;
use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from environment variables
/// with the prefix `OPENBIDDER__`. The agents file is separate and comes
/// from the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub acs: AcsConfig,
    #[serde(default)]
    pub banker: BankerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_bid_port")]
    pub bid_port: u16,
    #[serde(default = "default_win_port")]
    pub win_port: u16,
    #[serde(default = "default_event_port")]
    pub event_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcsConfig {
    #[serde(default = "default_acs_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankerConfig {
    #[serde(default = "default_banker_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_bid_port() -> u16 {
    7654
}
fn default_win_port() -> u16 {
    7653
}
fn default_event_port() -> u16 {
    7652
}
fn default_acs_url() -> String {
    "http://127.0.0.1:9986".to_string()
}
fn default_banker_url() -> String {
    "http://127.0.0.1:9985".to_string()
}
fn default_metrics_port() -> u16 {
    9091
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            bid_port: default_bid_port(),
            win_port: default_win_port(),
            event_port: default_event_port(),
        }
    }
}

impl Default for AcsConfig {
    fn default() -> Self {
        Self {
            base_url: default_acs_url(),
        }
    }
}

impl Default for BankerConfig {
    fn default() -> Self {
        Self {
            base_url: default_banker_url(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            acs: AcsConfig::default(),
            banker: BankerConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("OPENBIDDER")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// Load the agents file: a JSON array of [`AgentSpec`]. Any parse or read
/// failure is fatal at startup.
pub fn load_agents(path: &Path) -> BidResult<Vec<AgentSpec>> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| BidError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| BidError::ConfigLoad(format!("{}: {}", path.display(), e)))
}
