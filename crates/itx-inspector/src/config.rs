//! Inspector configuration.
//!
//! Defaults can be overridden through `ITX_NETWORK`, `ITX_LOG_LEVEL` and
//! `ITX_LOG_FORMAT`.

use std::str::FromStr;

use itx_core::address::Network;
use serde::{Deserialize, Serialize};

pub const ENV_NETWORK: &str = "ITX_NETWORK";
pub const ENV_LOG_LEVEL: &str = "ITX_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "ITX_LOG_FORMAT";

/// Output format for log lines.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct InspectorConfig {
    /// Network used to recognize action envelopes and render addresses.
    pub network: Network,
    /// Log level filter string (e.g. "info", "itx_inspector=debug").
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl InspectorConfig {
    /// Defaults overlaid with any `ITX_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(network) = lookup(ENV_NETWORK) {
            config.network = network.parse().map_err(|e| format!("{ENV_NETWORK}: {e}"))?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_format = format.parse()?;
        }
        Ok(config)
    }
}
