//! Configuration - Type-safe, validated config
//!
//! Loads from `config.toml` at the project root. Falls back to built-in
//! defaults when no file is present.

use serde::Deserialize;
use std::path::Path;

use crate::core::{Error, Result};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Ticker feed settings
    pub feed: FeedConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint delivering tick batches
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Redraw in place instead of appending to the scrollback
    #[serde(default = "default_clear_screen")]
    pub clear_screen: bool,
}

fn default_ws_url() -> String {
    "ws://stocks.mnet.website".to_string()
}

fn default_clear_screen() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig {
                ws_url: default_ws_url(),
            },
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            clear_screen: default_clear_screen(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load from the default location (project root config.toml).
    pub fn load_default() -> Self {
        let candidates = [
            "config.toml",
            concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"),
        ];

        for path in &candidates {
            if let Ok(cfg) = Self::load(Path::new(path)) {
                tracing::info!("📋 Loaded config from {}", path);
                return cfg;
            }
        }

        tracing::warn!("⚠️ No config.toml found, using defaults");
        Self::default()
    }
}
