use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding users.csv, items.csv and events.csv
    #[serde(default = "default_data_raw_dir")]
    pub data_raw_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Items watched longer than this (seconds) are never recommended back to the user
    #[serde(default = "default_watch_exclude_threshold")]
    pub watch_exclude_threshold: i64,
}

fn default_data_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_watch_exclude_threshold() -> i64 {
    600
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
