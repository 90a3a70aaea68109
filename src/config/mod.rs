use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{RetryPolicy, is_transient};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_ZONES: &str = "flood_prone.geojson";

fn default_verbose() -> bool {
    false
}

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub bind: Option<SocketAddr>,
    #[serde(default)]
    pub zones: Option<PathBuf>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    #[serde(default)]
    pub routing: Option<RoutingConfig>,
}

fn default_base_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    400
}

fn default_max_delay_ms() -> u64 {
    4000
}

fn default_max_concurrency() -> usize {
    1
}

fn default_cache_capacity() -> u64 {
    256
}

/// Settings for the OpenRouteService client.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RoutingConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// In-flight provider requests allowed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_concurrency: default_max_concurrency(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl RoutingConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            retryable: is_transient,
        }
    }
}

/// Result of searching the default config locations.
#[derive(Debug, Default)]
pub struct Discovered {
    pub config: Option<FileConfig>,
    /// Files that exist but could not be read or parsed, with the reason
    pub rejected: Vec<(PathBuf, String)>,
}

impl FileConfig {
    /// Search the default locations. Runs before logging is set up, so
    /// unusable files are returned for the caller to report.
    pub fn load() -> Discovered {
        Self::load_from(&get_config_paths())
    }

    /// First file in `paths` that parses wins.
    pub fn load_from(paths: &[PathBuf]) -> Discovered {
        let mut rejected = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            let parsed: Result<FileConfig, String> = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|contents| toml::from_str(&contents).map_err(|e| e.to_string()));

            match parsed {
                Ok(config) => {
                    return Discovered {
                        config: Some(config),
                        rejected,
                    };
                }
                Err(e) => rejected.push((path.clone(), e)),
            }
        }

        Discovered {
            config: None,
            rejected,
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("floodroute.toml"));
    paths.push(PathBuf::from(".floodroute.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("floodroute").join("config.toml"));
        paths.push(config_dir.join("floodroute.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".floodroute.toml"));
        paths.push(home.join(".config").join("floodroute").join("config.toml"));
    }

    paths
}
