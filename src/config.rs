//! Configuration Module
//!
//! Handles loading and validating manager configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{CacheError, Result};

/// Seven days, the default freshness window for stamped entries.
pub const DEFAULT_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

/// Manager configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Generation tag embedded in every store name (build/deploy identifier)
    pub generation: String,
    /// Prefix shared by all store names
    pub store_prefix: String,
    /// Origin server that intercepted requests are forwarded to
    pub origin: String,
    /// HTTP server port
    pub server_port: u16,
    /// Item cap of the runtime store
    pub runtime_max_items: usize,
    /// Item cap of the image store
    pub image_max_items: usize,
    /// Max age in seconds before a stamped entry is considered stale
    pub max_age_secs: u64,
    /// Path prefix of the live-data API namespace (never intercepted)
    pub api_prefix: String,
    /// Path of the offline placeholder document
    pub offline_path: String,
    /// Paths pre-populated into the install store
    pub seed_paths: Vec<String>,
    /// Optional per-store byte quota
    pub store_quota_bytes: Option<usize>,
    /// Timeout for outbound fetches in seconds
    pub fetch_timeout_secs: u64,
    /// Client sessions remembered at once; the oldest is forgotten first
    pub max_clients: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_GENERATION` - Generation tag (default: v1)
    /// - `CACHE_PREFIX` - Store name prefix (default: offline)
    /// - `ORIGIN_URL` - Origin server (default: http://127.0.0.1:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `RUNTIME_MAX_ITEMS` - Runtime store cap (default: 50)
    /// - `IMAGE_MAX_ITEMS` - Image store cap (default: 60)
    /// - `MAX_AGE_SECS` - Freshness window (default: 7 days)
    /// - `API_PREFIX` - Bypassed API namespace (default: /api/)
    /// - `OFFLINE_PATH` - Offline placeholder document (default: /offline)
    /// - `SEED_PATHS` - Comma separated install seed list (default: /,/offline,/manifest.json)
    /// - `STORE_QUOTA_BYTES` - Per-store byte quota (default: unlimited)
    /// - `FETCH_TIMEOUT_SECS` - Outbound fetch timeout (default: 30)
    /// - `MAX_CLIENTS` - Tracked client sessions (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            generation: env::var("CACHE_GENERATION").unwrap_or(defaults.generation),
            store_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.store_prefix),
            origin: env::var("ORIGIN_URL").unwrap_or(defaults.origin),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            runtime_max_items: parse_var("RUNTIME_MAX_ITEMS")
                .unwrap_or(defaults.runtime_max_items),
            image_max_items: parse_var("IMAGE_MAX_ITEMS").unwrap_or(defaults.image_max_items),
            max_age_secs: parse_var("MAX_AGE_SECS").unwrap_or(defaults.max_age_secs),
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),
            offline_path: env::var("OFFLINE_PATH").unwrap_or(defaults.offline_path),
            seed_paths: env::var("SEED_PATHS")
                .map(|v| parse_list(&v))
                .unwrap_or(defaults.seed_paths),
            store_quota_bytes: parse_var("STORE_QUOTA_BYTES"),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout_secs),
            max_clients: parse_var("MAX_CLIENTS").unwrap_or(defaults.max_clients),
        }
    }

    /// Checks values that would leave the manager unusable.
    pub fn validate(&self) -> Result<()> {
        if self.generation.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "generation tag cannot be empty".to_string(),
            ));
        }
        if self.runtime_max_items == 0 || self.image_max_items == 0 {
            return Err(CacheError::InvalidConfig(
                "store caps must be greater than zero".to_string(),
            ));
        }
        if self.max_clients == 0 {
            return Err(CacheError::InvalidConfig(
                "max clients must be greater than zero".to_string(),
            ));
        }
        if !self.api_prefix.starts_with('/') {
            return Err(CacheError::InvalidConfig(format!(
                "api prefix must start with '/': {}",
                self.api_prefix
            )));
        }
        self.origin_url()?;
        Ok(())
    }

    /// Parses the configured origin.
    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin)
            .map_err(|e| CacheError::InvalidConfig(format!("origin '{}': {}", self.origin, e)))
    }

    /// True when the offline placeholder is part of the seed list.
    pub fn seeds_offline_document(&self) -> bool {
        self.seed_paths.iter().any(|p| p == &self.offline_path)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generation: "v1".to_string(),
            store_prefix: "offline".to_string(),
            origin: "http://127.0.0.1:8080".to_string(),
            server_port: 3000,
            runtime_max_items: 50,
            image_max_items: 60,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            api_prefix: "/api/".to_string(),
            offline_path: "/offline".to_string(),
            seed_paths: vec![
                "/".to_string(),
                "/offline".to_string(),
                "/manifest.json".to_string(),
            ],
            store_quota_bytes: None,
            fetch_timeout_secs: 30,
            max_clients: 1024,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
