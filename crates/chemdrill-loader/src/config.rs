//! Engine configuration and loader factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use chemdrill_store::{CacheStore, JsonFileStore};

use crate::fallback::FallbackCatalog;
use crate::loader::{LoaderConfig, PoolLoader};
use crate::remote::HttpRemoteSource;

/// Top-level chemdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemdrillConfig {
    /// Remote pool endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bound on one remote request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Additional fetch attempts after the first failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// How long a fetched pool stays fresh, in seconds.
    #[serde(default = "default_pool_ttl_secs")]
    pub pool_ttl_secs: u64,
    /// Durable store file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_endpoint() -> String {
    "https://api.chemdrill.dev/pools".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_pool_ttl_secs() -> u64 {
    3600
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./chemdrill-store.json")
}

impl Default for ChemdrillConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            pool_ttl_secs: default_pool_ttl_secs(),
            store_path: default_store_path(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `chemdrill.toml` in the current directory
/// 2. `~/.config/chemdrill/config.toml`
///
/// Environment variable override: `CHEMDRILL_ENDPOINT`.
pub fn load_config() -> Result<ChemdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ChemdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("chemdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            global.exists().then_some(global)
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ChemdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ChemdrillConfig::default(),
    };

    if let Ok(endpoint) = std::env::var("CHEMDRILL_ENDPOINT") {
        config.endpoint = endpoint;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("chemdrill"))
}

/// Build a ready-to-use [`PoolLoader`] from a configuration: HTTP source,
/// file-backed durable cache, and the bundled fallback catalog.
pub fn create_loader(config: &ChemdrillConfig) -> Result<PoolLoader> {
    let source = Arc::new(HttpRemoteSource::new(
        &config.endpoint,
        Duration::from_secs(config.request_timeout_secs),
    ));

    let durable = Arc::new(
        JsonFileStore::open(&config.store_path)
            .with_context(|| format!("failed to open store: {}", config.store_path.display()))?,
    );
    let cache = CacheStore::new(durable, Duration::from_secs(config.pool_ttl_secs));

    Ok(PoolLoader::new(
        source,
        cache,
        FallbackCatalog::bundled(),
        LoaderConfig {
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        },
    ))
}
