use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::InMemoryCache;
use crate::client::ToolClient;
use crate::error::ConfigError;
use crate::tools::builtin::{builtin_registry, UniProtClient};
use crate::tools::builtin::uniprot::transport::DEFAULT_BASE_URL;

/// Client configuration. Every field has a default, so an empty file works.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub cache: CacheConfig,
    pub uniprot: UniProtConfig,
}

/// Cache bounds. Both `None` means unbounded and never expiring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: Option<usize>,
    pub ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniProtConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UniProtConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let config =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        debug!(path = %path.as_ref().display(), "loaded client config");
        Ok(config)
    }

    /// Apply `UNIPROT_BASE_URL`, `TOOL_CACHE_MAX_ENTRIES` and
    /// `TOOL_CACHE_TTL_SECS` when set. Unparseable numbers are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("UNIPROT_BASE_URL") {
            self.uniprot.base_url = url;
        }
        if let Some(max) = lookup("TOOL_CACHE_MAX_ENTRIES").and_then(|v| v.parse().ok()) {
            self.cache.max_entries = Some(max);
        }
        if let Some(ttl) = lookup("TOOL_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.cache.ttl_secs = Some(ttl);
        }
        self
    }

    pub fn build_cache(&self) -> InMemoryCache {
        let mut cache = InMemoryCache::new();
        if let Some(max) = self.cache.max_entries {
            cache = cache.with_max_entries(max);
        }
        if let Some(ttl) = self.cache.ttl_secs {
            cache = cache.with_ttl(Duration::from_secs(ttl));
        }
        cache
    }
}

impl ToolClient {
    /// Client with every built-in tool, a UniProt transport, and a cache
    /// bounded as configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.uniprot.timeout_secs))
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        let transport = UniProtClient::new()
            .with_client(http)
            .with_base_url(&config.uniprot.base_url);

        let registry = builtin_registry(transport)?;
        Ok(ToolClient::new(registry).with_cache(config.build_cache()))
    }
}
