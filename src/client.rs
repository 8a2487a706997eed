use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, InMemoryCache, ResultCache};
use crate::error::ToolError;
use crate::stream::ChunkSink;
use crate::tools::{ToolRegistry, Validator};
use crate::types::ToolRequest;

/// Per-call switches for [`ToolClient::run_one_function`].
pub struct CallOptions<'a> {
    /// Look up and store the result in the cache.
    pub use_cache: bool,
    /// Check arguments against the descriptor first. Turning this off passes
    /// the raw arguments straight to the tool; name resolution still happens.
    pub validate: bool,
    /// Receives partial output while the tool runs.
    pub stream: Option<&'a mut dyn ChunkSink>,
}

impl<'a> CallOptions<'a> {
    pub fn new() -> Self {
        Self {
            use_cache: false,
            validate: true,
            stream: None,
        }
    }

    pub fn cached(mut self) -> Self {
        self.use_cache = true;
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    pub fn streaming(mut self, sink: &'a mut dyn ChunkSink) -> Self {
        self.stream = Some(sink);
        self
    }
}

impl Default for CallOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of cache traffic through a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
}

#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
}

/// The single call surface for every registered tool.
///
/// Owns a registry that is read-only from here on, so one client can be
/// shared across tasks and threads.
pub struct ToolClient {
    registry: ToolRegistry,
    cache: Box<dyn ResultCache>,
    validator: Validator,
    counters: CacheCounters,
}

impl ToolClient {
    /// Client with an unbounded in-memory cache.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            cache: Box::new(InMemoryCache::new()),
            validator: Validator::new(),
            counters: CacheCounters::default(),
        }
    }

    pub fn with_cache(mut self, cache: impl ResultCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    /// Resolve, validate, consult the cache, execute, store.
    ///
    /// A cache hit returns the stored value without running the tool and
    /// without emitting any chunks. Nothing is cached when the tool fails.
    pub async fn run_one_function(
        &self,
        request: &ToolRequest,
        options: CallOptions<'_>,
    ) -> Result<Value, ToolError> {
        let def = self.registry.resolve(&request.name).map_err(|e| {
            warn!(tool = %request.name, "unknown tool requested");
            e
        })?;
        let tool = def.name();

        let arguments = if options.validate {
            self.validator
                .validate(&def.descriptor, &request.arguments)
                .map_err(|source| {
                    warn!(tool, parameter = %source.parameter, error = %source.violation, "rejected arguments");
                    ToolError::Validation {
                        tool: tool.to_string(),
                        source,
                    }
                })?
        } else {
            debug!(tool, "argument validation skipped by caller");
            request.arguments.clone()
        };

        let key = options
            .use_cache
            .then(|| CacheKey::derive(tool, &arguments));

        if let Some(ref key) = key {
            if let Some(hit) = self.cache.get(key).await {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(tool, key = %key, "cache hit");
                return Ok(hit);
            }
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }

        debug!(tool, streaming = options.stream.is_some(), "executing tool");
        let outcome = match options.stream {
            Some(sink) => {
                let mut counted = CountingSink { inner: sink, chunks: 0 };
                let outcome = def.handler().call_streaming(&arguments, &mut counted).await;
                debug!(tool, chunks = counted.chunks, "stream finished");
                outcome
            }
            None => def.handler().call(&arguments).await,
        };

        let result = outcome.map_err(|source| {
            warn!(tool, error = %source, "tool execution failed");
            ToolError::Execution {
                tool: tool.to_string(),
                source,
            }
        })?;

        if let Some(key) = key {
            info!(tool, key = %key, "caching result");
            self.cache.put(key, result.clone()).await;
            self.counters.stores.fetch_add(1, Ordering::Relaxed);
        }

        Ok(result)
    }

    /// Validated, uncached, non-streaming call.
    pub async fn run(&self, request: &ToolRequest) -> Result<Value, ToolError> {
        self.run_one_function(request, CallOptions::new()).await
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &dyn ResultCache {
        self.cache.as_ref()
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stores: self.counters.stores.load(Ordering::Relaxed),
        }
    }
}

struct CountingSink<'a> {
    inner: &'a mut dyn ChunkSink,
    chunks: usize,
}

impl ChunkSink for CountingSink<'_> {
    fn send(&mut self, chunk: &str) {
        self.chunks += 1;
        self.inner.send(chunk);
    }
}

static SHARED: OnceLock<ToolClient> = OnceLock::new();

/// Install the process-wide client. Succeeds once; later calls hand the
/// rejected client back.
pub fn init_shared_client(client: ToolClient) -> Result<&'static ToolClient, ToolClient> {
    let mut pending = Some(client);
    let installed = SHARED.get_or_init(|| {
        info!("installing shared tool client");
        pending.take().unwrap_or_else(|| ToolClient::new(ToolRegistry::new()))
    });
    match pending {
        None => Ok(installed),
        Some(rejected) => Err(rejected),
    }
}

/// The process-wide client, if one was installed.
pub fn shared_client() -> Option<&'static ToolClient> {
    SHARED.get()
}

/// [`ToolClient::run_one_function`] on the process-wide client.
pub async fn run_shared(
    request: &ToolRequest,
    options: CallOptions<'_>,
) -> Result<Value, ToolError> {
    shared_client()
        .ok_or(ToolError::NoSharedClient)?
        .run_one_function(request, options)
        .await
}

/// Installs a client with the built-in tools if none is installed yet, and
/// returns whichever client is shared.
#[cfg(test)]
pub(crate) fn shared_builtin_client() -> &'static ToolClient {
    use crate::tools::builtin::{builtin_registry, UniProtClient};

    let registry = builtin_registry(UniProtClient::new().with_base_url("http://127.0.0.1:9"))
        .expect("built-in descriptors are valid");
    match init_shared_client(ToolClient::new(registry)) {
        Ok(client) => client,
        Err(_) => shared_client().expect("shared client installed"),
    }
}
