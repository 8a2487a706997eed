//! Named tool invocation: a registry of tool descriptors, argument
//! validation, a result cache, and a dispatcher that ties them together
//! with optional chunked streaming.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod stream;
pub mod tools;
pub mod types;

pub use cache::{CacheKey, InMemoryCache, NoCache, ResultCache};
pub use client::{
    init_shared_client, run_shared, shared_client, CacheStats, CallOptions, ToolClient,
};
pub use config::{CacheConfig, ClientConfig, UniProtConfig};
pub use error::{
    ConfigError, HandlerError, ToolError, TransportError, ValidationError, Violation,
};
pub use stream::{ChannelSink, ChunkSink, CollectingSink};
pub use tools::builtin::{builtin_registry, builtin_tools};
pub use tools::{
    Constraints, ParamKind, ParameterSpec, ToolDef, ToolDescriptor, ToolHandler, ToolRegistry,
    Validator,
};
pub use types::{Arguments, ToolRequest};
