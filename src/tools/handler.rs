use async_trait::async_trait;
use serde_json::Value;

use super::descriptor::ToolDescriptor;
use crate::error::HandlerError;
use crate::stream::ChunkSink;
use crate::types::Arguments;

/// A tool's execution body. Implement this once per tool.
///
/// Arguments arrive already normalized unless the caller opted out of
/// validation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: &Arguments) -> Result<Value, HandlerError>;

    /// Run while emitting partial output to `sink`. The returned value must
    /// equal what [`call`](Self::call) returns for the same arguments.
    /// Tools without incremental output keep this default.
    async fn call_streaming(
        &self,
        args: &Arguments,
        sink: &mut dyn ChunkSink,
    ) -> Result<Value, HandlerError> {
        let _ = sink;
        self.call(args).await
    }
}

/// A registered tool: its descriptor plus the handler that owns its logic.
pub struct ToolDef {
    pub descriptor: ToolDescriptor,
    pub(crate) handler: Box<dyn ToolHandler>,
}

impl ToolDef {
    pub fn new(descriptor: ToolDescriptor, handler: impl ToolHandler + 'static) -> Self {
        Self {
            descriptor,
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }
}
