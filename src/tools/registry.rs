use serde_json::{json, Value};
use tracing::info;

use super::descriptor::ToolDescriptor;
use super::handler::{ToolDef, ToolHandler};
use super::validate::Validator;
use crate::error::ToolError;

/// Catalog of available tools, keyed by unique name.
///
/// Built once by an explicit initialization step and handed to a
/// [`ToolClient`](crate::ToolClient), which never mutates it. Registering a
/// name twice always fails with [`ToolError::DuplicateTool`]; there is no
/// replacement or late registration.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build a registry from an enumerated list of tools, in order.
    pub fn from_tools(tools: impl IntoIterator<Item = ToolDef>) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        for def in tools {
            registry.insert(def)?;
        }
        Ok(registry)
    }

    /// Register a tool under its descriptor's name.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), ToolError> {
        self.insert(ToolDef::new(descriptor, handler))
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with(
        mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<Self, ToolError> {
        self.register(descriptor, handler)?;
        Ok(self)
    }

    fn insert(&mut self, def: ToolDef) -> Result<(), ToolError> {
        if self.contains(def.name()) {
            return Err(ToolError::DuplicateTool {
                name: def.name().to_string(),
            });
        }
        Validator::new()
            .check_descriptor(&def.descriptor)
            .map_err(|reason| ToolError::InvalidDescriptor {
                tool: def.name().to_string(),
                reason,
            })?;

        info!(
            tool = def.name(),
            parameters = def.descriptor.parameters.len(),
            "registered tool"
        );
        self.tools.push(def);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&ToolDef, ToolError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
            })
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.resolve(name).ok().map(|t| &t.descriptor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// All tool schemas: name, description, input_schema.
    pub fn schemas(&self) -> Vec<Value> {
        self.tools.iter().map(|t| t.descriptor.schema()).collect()
    }

    /// Search tools by query. Matches any whitespace-separated term against
    /// name and description. Returns compact summaries without input schemas.
    pub fn search(&self, query: &str) -> Vec<Value> {
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();

        self.tools
            .iter()
            .filter(|t| {
                let haystack = format!(
                    "{} {}",
                    t.descriptor.name.to_lowercase(),
                    t.descriptor.description.to_lowercase()
                );
                terms.iter().any(|term| haystack.contains(term))
            })
            .map(|t| {
                json!({
                    "name": t.descriptor.name,
                    "description": t.descriptor.description,
                })
            })
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
