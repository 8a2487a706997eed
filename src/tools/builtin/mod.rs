pub mod toxicity;
pub mod uniprot;

use super::handler::ToolDef;
use super::registry::ToolRegistry;
use crate::error::ToolError;

pub use toxicity::{ToxicityEstimator, ToxicityInput, ToxicityVerdict};
pub use uniprot::{UniProtClient, UniProtSearch, UniProtSearchTool, UniProtTransport};

/// Every built-in tool, in registration order.
pub fn builtin_tools(transport: impl UniProtTransport + 'static) -> Vec<ToolDef> {
    vec![
        ToolDef::new(uniprot::descriptor(), UniProtSearchTool::new(transport)),
        ToolDef::new(toxicity::descriptor(), ToxicityEstimator),
    ]
}

pub fn builtin_registry(
    transport: impl UniProtTransport + 'static,
) -> Result<ToolRegistry, ToolError> {
    ToolRegistry::from_tools(builtin_tools(transport))
}
