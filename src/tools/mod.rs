pub mod builtin;
pub mod descriptor;
pub mod handler;
pub mod registry;
pub mod validate;

pub use descriptor::{Constraints, ParamKind, ParameterSpec, ToolDescriptor};
pub use handler::{ToolDef, ToolHandler};
pub use registry::ToolRegistry;
pub use validate::Validator;
