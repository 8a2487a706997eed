use serde_json::Value;

use crate::tools::descriptor::ParamKind;

/// Everything that can go wrong registering or dispatching a tool.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },
    #[error("tool already registered: {name}")]
    DuplicateTool { name: String },
    #[error("invalid descriptor for {tool}: {reason}")]
    InvalidDescriptor { tool: String, reason: String },
    #[error("invalid arguments for {tool}: {source}")]
    Validation {
        tool: String,
        #[source]
        source: ValidationError,
    },
    #[error("tool {tool} failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: HandlerError,
    },
    #[error("no shared tool client installed")]
    NoSharedClient,
}

impl ToolError {
    /// The field-level detail of a validation failure, if that is what this is.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ToolError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A single parameter failed its contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parameter `{parameter}`: {violation}")]
pub struct ValidationError {
    pub parameter: String,
    pub violation: Violation,
}

impl ValidationError {
    pub fn new(parameter: impl Into<String>, violation: Violation) -> Self {
        Self {
            parameter: parameter.into(),
            violation,
        }
    }
}

/// Which constraint a parameter value broke.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Missing,
    TypeMismatch { expected: ParamKind, found: String },
    BelowMinimum { minimum: f64, actual: f64 },
    AboveMaximum { maximum: f64, actual: f64 },
    PatternMismatch { pattern: String },
    NotAllowed { allowed: Vec<Value> },
    InvalidItem { index: usize, expected: ParamKind, found: String },
    Unexpected,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => write!(f, "required parameter is missing"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::BelowMinimum { minimum, actual } => {
                write!(f, "{actual} is below the minimum of {minimum}")
            }
            Self::AboveMaximum { maximum, actual } => {
                write!(f, "{actual} exceeds the maximum of {maximum}")
            }
            Self::PatternMismatch { pattern } => write!(f, "does not match pattern {pattern}"),
            Self::NotAllowed { allowed } => {
                let list = allowed
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "must be one of [{list}]")
            }
            Self::InvalidItem {
                index,
                expected,
                found,
            } => write!(f, "item {index}: expected {expected}, found {found}"),
            Self::Unexpected => write!(f, "not a declared parameter"),
        }
    }
}

/// Failure raised by a tool body.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Failed(String),
}

/// Failure talking to a remote backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("http client error: {0}")]
    Http(String),
    #[error(transparent)]
    Registry(#[from] ToolError),
}
