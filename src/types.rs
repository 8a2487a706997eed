use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Argument mapping passed to a tool: parameter name to JSON value.
pub type Arguments = Map<String, Value>;

/// One invocation: which tool, with which arguments. Created per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Arguments::new(),
        }
    }

    /// Add one argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// Build a request from any serializable argument struct.
    /// Fields serialized as `null` are kept; the validator treats them as absent.
    pub fn from_args<T: Serialize>(
        name: impl Into<String>,
        args: &T,
    ) -> Result<Self, serde_json::Error> {
        let arguments = match serde_json::to_value(args)? {
            Value::Object(map) => map,
            Value::Null => Arguments::new(),
            other => {
                return Err(serde::ser::Error::custom(format!(
                    "tool arguments must serialize to an object, got {other}"
                )))
            }
        };
        Ok(Self {
            name: name.into(),
            arguments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_arguments() {
        let req = ToolRequest::new("echo").arg("a", 1).arg("b", "two");
        assert_eq!(req.name, "echo");
        assert_eq!(Value::Object(req.arguments), json!({"a": 1, "b": "two"}));
    }

    #[test]
    fn from_args_rejects_non_objects() {
        assert!(ToolRequest::from_args("x", &vec![1, 2]).is_err());
        let empty = ToolRequest::from_args("x", &()).unwrap();
        assert!(empty.arguments.is_empty());
    }

    #[test]
    fn deserializes_without_arguments() {
        let req: ToolRequest = serde_json::from_value(json!({"name": "Foo"})).unwrap();
        assert!(req.arguments.is_empty());
    }
}
