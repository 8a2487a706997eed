//! Declarative tool metadata: name, description, and the parameter contract.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Any non-collection value: string, number, or boolean.
    Scalar,
    Number,
    Integer,
    String,
    Boolean,
    Sequence,
    Mapping,
}

impl ParamKind {
    /// JSON-Schema `type` keyword for this kind, if it has a single one.
    fn schema_type(self) -> Option<&'static str> {
        match self {
            Self::Scalar => None,
            Self::Number => Some("number"),
            Self::Integer => Some("integer"),
            Self::String => Some("string"),
            Self::Boolean => Some("boolean"),
            Self::Sequence => Some("array"),
            Self::Mapping => Some("object"),
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Scalar => "scalar",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        };
        f.write_str(s)
    }
}

/// Optional value constraints. Numeric bounds are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `pattern`, compiled on first match.
    #[serde(skip)]
    compiled: OnceLock<Option<Regex>>,
}

impl Constraints {
    pub fn is_empty(&self) -> bool {
        self == &Constraints::default()
    }

    /// Whether `text` satisfies `pattern`. No pattern matches everything;
    /// a pattern that does not compile matches nothing.
    pub fn matches_pattern(&self, text: &str) -> bool {
        let Some(pattern) = self.pattern.as_deref() else {
            return true;
        };
        match self.compiled.get_or_init(|| Regex::new(pattern).ok()) {
            Some(re) if re.as_str() == pattern => re.is_match(text),
            // `pattern` was reassigned after the first match.
            _ => Regex::new(pattern).is_ok_and(|re| re.is_match(text)),
        }
    }
}

impl PartialEq for Constraints {
    fn eq(&self, other: &Self) -> bool {
        self.minimum == other.minimum
            && self.maximum == other.maximum
            && self.allowed == other.allowed
            && self.pattern == other.pattern
    }
}

/// One entry of a tool's parameter contract.
///
/// A required parameter never carries a default; the registry rejects
/// descriptors that break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Element kind for sequences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamKind>,
    #[serde(default, skip_serializing_if = "Constraints::is_empty")]
    pub constraints: Constraints,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            required: true,
            default: None,
            items: None,
            constraints: Constraints::default(),
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a default. Makes the parameter optional.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn with_items(mut self, kind: ParamKind) -> Self {
        self.items = Some(kind);
        self
    }

    pub fn min(mut self, minimum: f64) -> Self {
        self.constraints.minimum = Some(minimum);
        self
    }

    pub fn max(mut self, maximum: f64) -> Self {
        self.constraints.maximum = Some(maximum);
        self
    }

    pub fn one_of(mut self, allowed: impl IntoIterator<Item = Value>) -> Self {
        self.constraints.allowed = Some(allowed.into_iter().collect());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.constraints.pattern = Some(pattern.into());
        self
    }

    /// JSON-Schema fragment for this parameter.
    pub fn property_schema(&self) -> Value {
        let mut prop = Map::new();
        if let Some(ty) = self.kind.schema_type() {
            prop.insert("type".into(), json!(ty));
        } else {
            prop.insert("type".into(), json!(["string", "number", "boolean"]));
        }
        if let Some(ref desc) = self.description {
            prop.insert("description".into(), json!(desc));
        }
        if let Some(items) = self.items.and_then(ParamKind::schema_type) {
            prop.insert("items".into(), json!({ "type": items }));
        }
        if let Some(ref default) = self.default {
            prop.insert("default".into(), default.clone());
        }
        if let Some(min) = self.constraints.minimum {
            prop.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.constraints.maximum {
            prop.insert("maximum".into(), json!(max));
        }
        if let Some(ref allowed) = self.constraints.allowed {
            prop.insert("enum".into(), Value::Array(allowed.clone()));
        }
        if let Some(ref pattern) = self.constraints.pattern {
            prop.insert("pattern".into(), json!(pattern));
        }
        Value::Object(prop)
    }
}

/// Immutable metadata attached to a tool implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// JSON-Schema object describing the accepted arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.property_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Complete tool definition: name, description, input_schema.
    pub fn schema(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema(),
        })
    }
}
