//! Deterministic cache keys.
//!
//! A key is the SHA-256 of the canonical JSON text of `{"tool": name,
//! "arguments": args}`. Canonical form sorts object keys recursively and
//! writes integral floats as integers (`30.0` and `30` hash the same), so
//! argument construction order never changes the key.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use crate::types::Arguments;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a call. Pure function of its inputs.
    pub fn derive(tool: &str, arguments: &Arguments) -> Self {
        let canonical = canonicalize(json!({
            "tool": tool,
            "arguments": Value::Object(arguments.clone()),
        }));
        let digest = Sha256::digest(canonical.to_string().as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a JSON value into its canonical form.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Value::from(f as i64)
            }
            _ => Value::Number(n),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn key_ignores_construction_order() {
        let mut a = Arguments::new();
        a.insert("size_nm".into(), json!(30));
        a.insert("material".into(), json!("polymer"));
        a.insert("charge_mV".into(), json!(10));

        let mut b = Arguments::new();
        b.insert("charge_mV".into(), json!(10));
        b.insert("material".into(), json!("polymer"));
        b.insert("size_nm".into(), json!(30));

        assert_eq!(CacheKey::derive("tox", &a), CacheKey::derive("tox", &b));
    }

    #[test]
    fn integral_floats_match_integers() {
        let a = args(json!({"n": 30.0, "nested": {"z": 1.0, "a": [2.0]}}));
        let b = args(json!({"nested": {"a": [2], "z": 1}, "n": 30}));
        assert_eq!(CacheKey::derive("t", &a), CacheKey::derive("t", &b));
    }

    #[test]
    fn tool_name_and_values_matter() {
        let a = args(json!({"n": 1}));
        let b = args(json!({"n": 2}));
        assert_ne!(CacheKey::derive("t", &a), CacheKey::derive("t", &b));
        assert_ne!(CacheKey::derive("t", &a), CacheKey::derive("u", &a));
        assert_ne!(
            CacheKey::derive("t", &args(json!({"n": 1.5}))),
            CacheKey::derive("t", &a)
        );
    }

    #[test]
    fn key_is_hex_sha256() {
        let key = CacheKey::derive("t", &Arguments::new());
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn canonicalize_sorts_nested_keys() {
        let v = canonicalize(json!({"b": {"y": 1, "x": 2}, "a": 3}));
        assert_eq!(v.to_string(), r#"{"a":3,"b":{"x":2,"y":1}}"#);
    }
}
