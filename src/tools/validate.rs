//! Argument validation against a tool's parameter contract.
//!
//! Policy:
//! - Arguments not declared by the descriptor are rejected (`Violation::Unexpected`).
//! - A `null` argument counts as "not supplied". An explicit empty array or
//!   object is a real value and is kept.
//! - Missing optional parameters get their default; with no default they are
//!   left out of the normalized set.
//! - `number` and `integer` parameters accept numeric strings and normalize
//!   them to JSON numbers. Integral floats become integers for `integer`.
//! - `minimum`/`maximum` apply to numeric values, `pattern` to strings.

use std::collections::HashSet;

use regex::Regex;
use serde_json::{Number, Value};

use crate::error::{ValidationError, Violation};
use crate::tools::descriptor::{ParamKind, ParameterSpec, ToolDescriptor};
use crate::types::Arguments;

/// Stateless checker for argument mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Check `arguments` against `descriptor` and return the normalized set.
    ///
    /// Validating an already-normalized set returns it unchanged.
    pub fn validate(
        &self,
        descriptor: &ToolDescriptor,
        arguments: &Arguments,
    ) -> Result<Arguments, ValidationError> {
        for key in arguments.keys() {
            if descriptor.parameter(key).is_none() {
                return Err(ValidationError::new(key.as_str(), Violation::Unexpected));
            }
        }

        let mut normalized = Arguments::new();
        for spec in &descriptor.parameters {
            let supplied = arguments.get(&spec.name).filter(|v| !v.is_null());
            let value = match (supplied, &spec.default) {
                (Some(v), _) => v,
                (None, _) if spec.required => {
                    return Err(ValidationError::new(spec.name.as_str(), Violation::Missing))
                }
                (None, Some(default)) => default,
                (None, None) => continue,
            };
            let value = check_value(spec, value)
                .map_err(|violation| ValidationError::new(spec.name.as_str(), violation))?;
            normalized.insert(spec.name.clone(), value);
        }

        Ok(normalized)
    }

    /// Structural check run at registration time.
    pub fn check_descriptor(&self, descriptor: &ToolDescriptor) -> Result<(), String> {
        if descriptor.name.trim().is_empty() {
            return Err("tool name is empty".into());
        }

        let mut seen = HashSet::new();
        for spec in &descriptor.parameters {
            if !seen.insert(spec.name.as_str()) {
                return Err(format!("parameter `{}` declared twice", spec.name));
            }
            if spec.required && spec.default.is_some() {
                return Err(format!(
                    "parameter `{}` is required but has a default",
                    spec.name
                ));
            }
            if let Some(ref pattern) = spec.constraints.pattern {
                Regex::new(pattern)
                    .map_err(|e| format!("parameter `{}` has a bad pattern: {e}", spec.name))?;
            }
            if let (Some(min), Some(max)) = (spec.constraints.minimum, spec.constraints.maximum) {
                if min > max {
                    return Err(format!(
                        "parameter `{}` has minimum {min} above maximum {max}",
                        spec.name
                    ));
                }
            }
            if let Some(ref default) = spec.default {
                check_value(spec, default).map_err(|v| {
                    format!("default for `{}` violates its contract: {v}", spec.name)
                })?;
            }
        }
        Ok(())
    }
}

fn check_value(spec: &ParameterSpec, value: &Value) -> Result<Value, Violation> {
    let value = coerce(spec.kind, value).ok_or_else(|| Violation::TypeMismatch {
        expected: spec.kind,
        found: json_type_name(value).to_string(),
    })?;

    if let (Some(items), Value::Array(elements)) = (spec.items, &value) {
        let mut normalized = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let item = coerce(items, element).ok_or_else(|| Violation::InvalidItem {
                index,
                expected: items,
                found: json_type_name(element).to_string(),
            })?;
            normalized.push(item);
        }
        return check_constraints(spec, Value::Array(normalized));
    }

    check_constraints(spec, value)
}

fn check_constraints(spec: &ParameterSpec, value: Value) -> Result<Value, Violation> {
    let c = &spec.constraints;

    if let Some(actual) = value.as_f64() {
        if let Some(minimum) = c.minimum {
            if actual < minimum {
                return Err(Violation::BelowMinimum { minimum, actual });
            }
        }
        if let Some(maximum) = c.maximum {
            if actual > maximum {
                return Err(Violation::AboveMaximum { maximum, actual });
            }
        }
    }

    if let Some(ref allowed) = c.allowed {
        if !allowed.iter().any(|a| same_value(a, &value)) {
            return Err(Violation::NotAllowed {
                allowed: allowed.clone(),
            });
        }
    }

    if let (Some(pattern), Some(text)) = (&c.pattern, value.as_str()) {
        if !c.matches_pattern(text) {
            return Err(Violation::PatternMismatch {
                pattern: pattern.clone(),
            });
        }
    }

    Ok(value)
}

/// Convert `value` into the normalized representation for `kind`, or `None`
/// if it cannot be one.
fn coerce(kind: ParamKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (ParamKind::Number, Value::Number(_)) => Some(value.clone()),
        (ParamKind::Number, Value::String(s)) => parse_number(s),
        (ParamKind::Integer, Value::Number(n)) => integral(n),
        (ParamKind::Integer, Value::String(s)) => match parse_number(s)? {
            Value::Number(n) => integral(&n),
            _ => None,
        },
        (ParamKind::String, Value::String(_))
        | (ParamKind::Boolean, Value::Bool(_))
        | (ParamKind::Sequence, Value::Array(_))
        | (ParamKind::Mapping, Value::Object(_))
        | (ParamKind::Scalar, Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
            Some(value.clone())
        }
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Value> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Value::from(u));
    }
    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
    Number::from_f64(f).map(Value::Number)
}

fn integral(n: &Number) -> Option<Value> {
    if n.is_i64() || n.is_u64() {
        return Some(Value::Number(n.clone()));
    }
    let f = n.as_f64()?;
    // i64::MAX as f64 rounds up to 2^63, which does not fit.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(Value::from(f as i64))
    } else {
        None
    }
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new("search", "Search")
            .param(ParameterSpec::required("query", ParamKind::String).pattern(r"\S"))
            .param(
                ParameterSpec::optional("limit", ParamKind::Integer)
                    .with_default(25)
                    .min(1.0)
                    .max(500.0),
            )
            .param(
                ParameterSpec::optional("fields", ParamKind::Sequence)
                    .with_items(ParamKind::String)
                    .with_default(json!([])),
            )
            .param(ParameterSpec::optional("organism", ParamKind::String))
            .param(
                ParameterSpec::optional("mode", ParamKind::String)
                    .one_of([json!("fast"), json!("full")]),
            )
            .param(ParameterSpec::optional("weight", ParamKind::Number))
    }

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn validate(value: Value) -> Result<Arguments, ValidationError> {
        Validator::new().validate(&descriptor(), &args(value))
    }

    #[test]
    fn fills_defaults_and_omits_absent_optionals() {
        let out = validate(json!({"query": "p53"})).unwrap();
        assert_eq!(
            Value::Object(out),
            json!({"query": "p53", "limit": 25, "fields": []})
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let out = validate(json!({"query": "p53", "organism": null, "limit": null})).unwrap();
        assert!(!out.contains_key("organism"));
        assert_eq!(out["limit"], 25);
    }

    #[test]
    fn explicit_empty_sequence_is_kept() {
        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("tags", ParamKind::Sequence));
        let out = Validator::new()
            .validate(&d, &args(json!({"tags": []})))
            .unwrap();
        assert_eq!(out["tags"], json!([]));
        let out = Validator::new().validate(&d, &args(json!({}))).unwrap();
        assert!(!out.contains_key("tags"));
    }

    #[test]
    fn missing_required_fails() {
        let err = validate(json!({"limit": 5})).unwrap_err();
        assert_eq!(err.parameter, "query");
        assert_eq!(err.violation, Violation::Missing);

        let err = validate(json!({"query": null})).unwrap_err();
        assert_eq!(err.violation, Violation::Missing);
    }

    #[test]
    fn unexpected_parameter_is_rejected() {
        let err = validate(json!({"query": "x", "limt": 5})).unwrap_err();
        assert_eq!(err.parameter, "limt");
        assert_eq!(err.violation, Violation::Unexpected);
    }

    #[test]
    fn range_violation_is_reported_not_clamped() {
        let err = validate(json!({"query": "x", "limit": 501})).unwrap_err();
        assert_eq!(err.parameter, "limit");
        assert_eq!(
            err.violation,
            Violation::AboveMaximum {
                maximum: 500.0,
                actual: 501.0
            }
        );

        let err = validate(json!({"query": "x", "limit": 0})).unwrap_err();
        assert!(matches!(err.violation, Violation::BelowMinimum { .. }));
    }

    #[test]
    fn type_mismatch_names_both_kinds() {
        let err = validate(json!({"query": 42})).unwrap_err();
        assert_eq!(
            err.violation,
            Violation::TypeMismatch {
                expected: ParamKind::String,
                found: "number".into()
            }
        );
        let err = validate(json!({"query": "x", "limit": 2.5})).unwrap_err();
        assert!(matches!(err.violation, Violation::TypeMismatch { .. }));
    }

    #[test]
    fn numeric_strings_are_normalized() {
        let out = validate(json!({"query": "x", "limit": "10", "weight": "0.5"})).unwrap();
        assert_eq!(out["limit"], json!(10));
        assert_eq!(out["weight"], json!(0.5));

        let out = validate(json!({"query": "x", "limit": 10.0})).unwrap();
        assert!(out["limit"].is_i64());

        let err = validate(json!({"query": "x", "limit": "ten"})).unwrap_err();
        assert!(matches!(err.violation, Violation::TypeMismatch { .. }));
    }

    #[test]
    fn large_integers_are_kept_exactly_or_rejected() {
        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("n", ParamKind::Integer));
        let check = |v: Value| Validator::new().validate(&d, &args(json!({ "n": v })));

        let out = check(json!("9223372036854775808")).unwrap();
        assert_eq!(out["n"].as_u64(), Some(9_223_372_036_854_775_808));
        assert_eq!(out["n"], json!(9_223_372_036_854_775_808u64));

        let out = check(json!(9_223_372_036_854_775_808u64)).unwrap();
        assert_eq!(out["n"].as_u64(), Some(9_223_372_036_854_775_808));

        let err = check(json!(9.223372036854775808e18)).unwrap_err();
        assert!(matches!(err.violation, Violation::TypeMismatch { .. }));

        let out = check(json!(-9.223372036854775808e18)).unwrap();
        assert_eq!(out["n"].as_i64(), Some(i64::MIN));

        let err = check(json!("18446744073709551616")).unwrap_err();
        assert!(matches!(err.violation, Violation::TypeMismatch { .. }));
    }

    #[test]
    fn scalar_boolean_and_mapping_kinds() {
        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("flag", ParamKind::Boolean))
            .param(ParameterSpec::optional("opts", ParamKind::Mapping))
            .param(ParameterSpec::optional("any", ParamKind::Scalar));
        let check = |v: Value| Validator::new().validate(&d, &args(v));
        let mismatch = |v: Value| check(v).unwrap_err().violation;

        assert_eq!(
            mismatch(json!({"flag": "true"})),
            Violation::TypeMismatch {
                expected: ParamKind::Boolean,
                found: "string".into()
            }
        );
        assert_eq!(
            mismatch(json!({"flag": 1})),
            Violation::TypeMismatch {
                expected: ParamKind::Boolean,
                found: "number".into()
            }
        );
        assert_eq!(
            mismatch(json!({"opts": [1, 2]})),
            Violation::TypeMismatch {
                expected: ParamKind::Mapping,
                found: "array".into()
            }
        );
        assert_eq!(
            mismatch(json!({"any": [1]})),
            Violation::TypeMismatch {
                expected: ParamKind::Scalar,
                found: "array".into()
            }
        );
        assert_eq!(
            mismatch(json!({"any": {"k": 1}})),
            Violation::TypeMismatch {
                expected: ParamKind::Scalar,
                found: "object".into()
            }
        );

        let out = check(json!({"flag": false, "opts": {}, "any": "text"})).unwrap();
        assert_eq!(out["flag"], json!(false));
        assert_eq!(out["opts"], json!({}));
        assert_eq!(out["any"], json!("text"));

        for scalar in [json!(3), json!(2.5), json!(true)] {
            let out = check(json!({ "any": scalar.clone() })).unwrap();
            assert_eq!(out["any"], scalar);
        }
    }

    #[test]
    fn pattern_and_enum_constraints() {
        let err = validate(json!({"query": "   "})).unwrap_err();
        assert!(matches!(err.violation, Violation::PatternMismatch { .. }));

        let err = validate(json!({"query": "x", "mode": "slow"})).unwrap_err();
        assert_eq!(err.parameter, "mode");
        assert!(matches!(err.violation, Violation::NotAllowed { .. }));

        assert!(validate(json!({"query": "x", "mode": "full"})).is_ok());
    }

    #[test]
    fn sequence_items_are_checked() {
        let err = validate(json!({"query": "x", "fields": ["accession", 3]})).unwrap_err();
        assert_eq!(
            err.violation,
            Violation::InvalidItem {
                index: 1,
                expected: ParamKind::String,
                found: "number".into()
            }
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let first = validate(json!({"query": "x", "limit": "7", "fields": ["id"]})).unwrap();
        let second = Validator::new().validate(&descriptor(), &first).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn descriptor_checks() {
        let v = Validator::new();
        assert!(v.check_descriptor(&descriptor()).is_ok());

        let mut bad = ParameterSpec::required("a", ParamKind::Number);
        bad.default = Some(json!(1));
        let d = ToolDescriptor::new("t", "t").param(bad);
        assert!(v.check_descriptor(&d).unwrap_err().contains("required"));

        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("p", ParamKind::String).pattern("("));
        assert!(v.check_descriptor(&d).is_err());

        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("n", ParamKind::Integer).with_default(900).max(500.0));
        assert!(v.check_descriptor(&d).is_err());

        let d = ToolDescriptor::new("t", "t")
            .param(ParameterSpec::optional("n", ParamKind::Integer))
            .param(ParameterSpec::optional("n", ParamKind::String));
        assert!(v.check_descriptor(&d).unwrap_err().contains("twice"));
    }
}
