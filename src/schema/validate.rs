//! Validator seam and the built-in value kinds.
//!
//! The resolver never inspects a value's type itself. It hands the picked
//! candidate to the field's [`Validator`] and interprets only the outcome:
//! an accepted (possibly coerced) value, or a list of issues of which the
//! first is reported.

use regex_lite::Regex;
use serde_json::{Number, Value};
use std::fmt;

/// Accepts or rejects a candidate value for one field.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<Value, Vec<String>>;

    /// Short description for debug output.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

/// Adapts a closure into a [`Validator`].
pub struct FnValidator<F> {
    name: String,
    check: F,
}

pub fn validator_fn<F>(name: impl Into<String>, check: F) -> FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, Vec<String>> + Send + Sync,
{
    FnValidator {
        name: name.into(),
        check,
    }
}

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Value) -> Result<Value, Vec<String>> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<Value, Vec<String>> {
        (self.check)(value)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Built-in value kinds.
///
/// Strings are coerced where the kind allows it, since environment
/// variables and secret files only ever produce strings.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Any,
    String { pattern: Option<Regex> },
    Integer { min: Option<i64>, max: Option<i64> },
    Number,
    Boolean,
    /// TCP/UDP port, 1..=65535.
    Port,
    /// One of a fixed set of strings.
    Enum(Vec<String>),
}

impl ValueKind {
    pub fn string() -> Self {
        ValueKind::String { pattern: None }
    }

    pub fn integer() -> Self {
        ValueKind::Integer { min: None, max: None }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Any => write!(f, "any"),
            ValueKind::String { pattern: Some(re) } => write!(f, "string /{}/", re.as_str()),
            ValueKind::String { pattern: None } => write!(f, "string"),
            ValueKind::Integer { .. } => write!(f, "integer"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Boolean => write!(f, "boolean"),
            ValueKind::Port => write!(f, "port"),
            ValueKind::Enum(values) => write!(f, "enum({})", values.join("|")),
        }
    }
}

impl Validator for ValueKind {
    fn validate(&self, value: &Value) -> Result<Value, Vec<String>> {
        match self {
            ValueKind::Any => Ok(value.clone()),
            ValueKind::String { pattern } => {
                let Value::String(s) = value else {
                    return Err(vec![expected("string", value)]);
                };
                if let Some(re) = pattern
                    && !re.is_match(s)
                {
                    return Err(vec![format!("does not match pattern /{}/", re.as_str())]);
                }
                Ok(value.clone())
            }
            ValueKind::Integer { min, max } => {
                let n = as_integer(value).ok_or_else(|| vec![expected("integer", value)])?;
                let mut issues = Vec::new();
                if let Some(min) = min
                    && n < *min
                {
                    issues.push(format!("must be >= {}", min));
                }
                if let Some(max) = max
                    && n > *max
                {
                    issues.push(format!("must be <= {}", max));
                }
                if issues.is_empty() {
                    Ok(Value::from(n))
                } else {
                    Err(issues)
                }
            }
            ValueKind::Number => match value {
                Value::Number(_) => Ok(value.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| vec![expected("number", value)]),
                _ => Err(vec![expected("number", value)]),
            },
            ValueKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                    "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                    _ => Err(vec![expected("boolean", value)]),
                },
                _ => Err(vec![expected("boolean", value)]),
            },
            ValueKind::Port => {
                let n = as_integer(value).ok_or_else(|| vec![expected("port", value)])?;
                if (1..=65535).contains(&n) {
                    Ok(Value::from(n))
                } else {
                    Err(vec!["port must be between 1 and 65535".to_string()])
                }
            }
            ValueKind::Enum(values) => match value {
                Value::String(s) if values.iter().any(|v| v == s) => Ok(value.clone()),
                _ => Err(vec![format!("expected one of: {}", values.join(", "))]),
            },
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Integers, whole-number floats (`8080.0`), and strings holding either.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
        }
        _ => None,
    }
}

fn whole_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Issue text naming the expected kind and the JSON type received.
///
/// Only the type is named, never the value, so issues are safe to surface
/// for sensitive fields.
fn expected(kind: &str, value: &Value) -> String {
    format!("expected {}, received {}", kind, type_name(value))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
