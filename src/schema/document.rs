//! Schema documents: schemas written as JSON or YAML.
//!
//! ```yaml
//! version: 2                 # bare scalar: literal
//! region: { const: eu-1 }    # explicit literal
//! db:
//!   host: { type: string, env: DB_HOST, default: localhost }
//!   port: { type: port, default: 5432 }
//!   pass: { type: string, secretFile: db_pass, sensitive: true }
//! ```
//!
//! An object whose `type` is a string is a field; an object with a `const`
//! key is a literal; any other object groups children.

use super::{FieldSpec, SchemaNode, ValueKind};
use crate::error::{LoadError, LoadResult};
use crate::path::FieldPath;
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FieldDoc {
    #[serde(rename = "type")]
    kind: String,
    env: Option<String>,
    secret_file: Option<String>,
    #[serde(default)]
    sensitive: bool,
    default: Option<Value>,
    pattern: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
    values: Option<Vec<String>>,
}

/// Build a schema tree from a parsed document. The root must be an object.
pub fn parse_schema(doc: &Value) -> LoadResult<SchemaNode> {
    match doc {
        Value::Object(map) if !is_field(map) && !map.contains_key("const") => {
            parse_node(doc, &FieldPath::root())
        }
        _ => Err(LoadError::schema("", "schema root must be an object of fields")),
    }
}

fn is_field(map: &Map<String, Value>) -> bool {
    matches!(map.get("type"), Some(Value::String(_)))
}

fn parse_node(doc: &Value, path: &FieldPath) -> LoadResult<SchemaNode> {
    let Value::Object(map) = doc else {
        return Ok(SchemaNode::Literal(doc.clone()));
    };

    if is_field(map) {
        return parse_field(map, path).map(SchemaNode::Field);
    }

    if let Some(value) = map.get("const") {
        if map.len() > 1 {
            return Err(LoadError::schema(
                &path.dotted(),
                "a `const` literal cannot carry other keys",
            ));
        }
        return Ok(SchemaNode::Literal(value.clone()));
    }

    let children = map
        .iter()
        .map(|(key, child)| Ok((key.clone(), parse_node(child, &path.child(key))?)))
        .collect::<LoadResult<Vec<_>>>()?;
    Ok(SchemaNode::Object(children))
}

fn parse_field(map: &Map<String, Value>, path: &FieldPath) -> LoadResult<FieldSpec> {
    let dotted = path.dotted();
    let doc: FieldDoc = serde_json::from_value(Value::Object(map.clone()))
        .map_err(|e| LoadError::schema(&dotted, e.to_string()))?;

    let kind = match doc.kind.as_str() {
        "string" => {
            let pattern = doc
                .pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| LoadError::schema(&dotted, format!("invalid pattern: {}", e)))?;
            ValueKind::String { pattern }
        }
        "integer" | "int" => ValueKind::Integer {
            min: doc.min,
            max: doc.max,
        },
        "number" | "float" => ValueKind::Number,
        "boolean" | "bool" => ValueKind::Boolean,
        "port" => ValueKind::Port,
        "any" => ValueKind::Any,
        "enum" => match doc.values {
            Some(values) if !values.is_empty() => ValueKind::Enum(values),
            _ => return Err(LoadError::schema(&dotted, "enum fields need a non-empty `values` list")),
        },
        other => {
            return Err(LoadError::schema(
                &dotted,
                format!("unknown field type `{}`", other),
            ));
        }
    };

    let mut spec = FieldSpec::new(kind);
    spec.env = doc.env;
    spec.secret_file = doc.secret_file;
    spec.sensitive = doc.sensitive;
    spec.default = doc.default;
    Ok(spec)
}
