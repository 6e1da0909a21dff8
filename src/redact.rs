//! Redacted and source-annotated views of a resolved value tree.

use crate::path::FieldPath;
use crate::schema::SchemaNode;
use crate::source::{SourceMap, SourceTag};
use serde_json::{Map, Value, json};

/// Marker shown in place of a sensitive value.
pub const REDACTED: &str = "[REDACTED]";

/// Copy of `value` shaped by `schema`, with every sensitive field replaced by
/// [`REDACTED`]. Keys with no schema node are dropped.
pub fn redact(schema: &SchemaNode, value: &Value) -> Value {
    match schema {
        SchemaNode::Object(children) => {
            let mut out = Map::new();
            for (key, child) in children {
                if let Some(child_value) = value.get(key) {
                    out.insert(key.clone(), redact(child, child_value));
                }
            }
            Value::Object(out)
        }
        SchemaNode::Literal(_) => value.clone(),
        SchemaNode::Field(spec) if spec.sensitive => Value::from(REDACTED),
        SchemaNode::Field(_) => value.clone(),
    }
}

/// Like [`redact`], but each leaf becomes `{ "value": .., "source": .. }`.
///
/// Literal leaves are tagged `literal`; field leaves carry the source that
/// won them, or `null` when `sources` has no entry for the path.
pub fn debug_tree(schema: &SchemaNode, value: &Value, sources: &SourceMap) -> Value {
    debug_node(schema, value, sources, &FieldPath::root())
}

fn debug_node(schema: &SchemaNode, value: &Value, sources: &SourceMap, path: &FieldPath) -> Value {
    match schema {
        SchemaNode::Object(children) => {
            let mut out = Map::new();
            for (key, child) in children {
                if let Some(child_value) = value.get(key) {
                    let entry = debug_node(child, child_value, sources, &path.child(key));
                    out.insert(key.clone(), entry);
                }
            }
            Value::Object(out)
        }
        SchemaNode::Literal(_) => json!({
            "value": value,
            "source": SourceTag::Literal,
        }),
        SchemaNode::Field(spec) => {
            let shown = if spec.sensitive {
                Value::from(REDACTED)
            } else {
                value.clone()
            };
            json!({
                "value": shown,
                "source": sources.get(&path.dotted()),
            })
        }
    }
}
