//! Schema tree model.
//!
//! A schema is a tree of [`SchemaNode`]s. Object nodes only group children;
//! every leaf is either a [`SchemaNode::Literal`] (a fixed value baked into
//! the schema) or a [`SchemaNode::Field`] carrying a validator and its
//! resolution metadata.
//!
//! ```
//! use strata_config::schema::{FieldSpec, SchemaNode};
//!
//! let schema = SchemaNode::object([
//!     ("version", SchemaNode::literal("1")),
//!     ("db", SchemaNode::object([
//!         ("host", SchemaNode::field(FieldSpec::string().env("DB_HOST").default_value("localhost"))),
//!         ("pass", FieldSpec::string().secret_file("db_pass").sensitive().into()),
//!     ])),
//! ]);
//! assert_eq!(schema.field_paths(), vec!["db.host", "db.pass"]);
//! ```

mod document;
mod validate;

pub use document::parse_schema;
pub use validate::{FnValidator, ValueKind, Validator, validator_fn};

use crate::path::FieldPath;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A node in the schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Named children, in declaration order.
    Object(Vec<(String, SchemaNode)>),
    /// Fixed value, never resolved from any source.
    Literal(Value),
    /// Configurable leaf.
    Field(FieldSpec),
}

impl SchemaNode {
    /// Build an object node. A repeated key replaces the earlier child in place.
    pub fn object<K: Into<String>>(children: impl IntoIterator<Item = (K, SchemaNode)>) -> Self {
        let mut out: Vec<(String, SchemaNode)> = Vec::new();
        for (key, node) in children {
            let key = key.into();
            match out.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = node,
                None => out.push((key, node)),
            }
        }
        SchemaNode::Object(out)
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        SchemaNode::Literal(value.into())
    }

    pub fn field(spec: FieldSpec) -> Self {
        SchemaNode::Field(spec)
    }

    /// Node at a dotted path, or `None` if the path leaves the tree.
    pub fn get(&self, path: &str) -> Option<&SchemaNode> {
        let mut current = self;
        for segment in FieldPath::parse(path).segments() {
            let SchemaNode::Object(children) = current else {
                return None;
            };
            current = children
                .iter()
                .find(|(k, _)| k == segment)
                .map(|(_, node)| node)?;
        }
        Some(current)
    }

    /// Field spec at a dotted path.
    pub fn field_at(&self, path: &str) -> Option<&FieldSpec> {
        match self.get(path)? {
            SchemaNode::Field(spec) => Some(spec),
            _ => None,
        }
    }

    /// Dotted paths of every field leaf, in declaration order.
    pub fn field_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(&FieldPath::root(), false, &mut out);
        out
    }

    /// Dotted paths of every literal leaf, in declaration order.
    pub fn literal_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(&FieldPath::root(), true, &mut out);
        out
    }

    fn collect_paths(&self, path: &FieldPath, literals: bool, out: &mut Vec<String>) {
        match self {
            SchemaNode::Object(children) => {
                for (key, child) in children {
                    child.collect_paths(&path.child(key), literals, out);
                }
            }
            SchemaNode::Literal(_) if literals => out.push(path.dotted()),
            SchemaNode::Field(_) if !literals => out.push(path.dotted()),
            _ => {}
        }
    }
}

impl From<FieldSpec> for SchemaNode {
    fn from(spec: FieldSpec) -> Self {
        SchemaNode::Field(spec)
    }
}

/// A configurable leaf: its validator plus where to look for a value.
#[derive(Clone)]
pub struct FieldSpec {
    validator: Arc<dyn Validator>,
    /// Environment variable consulted for this field.
    pub env: Option<String>,
    /// Secret file reference, relative to the secrets base path unless absolute.
    pub secret_file: Option<String>,
    /// Redact this field's value wherever it is displayed.
    pub sensitive: bool,
    /// Fallback when no source provides a value.
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(validator: impl Validator + 'static) -> Self {
        Self::with_validator(Arc::new(validator))
    }

    pub fn with_validator(validator: Arc<dyn Validator>) -> Self {
        Self {
            validator,
            env: None,
            secret_file: None,
            sensitive: false,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ValueKind::string())
    }

    pub fn integer() -> Self {
        Self::new(ValueKind::integer())
    }

    pub fn number() -> Self {
        Self::new(ValueKind::Number)
    }

    pub fn boolean() -> Self {
        Self::new(ValueKind::Boolean)
    }

    pub fn port() -> Self {
        Self::new(ValueKind::Port)
    }

    pub fn any() -> Self {
        Self::new(ValueKind::Any)
    }

    pub fn one_of<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(ValueKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    pub fn secret_file(mut self, reference: impl Into<String>) -> Self {
        self.secret_file = Some(reference.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The default of a sensitive field is as secret as any other value.
        let default = match (&self.default, self.sensitive) {
            (Some(_), true) => Some(Value::from(crate::redact::REDACTED)),
            (default, _) => default.clone(),
        };
        f.debug_struct("FieldSpec")
            .field("validator", &self.validator.describe())
            .field("env", &self.env)
            .field("secret_file", &self.secret_file)
            .field("sensitive", &self.sensitive)
            .field("default", &default)
            .finish()
    }
}
