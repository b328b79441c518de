//! Dynamic schema values
//!
//! A candidate schema definition arrives as an untyped tree: loaded from JSON,
//! assembled by hand, or lowered from a typed [`SchemaNode`](crate::SchemaNode).
//! [`SchemaValue`] is that tree. Unlike `serde_json::Value` it can hold
//! functions, which Custom and Document nodes need for their marshallers and
//! value constructors.
//!
//! Values own their children outright, so a cyclic tree cannot be built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::wire::AttributeValue;

/// Converts an in-memory value to its wire form. Never called with an absent
/// input; returning `None` omits the attribute.
pub type MarshallFn = Arc<dyn Fn(&serde_json::Value) -> Option<AttributeValue> + Send + Sync>;

/// Converts a wire value back to its in-memory form
pub type UnmarshallFn = Arc<dyn Fn(&AttributeValue) -> serde_json::Value + Send + Sync>;

/// Zero-argument factory for the value a Document unmarshals into
pub type ConstructorFn = Arc<dyn Fn() -> serde_json::Value + Send + Sync>;

/// An invocable value
#[derive(Clone)]
pub enum Callable {
    Marshall(MarshallFn),
    Unmarshall(UnmarshallFn),
    Constructor(ConstructorFn),
}

impl Callable {
    pub fn marshall<F>(f: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Option<AttributeValue> + Send + Sync + 'static,
    {
        Callable::Marshall(Arc::new(f))
    }

    pub fn unmarshall<F>(f: F) -> Self
    where
        F: Fn(&AttributeValue) -> serde_json::Value + Send + Sync + 'static,
    {
        Callable::Unmarshall(Arc::new(f))
    }

    pub fn constructor<F>(f: F) -> Self
    where
        F: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        Callable::Constructor(Arc::new(f))
    }

    /// Name of the call signature, used in violation messages
    pub fn shape(&self) -> &'static str {
        match self {
            Callable::Marshall(_) => "marshall function",
            Callable::Unmarshall(_) => "unmarshall function",
            Callable::Constructor(_) => "constructor",
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.shape())
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Marshall(a), Callable::Marshall(b)) => Arc::ptr_eq(a, b),
            (Callable::Unmarshall(a), Callable::Unmarshall(b)) => Arc::ptr_eq(a, b),
            (Callable::Constructor(a), Callable::Constructor(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An untyped candidate schema value
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<SchemaValue>),
    Object(BTreeMap<String, SchemaValue>),
    Function(Callable),
}

impl SchemaValue {
    /// Parse a JSON schema document. Function fields stay strings; use
    /// [`Bindings`](crate::Bindings) to substitute named functions.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(json)?;
        Ok(SchemaValue::from(json))
    }

    /// Build an object from key/value pairs
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaValue)>,
    {
        SchemaValue::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Field lookup; `None` for missing fields and for non-objects
    pub fn get(&self, key: &str) -> Option<&SchemaValue> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, SchemaValue>> {
        match self {
            SchemaValue::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SchemaValue]> {
        match self {
            SchemaValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SchemaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short description of the value's type, used in violation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaValue::Null => "null",
            SchemaValue::Bool(_) => "boolean",
            SchemaValue::Number(_) => "number",
            SchemaValue::String(_) => "string",
            SchemaValue::List(_) => "list",
            SchemaValue::Object(_) => "object",
            SchemaValue::Function(c) => c.shape(),
        }
    }
}

impl From<serde_json::Value> for SchemaValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SchemaValue::Null,
            serde_json::Value::Bool(b) => SchemaValue::Bool(b),
            serde_json::Value::Number(n) => SchemaValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => SchemaValue::String(s),
            serde_json::Value::Array(items) => {
                SchemaValue::List(items.into_iter().map(SchemaValue::from).collect())
            }
            serde_json::Value::Object(fields) => SchemaValue::Object(
                fields.into_iter().map(|(k, v)| (k, SchemaValue::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for SchemaValue {
    fn from(s: &str) -> Self {
        SchemaValue::String(s.to_string())
    }
}

impl From<String> for SchemaValue {
    fn from(s: String) -> Self {
        SchemaValue::String(s)
    }
}

impl From<bool> for SchemaValue {
    fn from(b: bool) -> Self {
        SchemaValue::Bool(b)
    }
}

impl From<f64> for SchemaValue {
    fn from(n: f64) -> Self {
        SchemaValue::Number(n)
    }
}

impl From<Callable> for SchemaValue {
    fn from(c: Callable) -> Self {
        SchemaValue::Function(c)
    }
}

impl From<Vec<SchemaValue>> for SchemaValue {
    fn from(items: Vec<SchemaValue>) -> Self {
        SchemaValue::List(items)
    }
}
