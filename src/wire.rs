//! Wire attribute values
//!
//! The data store's attribute-value format, as seen by custom marshallers.
//! Nothing in this crate interprets the payloads; the type only gives
//! [`Callable::Marshall`](crate::value::Callable::Marshall) and
//! [`Callable::Unmarshall`](crate::value::Callable::Unmarshall) a concrete
//! signature. Serialized in the data store's own JSON shape (`{"S": "abc"}`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single wire attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "B")]
    Binary(Vec<u8>),
    #[serde(rename = "BS")]
    BinarySet(Vec<Vec<u8>>),
    #[serde(rename = "BOOL")]
    Boolean(bool),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
    #[serde(rename = "NULL")]
    Null(bool),
    /// Numbers travel as decimal strings
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
}

impl AttributeValue {
    /// The data store's type descriptor for this value
    pub fn type_descriptor(&self) -> &'static str {
        match self {
            AttributeValue::Binary(_) => "B",
            AttributeValue::BinarySet(_) => "BS",
            AttributeValue::Boolean(_) => "BOOL",
            AttributeValue::List(_) => "L",
            AttributeValue::Map(_) => "M",
            AttributeValue::Null(_) => "NULL",
            AttributeValue::Number(_) => "N",
            AttributeValue::NumberSet(_) => "NS",
            AttributeValue::String(_) => "S",
            AttributeValue::StringSet(_) => "SS",
        }
    }

    pub fn null() -> Self {
        AttributeValue::Null(true)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) | AttributeValue::Number(s) => Some(s),
            _ => None,
        }
    }
}
