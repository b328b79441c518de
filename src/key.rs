//! Key configuration model
//!
//! Marks a keyable node (Binary, Custom, Number, String) as a component of the
//! table's primary key and/or of named secondary indexes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tags::KeyType;
use crate::value::SchemaValue;

/// Role of a node as a table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyConfiguration {
    pub role: KeyType,
}

impl KeyConfiguration {
    pub fn new(role: KeyType) -> Self {
        Self { role }
    }

    pub fn hash() -> Self {
        Self::new(KeyType::Hash)
    }

    pub fn range() -> Self {
        Self::new(KeyType::Range)
    }

    pub fn to_value(&self) -> SchemaValue {
        SchemaValue::object([("role", SchemaValue::from(self.role.as_str()))])
    }
}

/// Role of a node within a named secondary index
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexKeyConfiguration {
    pub role: KeyType,
    pub index_name: String,
}

impl IndexKeyConfiguration {
    pub fn new(index_name: impl Into<String>, role: KeyType) -> Self {
        Self {
            role,
            index_name: index_name.into(),
        }
    }

    pub fn to_value(&self) -> SchemaValue {
        SchemaValue::object([
            ("role", SchemaValue::from(self.role.as_str())),
            ("indexName", SchemaValue::from(self.index_name.as_str())),
        ])
    }
}

/// Key participation of a keyable node
///
/// Both parts are optional; a default value describes a node that is not a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_configuration: Option<KeyConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub index_key_configurations: Vec<IndexKeyConfiguration>,
}

impl KeyableConfig {
    /// Whether the node is part of the table key or of any index
    pub fn is_key(&self) -> bool {
        self.key_configuration.is_some() || !self.index_key_configurations.is_empty()
    }

    /// Role within the table's primary key, if any
    pub fn table_role(&self) -> Option<KeyType> {
        self.key_configuration.map(|k| k.role)
    }

    /// Role within the given index, if the node participates in it
    pub fn index_role(&self, index_name: &str) -> Option<KeyType> {
        self.index_key_configurations
            .iter()
            .find(|c| c.index_name == index_name)
            .map(|c| c.role)
    }

    /// Roles per index name
    pub fn index_roles(&self) -> BTreeMap<&str, KeyType> {
        self.index_key_configurations
            .iter()
            .map(|c| (c.index_name.as_str(), c.role))
            .collect()
    }

    /// Write the configured fields onto a node object
    pub(crate) fn write_into(&self, fields: &mut BTreeMap<String, SchemaValue>) {
        if let Some(key) = &self.key_configuration {
            fields.insert("keyConfiguration".to_string(), key.to_value());
        }
        if !self.index_key_configurations.is_empty() {
            let entries = self
                .index_key_configurations
                .iter()
                .map(IndexKeyConfiguration::to_value)
                .collect();
            fields.insert("indexKeyConfigurations".to_string(), SchemaValue::List(entries));
        }
    }
}

/// Key layout of a record schema, keyed by persisted attribute name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySummary {
    /// Scalar type descriptor (`S`, `N`, `B`) of every key attribute with a scalar kind
    pub attributes: BTreeMap<String, String>,
    pub table_keys: BTreeMap<String, KeyType>,
    /// Index name -> attribute -> role
    pub index_keys: BTreeMap<String, BTreeMap<String, KeyType>>,
}
