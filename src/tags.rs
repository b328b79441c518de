//! Tag registry
//!
//! The closed set of schema node kinds and key roles. Both are plain enums so
//! that every match over them is checked for exhaustiveness, and membership
//! tests are a single `match` on the incoming string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    /// Raw bytes, keyable
    Binary,
    /// Set of byte strings
    BinarySet,
    Boolean,
    /// Untyped sequence, element types detected by the marshaller
    Collection,
    /// Marshalling delegated to caller-supplied functions
    Custom,
    /// Epoch seconds, no timezone
    Date,
    /// Nested record with its own member schema
    Document,
    /// Untyped string-keyed map
    Hash,
    /// Homogeneous sequence
    List,
    /// Homogeneous string-keyed map
    Map,
    Null,
    /// Numeric value, keyable, may be the version attribute
    Number,
    NumberSet,
    /// UTF-8 string, keyable
    String,
    StringSet,
    /// Fixed-length heterogeneous sequence
    Tuple,
}

impl TypeTag {
    /// Every registered kind, in declaration order
    pub const ALL: [TypeTag; 16] = [
        TypeTag::Binary,
        TypeTag::BinarySet,
        TypeTag::Boolean,
        TypeTag::Collection,
        TypeTag::Custom,
        TypeTag::Date,
        TypeTag::Document,
        TypeTag::Hash,
        TypeTag::List,
        TypeTag::Map,
        TypeTag::Null,
        TypeTag::Number,
        TypeTag::NumberSet,
        TypeTag::String,
        TypeTag::StringSet,
        TypeTag::Tuple,
    ];

    /// The tag as it appears in a schema definition
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Binary => "Binary",
            TypeTag::BinarySet => "BinarySet",
            TypeTag::Boolean => "Boolean",
            TypeTag::Collection => "Collection",
            TypeTag::Custom => "Custom",
            TypeTag::Date => "Date",
            TypeTag::Document => "Document",
            TypeTag::Hash => "Hash",
            TypeTag::List => "List",
            TypeTag::Map => "Map",
            TypeTag::Null => "Null",
            TypeTag::Number => "Number",
            TypeTag::NumberSet => "NumberSet",
            TypeTag::String => "String",
            TypeTag::StringSet => "StringSet",
            TypeTag::Tuple => "Tuple",
        }
    }

    /// Look up a tag by its exact, case-sensitive name
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = match tag {
            "Binary" => TypeTag::Binary,
            "BinarySet" => TypeTag::BinarySet,
            "Boolean" => TypeTag::Boolean,
            "Collection" => TypeTag::Collection,
            "Custom" => TypeTag::Custom,
            "Date" => TypeTag::Date,
            "Document" => TypeTag::Document,
            "Hash" => TypeTag::Hash,
            "List" => TypeTag::List,
            "Map" => TypeTag::Map,
            "Null" => TypeTag::Null,
            "Number" => TypeTag::Number,
            "NumberSet" => TypeTag::NumberSet,
            "String" => TypeTag::String,
            "StringSet" => TypeTag::StringSet,
            "Tuple" => TypeTag::Tuple,
            _ => return None,
        };
        Some(tag)
    }

    /// Whether `tag` names a registered kind
    pub fn is_registered(tag: &str) -> bool {
        Self::from_tag(tag).is_some()
    }

    /// Whether nodes of this kind may carry key configuration
    pub fn is_keyable(&self) -> bool {
        matches!(
            self,
            TypeTag::Binary | TypeTag::Custom | TypeTag::Number | TypeTag::String
        )
    }

    /// Whether nodes of this kind own child nodes
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TypeTag::Document | TypeTag::List | TypeTag::Map | TypeTag::Tuple
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| SchemaError::UnknownTypeTag(s.to_string()))
    }
}

/// Role of a key attribute
///
/// Serialized as `PRIMARY_HASH` / `PRIMARY_RANGE`. The short forms `HASH` and
/// `RANGE` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "PRIMARY_HASH", alias = "HASH")]
    Hash,
    #[serde(rename = "PRIMARY_RANGE", alias = "RANGE")]
    Range,
}

impl KeyType {
    pub const ALL: [KeyType; 2] = [KeyType::Hash, KeyType::Range];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Hash => "PRIMARY_HASH",
            KeyType::Range => "PRIMARY_RANGE",
        }
    }

    /// Short name used by the data store's key schema
    pub fn short_name(&self) -> &'static str {
        match self {
            KeyType::Hash => "HASH",
            KeyType::Range => "RANGE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PRIMARY_HASH" | "HASH" => Some(KeyType::Hash),
            "PRIMARY_RANGE" | "RANGE" => Some(KeyType::Range),
            _ => None,
        }
    }

    pub fn is_registered(tag: &str) -> bool {
        Self::from_tag(tag).is_some()
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| SchemaError::UnknownKeyType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_round_trips_through_its_name() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_tag(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_unregistered_tags_rejected() {
        for bogus in ["", "string", "STRING", "Strings", "Bogus", "NotAKind", " List", "Set"] {
            assert!(!TypeTag::is_registered(bogus), "{bogus:?} should be rejected");
        }
    }

    #[test]
    fn test_tag_parse_error() {
        let err = "Bogus".parse::<TypeTag>().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownTypeTag(ref t) if t == "Bogus"));
    }

    #[test]
    fn test_key_type_aliases() {
        assert_eq!(KeyType::from_tag("PRIMARY_HASH"), Some(KeyType::Hash));
        assert_eq!(KeyType::from_tag("HASH"), Some(KeyType::Hash));
        assert_eq!(KeyType::from_tag("RANGE"), Some(KeyType::Range));
        assert_eq!(KeyType::from_tag("range"), None);
        assert_eq!(KeyType::from_tag("BOGUS"), None);
    }

    #[test]
    fn test_key_type_serde() {
        let json = serde_json::to_string(&KeyType::Range).unwrap();
        assert_eq!(json, "\"PRIMARY_RANGE\"");
        let parsed: KeyType = serde_json::from_str("\"HASH\"").unwrap();
        assert_eq!(parsed, KeyType::Hash);
    }

    #[test]
    fn test_keyable_kinds() {
        let keyable: Vec<_> = TypeTag::ALL.iter().filter(|t| t.is_keyable()).collect();
        assert_eq!(keyable.len(), 4);
    }
}
