//! Schema node taxonomy
//!
//! The typed form of a schema definition: one variant per [`TypeTag`], each
//! carrying exactly the fields its kind allows. A typed tree is obtained either
//! by building it directly or by narrowing a [`SchemaValue`] through the
//! [`Validator`](crate::Validator).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::key::{IndexKeyConfiguration, KeyConfiguration, KeySummary, KeyableConfig};
use crate::tags::TypeTag;
use crate::value::{Callable, ConstructorFn, MarshallFn, SchemaValue, UnmarshallFn};
use crate::wire::AttributeValue;

/// Mapping from in-memory attribute name to the node describing it
pub type Schema = BTreeMap<String, SchemaNode>;

/// A node that carries nothing beyond the base contract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainType {
    pub persisted_name: Option<String>,
}

/// Binary or String node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyableType {
    pub persisted_name: Option<String>,
    pub keys: KeyableConfig,
}

impl KeyableType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: KeyConfiguration) -> Self {
        self.keys.key_configuration = Some(key);
        self
    }

    pub fn with_index_key(mut self, index_key: IndexKeyConfiguration) -> Self {
        self.keys.index_key_configurations.push(index_key);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberType {
    pub persisted_name: Option<String>,
    pub keys: KeyableConfig,
    /// Marks the attribute used for optimistic locking
    pub is_version_attribute: Option<bool>,
}

impl NumberType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: KeyConfiguration) -> Self {
        self.keys.key_configuration = Some(key);
        self
    }

    pub fn with_index_key(mut self, index_key: IndexKeyConfiguration) -> Self {
        self.keys.index_key_configurations.push(index_key);
        self
    }

    pub fn version_attribute(mut self) -> Self {
        self.is_version_attribute = Some(true);
        self
    }
}

/// Escape hatch: marshalling fully delegated to caller-supplied functions
///
/// The functions are expected to round-trip: for every value `v` in the
/// domain the node claims, `unmarshall(marshall(v))` should equal `v`. This is
/// not checked.
#[derive(Clone)]
pub struct CustomType {
    pub persisted_name: Option<String>,
    pub keys: KeyableConfig,
    pub marshall: MarshallFn,
    pub unmarshall: UnmarshallFn,
}

impl CustomType {
    pub fn new<M, U>(marshall: M, unmarshall: U) -> Self
    where
        M: Fn(&serde_json::Value) -> Option<AttributeValue> + Send + Sync + 'static,
        U: Fn(&AttributeValue) -> serde_json::Value + Send + Sync + 'static,
    {
        Self {
            persisted_name: None,
            keys: KeyableConfig::default(),
            marshall: Arc::new(marshall),
            unmarshall: Arc::new(unmarshall),
        }
    }

    pub fn with_key(mut self, key: KeyConfiguration) -> Self {
        self.keys.key_configuration = Some(key);
        self
    }

    pub fn with_index_key(mut self, index_key: IndexKeyConfiguration) -> Self {
        self.keys.index_key_configurations.push(index_key);
        self
    }
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType")
            .field("persisted_name", &self.persisted_name)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.persisted_name == other.persisted_name
            && self.keys == other.keys
            && Arc::ptr_eq(&self.marshall, &other.marshall)
            && Arc::ptr_eq(&self.unmarshall, &other.unmarshall)
    }
}

/// Nested record
#[derive(Clone, Default)]
pub struct DocumentType {
    pub persisted_name: Option<String>,
    pub members: Schema,
    /// Produces the empty value a document is unmarshalled into
    pub value_constructor: Option<ConstructorFn>,
}

impl DocumentType {
    pub fn new(members: Schema) -> Self {
        Self {
            persisted_name: None,
            members,
            value_constructor: None,
        }
    }

    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        self.value_constructor = Some(Arc::new(constructor));
        self
    }
}

impl fmt::Debug for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentType")
            .field("persisted_name", &self.persisted_name)
            .field("members", &self.members)
            .field("value_constructor", &self.value_constructor.as_ref().map(|_| "<constructor>"))
            .finish()
    }
}

impl PartialEq for DocumentType {
    fn eq(&self, other: &Self) -> bool {
        let constructors_eq = match (&self.value_constructor, &other.value_constructor) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.persisted_name == other.persisted_name && self.members == other.members && constructors_eq
    }
}

/// Homogeneous sequence. The member type must not carry a persisted name.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub persisted_name: Option<String>,
    pub member_type: Box<SchemaNode>,
}

/// Homogeneous string-keyed map. The member type must not carry a persisted name.
#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub persisted_name: Option<String>,
    pub member_type: Box<SchemaNode>,
}

/// Fixed-length heterogeneous sequence. Members must not carry persisted names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TupleType {
    pub persisted_name: Option<String>,
    pub members: Vec<SchemaNode>,
}

/// A schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Binary(KeyableType),
    BinarySet(PlainType),
    Boolean(PlainType),
    Collection(PlainType),
    Custom(CustomType),
    Date(PlainType),
    Document(DocumentType),
    Hash(PlainType),
    List(ListType),
    Map(MapType),
    Null(PlainType),
    Number(NumberType),
    NumberSet(PlainType),
    String(KeyableType),
    StringSet(PlainType),
    Tuple(TupleType),
}

impl SchemaNode {
    pub fn binary() -> Self {
        SchemaNode::Binary(KeyableType::new())
    }

    pub fn binary_set() -> Self {
        SchemaNode::BinarySet(PlainType::default())
    }

    pub fn boolean() -> Self {
        SchemaNode::Boolean(PlainType::default())
    }

    pub fn collection() -> Self {
        SchemaNode::Collection(PlainType::default())
    }

    pub fn date() -> Self {
        SchemaNode::Date(PlainType::default())
    }

    pub fn document(members: Schema) -> Self {
        SchemaNode::Document(DocumentType::new(members))
    }

    pub fn hash() -> Self {
        SchemaNode::Hash(PlainType::default())
    }

    pub fn list(member_type: SchemaNode) -> Self {
        SchemaNode::List(ListType {
            persisted_name: None,
            member_type: Box::new(member_type),
        })
    }

    pub fn map(member_type: SchemaNode) -> Self {
        SchemaNode::Map(MapType {
            persisted_name: None,
            member_type: Box::new(member_type),
        })
    }

    pub fn null() -> Self {
        SchemaNode::Null(PlainType::default())
    }

    pub fn number() -> Self {
        SchemaNode::Number(NumberType::new())
    }

    pub fn number_set() -> Self {
        SchemaNode::NumberSet(PlainType::default())
    }

    pub fn string() -> Self {
        SchemaNode::String(KeyableType::new())
    }

    pub fn string_set() -> Self {
        SchemaNode::StringSet(PlainType::default())
    }

    pub fn tuple(members: Vec<SchemaNode>) -> Self {
        SchemaNode::Tuple(TupleType {
            persisted_name: None,
            members,
        })
    }

    pub fn kind(&self) -> TypeTag {
        match self {
            SchemaNode::Binary(_) => TypeTag::Binary,
            SchemaNode::BinarySet(_) => TypeTag::BinarySet,
            SchemaNode::Boolean(_) => TypeTag::Boolean,
            SchemaNode::Collection(_) => TypeTag::Collection,
            SchemaNode::Custom(_) => TypeTag::Custom,
            SchemaNode::Date(_) => TypeTag::Date,
            SchemaNode::Document(_) => TypeTag::Document,
            SchemaNode::Hash(_) => TypeTag::Hash,
            SchemaNode::List(_) => TypeTag::List,
            SchemaNode::Map(_) => TypeTag::Map,
            SchemaNode::Null(_) => TypeTag::Null,
            SchemaNode::Number(_) => TypeTag::Number,
            SchemaNode::NumberSet(_) => TypeTag::NumberSet,
            SchemaNode::String(_) => TypeTag::String,
            SchemaNode::StringSet(_) => TypeTag::StringSet,
            SchemaNode::Tuple(_) => TypeTag::Tuple,
        }
    }

    /// Attribute name in the wire record, when it differs from the in-memory name
    pub fn persisted_name(&self) -> Option<&str> {
        self.persisted_name_slot().as_deref()
    }

    /// Name under which a member called `name` is stored
    pub fn attribute_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.persisted_name().unwrap_or(name)
    }

    pub fn with_persisted_name(mut self, name: impl Into<String>) -> Self {
        *self.persisted_name_slot_mut() = Some(name.into());
        self
    }

    /// Key participation, for the kinds that may be keys
    pub fn keys(&self) -> Option<&KeyableConfig> {
        match self {
            SchemaNode::Binary(t) | SchemaNode::String(t) => Some(&t.keys),
            SchemaNode::Number(t) => Some(&t.keys),
            SchemaNode::Custom(t) => Some(&t.keys),
            _ => None,
        }
    }

    /// Whether this node is the version attribute
    pub fn is_version_attribute(&self) -> bool {
        matches!(self, SchemaNode::Number(t) if t.is_version_attribute == Some(true))
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + match self {
            SchemaNode::Document(t) => t.members.values().map(SchemaNode::node_count).sum(),
            SchemaNode::List(t) => t.member_type.node_count(),
            SchemaNode::Map(t) => t.member_type.node_count(),
            SchemaNode::Tuple(t) => t.members.iter().map(SchemaNode::node_count).sum(),
            _ => 0,
        }
    }

    /// Lower this node to its untyped form
    pub fn to_value(&self) -> SchemaValue {
        let mut fields = BTreeMap::new();
        fields.insert("kind".to_string(), SchemaValue::from(self.kind().as_str()));
        if let Some(name) = self.persisted_name() {
            fields.insert("persistedName".to_string(), SchemaValue::from(name));
        }
        if let Some(keys) = self.keys() {
            keys.write_into(&mut fields);
        }

        match self {
            SchemaNode::Custom(t) => {
                fields.insert(
                    "marshall".to_string(),
                    SchemaValue::Function(Callable::Marshall(t.marshall.clone())),
                );
                fields.insert(
                    "unmarshall".to_string(),
                    SchemaValue::Function(Callable::Unmarshall(t.unmarshall.clone())),
                );
            }
            SchemaNode::Document(t) => {
                fields.insert("members".to_string(), schema_to_value(&t.members));
                if let Some(constructor) = &t.value_constructor {
                    fields.insert(
                        "valueConstructor".to_string(),
                        SchemaValue::Function(Callable::Constructor(constructor.clone())),
                    );
                }
            }
            SchemaNode::List(ListType { member_type, .. })
            | SchemaNode::Map(MapType { member_type, .. }) => {
                fields.insert("memberType".to_string(), member_type.to_value());
            }
            SchemaNode::Number(t) => {
                if let Some(flag) = t.is_version_attribute {
                    fields.insert("isVersionAttribute".to_string(), SchemaValue::Bool(flag));
                }
            }
            SchemaNode::Tuple(t) => {
                let members = t.members.iter().map(SchemaNode::to_value).collect();
                fields.insert("members".to_string(), SchemaValue::List(members));
            }
            SchemaNode::Binary(_)
            | SchemaNode::BinarySet(_)
            | SchemaNode::Boolean(_)
            | SchemaNode::Collection(_)
            | SchemaNode::Date(_)
            | SchemaNode::Hash(_)
            | SchemaNode::Null(_)
            | SchemaNode::NumberSet(_)
            | SchemaNode::String(_)
            | SchemaNode::StringSet(_) => {}
        }

        SchemaValue::Object(fields)
    }

    fn persisted_name_slot(&self) -> &Option<String> {
        match self {
            SchemaNode::Binary(t) | SchemaNode::String(t) => &t.persisted_name,
            SchemaNode::BinarySet(t)
            | SchemaNode::Boolean(t)
            | SchemaNode::Collection(t)
            | SchemaNode::Date(t)
            | SchemaNode::Hash(t)
            | SchemaNode::Null(t)
            | SchemaNode::NumberSet(t)
            | SchemaNode::StringSet(t) => &t.persisted_name,
            SchemaNode::Custom(t) => &t.persisted_name,
            SchemaNode::Document(t) => &t.persisted_name,
            SchemaNode::List(t) => &t.persisted_name,
            SchemaNode::Map(t) => &t.persisted_name,
            SchemaNode::Number(t) => &t.persisted_name,
            SchemaNode::Tuple(t) => &t.persisted_name,
        }
    }

    fn persisted_name_slot_mut(&mut self) -> &mut Option<String> {
        match self {
            SchemaNode::Binary(t) | SchemaNode::String(t) => &mut t.persisted_name,
            SchemaNode::BinarySet(t)
            | SchemaNode::Boolean(t)
            | SchemaNode::Collection(t)
            | SchemaNode::Date(t)
            | SchemaNode::Hash(t)
            | SchemaNode::Null(t)
            | SchemaNode::NumberSet(t)
            | SchemaNode::StringSet(t) => &mut t.persisted_name,
            SchemaNode::Custom(t) => &mut t.persisted_name,
            SchemaNode::Document(t) => &mut t.persisted_name,
            SchemaNode::List(t) => &mut t.persisted_name,
            SchemaNode::Map(t) => &mut t.persisted_name,
            SchemaNode::Number(t) => &mut t.persisted_name,
            SchemaNode::Tuple(t) => &mut t.persisted_name,
        }
    }
}

impl From<NumberType> for SchemaNode {
    fn from(t: NumberType) -> Self {
        SchemaNode::Number(t)
    }
}

impl From<CustomType> for SchemaNode {
    fn from(t: CustomType) -> Self {
        SchemaNode::Custom(t)
    }
}

impl From<DocumentType> for SchemaNode {
    fn from(t: DocumentType) -> Self {
        SchemaNode::Document(t)
    }
}

/// Lower a member schema to an untyped object
pub fn schema_to_value(schema: &Schema) -> SchemaValue {
    SchemaValue::Object(
        schema
            .iter()
            .map(|(name, node)| (name.clone(), node.to_value()))
            .collect(),
    )
}

/// Collect the key layout declared by a record schema's top-level members
///
/// Attribute names are reported as persisted names.
pub fn key_summary(schema: &Schema) -> KeySummary {
    let mut summary = KeySummary::default();

    for (name, node) in schema {
        let Some(keys) = node.keys() else { continue };
        let attribute = node.attribute_name(name);

        if let Some(role) = keys.table_role() {
            summary.table_keys.insert(attribute.to_string(), role);
        }
        for index_key in &keys.index_key_configurations {
            summary
                .index_keys
                .entry(index_key.index_name.clone())
                .or_default()
                .insert(attribute.to_string(), index_key.role);
        }
        if keys.is_key() {
            if let Some(descriptor) = scalar_descriptor(node.kind()) {
                summary.attributes.insert(attribute.to_string(), descriptor.to_string());
            }
        }
    }

    summary
}

/// Persisted name of the version attribute, if the schema declares one
pub fn version_attribute(schema: &Schema) -> Option<&str> {
    schema
        .iter()
        .find(|(_, node)| node.is_version_attribute())
        .map(|(name, node)| node.attribute_name(name))
}

fn scalar_descriptor(kind: TypeTag) -> Option<&'static str> {
    match kind {
        TypeTag::Binary => Some("B"),
        TypeTag::Number => Some("N"),
        TypeTag::String => Some("S"),
        _ => None,
    }
}
