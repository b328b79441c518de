//! DynamoDB Schema Definitions
//!
//! A declarative schema language describing how in-memory values map onto
//! DynamoDB attribute values, and the structural validator that checks a
//! schema definition before it is handed to a marshaller.
//!
//! ## Features
//!
//! - **Closed Taxonomy**: One [`SchemaNode`] variant per [`TypeTag`]
//! - **Key Configuration**: Table and secondary-index key roles on keyable nodes
//! - **Recursive Validation**: Boolean check plus a path-addressed violation report
//! - **Type Narrowing**: A valid [`SchemaValue`] converts into a typed [`SchemaNode`]
//! - **Custom Nodes**: Caller-supplied marshall/unmarshall functions, bound by name for JSON documents
//!
//! ## Example
//!
//! ```
//! use dynamo_schema::{is_valid_schema_node, SchemaNode, SchemaValue};
//! use serde_json::json;
//!
//! let candidate = SchemaValue::from(json!({
//!     "kind": "Document",
//!     "members": {
//!         "id": {"kind": "String", "keyConfiguration": {"role": "PRIMARY_HASH"}},
//!         "scores": {"kind": "List", "memberType": {"kind": "Number"}}
//!     }
//! }));
//! assert!(is_valid_schema_node(&candidate));
//!
//! let node = SchemaNode::try_from(&candidate).unwrap();
//! assert_eq!(node.node_count(), 4);
//! ```

pub mod bindings;
pub mod config;
pub mod error;
pub mod key;
pub mod schema;
pub mod tags;
pub mod validate;
pub mod value;
pub mod wire;

pub use bindings::Bindings;
pub use config::{OutputFormat, ValidatorConfig};
pub use error::{Result, SchemaError};
pub use key::{IndexKeyConfiguration, KeyConfiguration, KeySummary, KeyableConfig};
pub use schema::{
    key_summary, schema_to_value, version_attribute, CustomType, DocumentType, KeyableType,
    ListType, MapType, NumberType, PlainType, Schema, SchemaNode, TupleType,
};
pub use tags::{KeyType, TypeTag};
pub use validate::{
    is_valid_schema, is_valid_schema_node, ValidationOptions, ValidationReport, Validator,
    Violation, ViolationCode,
};
pub use value::{Callable, SchemaValue};
pub use wire::AttributeValue;
