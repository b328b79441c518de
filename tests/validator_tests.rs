//! Validator Tests
//!
//! End-to-end checks of the validator against JSON fixtures and typed trees.

use std::sync::Arc;
use std::thread;

use dynamo_schema::{
    is_valid_schema, is_valid_schema_node, key_summary, version_attribute, AttributeValue,
    Bindings, CustomType, DocumentType, IndexKeyConfiguration, KeyConfiguration, KeyType,
    KeyableType, NumberType, Schema, SchemaError, SchemaNode, SchemaValue, TypeTag,
    ValidationOptions, Validator, ViolationCode,
};
use serde_json::json;

fn fixture(content: &str) -> SchemaValue {
    SchemaValue::from_json_str(content).unwrap()
}

// =============================================================================
// Fixture Tests
// =============================================================================

#[test]
fn test_user_record_fixture() {
    let value = fixture(include_str!("fixtures/user_record.json"));
    assert!(is_valid_schema(&value));

    let schema = Validator::default().narrow_schema(&value).unwrap();
    assert_eq!(schema.len(), 10);

    let summary = key_summary(&schema);
    assert_eq!(summary.table_keys.get("user_id"), Some(&KeyType::Hash));
    assert_eq!(summary.table_keys.get("createdAt"), Some(&KeyType::Range));
    assert_eq!(summary.index_keys["byEmail"].len(), 2);
    assert_eq!(summary.attributes.get("user_id").map(String::as_str), Some("S"));
    assert_eq!(version_attribute(&schema), Some("version"));
}

#[test]
fn test_order_document_fixture() {
    let value = fixture(include_str!("fixtures/order_document.json"));
    assert!(is_valid_schema_node(&value));

    let node = SchemaNode::try_from(&value).unwrap();
    let SchemaNode::Document(order) = &node else {
        panic!("Expected Document, got {:?}", node.kind());
    };
    assert_eq!(order.members["shipping"].persisted_name(), Some("shipping_address"));
    match &order.members["lines"] {
        SchemaNode::List(list) => assert_eq!(list.member_type.kind(), TypeTag::Document),
        other => panic!("Expected List, got {:?}", other.kind()),
    }
}

#[test]
fn test_invalid_nested_fixture_reports_every_path() {
    let value = fixture(include_str!("fixtures/invalid_nested.json"));
    assert!(!is_valid_schema_node(&value));

    let report = Validator::default().validate(&value);
    let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "$.members.geo.members[1]",
            "$.members.label.persistedName",
            "$.members.lines.memberType.members.quantity.isVersionAttribute",
            "$.members.lines.memberType.members.sku.kind",
            "$.members.orderId.keyConfiguration.role",
        ]
    );
    assert_eq!(
        report.at("$.members.orderId.keyConfiguration.role").map(|v| v.code),
        Some(ViolationCode::InvalidKeyConfiguration)
    );
}

#[test]
fn test_malformed_json_is_a_json_error() {
    let err = SchemaValue::from_json_str("{\"kind\": \"String\"").unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));
    assert!(err.report().is_none());
}

#[test]
fn test_narrowing_failure_carries_report() {
    let value = fixture(include_str!("fixtures/invalid_nested.json"));
    let err = SchemaNode::try_from(&value).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidSchema(_)));
    assert_eq!(err.report().map(|r| r.violations.len()), Some(5));
}

// =============================================================================
// Typed Trees
// =============================================================================

fn typed_record() -> Schema {
    let iso = CustomType::new(
        |v| v.as_str().map(|s| AttributeValue::String(s.to_string())),
        |a| json!(a.as_str()),
    )
    .with_index_key(IndexKeyConfiguration::new("byDay", KeyType::Hash));

    Schema::from([
        (
            "id".to_string(),
            SchemaNode::Binary(KeyableType::new().with_key(KeyConfiguration::hash())),
        ),
        ("day".to_string(), SchemaNode::from(iso).with_persisted_name("day_iso")),
        (
            "revision".to_string(),
            NumberType::new().version_attribute().into(),
        ),
        (
            "payload".to_string(),
            DocumentType::new(Schema::from([
                ("tags".to_string(), SchemaNode::map(SchemaNode::string_set())),
                (
                    "point".to_string(),
                    SchemaNode::tuple(vec![SchemaNode::number(), SchemaNode::number()]),
                ),
            ]))
            .with_constructor(|| json!({}))
            .into(),
        ),
    ])
}

#[test]
fn test_lowered_typed_tree_validates() {
    let record = typed_record();
    let node = SchemaNode::document(record.clone());
    let value = node.to_value();

    let strict = Validator::new(ValidationOptions::strict());
    assert!(strict.is_valid(&value));

    let narrowed = strict.narrow(&value).unwrap();
    assert_eq!(narrowed, node);
    assert_eq!(narrowed.node_count(), node.node_count());
}

#[test]
fn test_custom_round_trip_contract() {
    let record = typed_record();
    let SchemaNode::Custom(custom) = &record["day"] else {
        panic!("Expected Custom");
    };
    let original = json!("2024-03-01");
    let wire = (custom.marshall)(&original).unwrap();
    assert_eq!((custom.unmarshall)(&wire), original);

    let summary = key_summary(&record);
    assert_eq!(summary.index_keys["byDay"].get("day_iso"), Some(&KeyType::Hash));
    // Custom keys have no scalar descriptor
    assert!(!summary.attributes.contains_key("day_iso"));
}

#[test]
fn test_bindings_make_custom_json_valid() {
    let document = json!({
        "kind": "Custom",
        "marshall": "iso",
        "unmarshall": "iso",
        "keyConfiguration": {"role": "PRIMARY_RANGE"}
    });
    assert!(!is_valid_schema_node(&SchemaValue::from(document.clone())));

    let bindings = Bindings::new().with_marshaller(
        "iso",
        |v| v.as_str().map(|s| AttributeValue::String(s.to_string())),
        |a| json!(a.as_str()),
    );
    let node = SchemaNode::try_from(&bindings.resolve(document)).unwrap();
    assert_eq!(node.kind(), TypeTag::Custom);
    assert_eq!(node.keys().and_then(|k| k.table_role()), Some(KeyType::Range));
}

// =============================================================================
// Purity
// =============================================================================

#[test]
fn test_concurrent_validation_agrees() {
    let value = Arc::new(fixture(include_str!("fixtures/order_document.json")));
    let validator = Arc::new(Validator::default());
    let expected = validator.validate(&value);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let value = Arc::clone(&value);
            let validator = Arc::clone(&validator);
            thread::spawn(move || validator.validate(&value))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_unregistered_kinds_never_validate() {
    for kind in ["Any", "Set", "Integer", "document", "NUMBER", "Strings", "Tuple "] {
        assert!(!is_valid_schema_node(&SchemaValue::from(json!({"kind": kind}))), "{kind:?}");
    }
    for kind in TypeTag::ALL {
        assert!(TypeTag::is_registered(kind.as_str()));
    }
}
