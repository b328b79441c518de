//! Recursive schema validation
//!
//! Walks an untyped [`SchemaValue`] and decides whether it is a well-formed
//! schema node. Every node must first pass the base contract (an object whose
//! `kind` is a registered tag and whose `persistedName`, if present, is a
//! string); a node that fails it is not inspected further. Nodes that pass are
//! checked against the rules for their kind, recursing into children.
//!
//! The walk records every violation with its path, so a failed check can say
//! where the definition went wrong. [`is_valid_schema_node`] collapses the
//! report to a boolean. [`Validator::narrow`] returns the typed
//! [`SchemaNode`] built during the same walk.
//!
//! Paths start at `$`; object fields are appended as `.name` and sequence
//! elements as `[i]`, e.g. `$.members.address.memberType`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

use crate::error::{Result, SchemaError};
use crate::key::{IndexKeyConfiguration, KeyConfiguration, KeyableConfig};
use crate::schema::{
    CustomType, DocumentType, KeyableType, ListType, MapType, NumberType, PlainType, Schema,
    SchemaNode, TupleType,
};
use crate::tags::{KeyType, TypeTag};
use crate::value::{Callable, SchemaValue};

const ROOT: &str = "$";

/// Optional checks beyond the base rules
///
/// The defaults accept exactly what the base rules accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Reject a `persistedName` on a List/Map member type or a Tuple element.
    /// Such names are meaningless, since those children are not record attributes.
    #[serde(default)]
    pub reject_nested_persisted_names: bool,

    /// Reject `persistedName: ""`
    #[serde(default)]
    pub reject_empty_persisted_names: bool,

    /// Deepest nesting level allowed below the root node. Exceeding it is
    /// reported as a violation. `None` means unbounded.
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Check `keyConfiguration`/`indexKeyConfigurations` on Custom nodes the
    /// way they are checked on Binary, Number and String. Off by default:
    /// Custom nodes are valid on their marshall/unmarshall pair alone, and a
    /// malformed key configuration narrows to no keys.
    #[serde(default)]
    pub validate_custom_keys: bool,
}

impl ValidationOptions {
    /// All optional checks enabled
    pub fn strict() -> Self {
        Self {
            reject_nested_persisted_names: true,
            reject_empty_persisted_names: true,
            max_depth: None,
            validate_custom_keys: true,
        }
    }
}

/// Category of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    NotAnObject,
    MissingKind,
    UnknownKind,
    InvalidPersistedName,
    InvalidKeyConfiguration,
    InvalidIndexKeyConfiguration,
    NotInvocable,
    InvalidMembers,
    MissingMemberType,
    InvalidVersionAttribute,
    InvalidValueConstructor,
    NestedPersistedName,
    DepthExceeded,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::NotAnObject => "NOT_AN_OBJECT",
            ViolationCode::MissingKind => "MISSING_KIND",
            ViolationCode::UnknownKind => "UNKNOWN_KIND",
            ViolationCode::InvalidPersistedName => "INVALID_PERSISTED_NAME",
            ViolationCode::InvalidKeyConfiguration => "INVALID_KEY_CONFIGURATION",
            ViolationCode::InvalidIndexKeyConfiguration => "INVALID_INDEX_KEY_CONFIGURATION",
            ViolationCode::NotInvocable => "NOT_INVOCABLE",
            ViolationCode::InvalidMembers => "INVALID_MEMBERS",
            ViolationCode::MissingMemberType => "MISSING_MEMBER_TYPE",
            ViolationCode::InvalidVersionAttribute => "INVALID_VERSION_ATTRIBUTE",
            ViolationCode::InvalidValueConstructor => "INVALID_VALUE_CONSTRUCTOR",
            ViolationCode::NestedPersistedName => "NESTED_PERSISTED_NAME",
            ViolationCode::DepthExceeded => "DEPTH_EXCEEDED",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub code: ViolationCode,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.path, self.message, self.code)
    }
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    /// Nodes whose base contract was examined
    pub nodes_checked: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations with the given code
    pub fn with_code(&self, code: ViolationCode) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.code == code)
    }

    /// Violation recorded at exactly this path, if any
    pub fn at(&self, path: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.path == path)
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SchemaError::InvalidSchema(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid ({} nodes)", self.nodes_checked);
        }
        write!(f, "{} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

/// The recursive schema validator
///
/// Holds no state between calls; one instance may be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Whether `value` is a valid schema node
    pub fn is_valid(&self, value: &SchemaValue) -> bool {
        self.validate(value).is_valid()
    }

    /// Validate a single schema node
    pub fn validate(&self, value: &SchemaValue) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.check_node(value, ROOT, 0, &mut report);
        debug!(
            nodes = report.nodes_checked,
            violations = report.violations.len(),
            "validated schema node"
        );
        report
    }

    /// Validate and, if valid, return the typed node
    pub fn narrow(&self, value: &SchemaValue) -> Result<SchemaNode> {
        let mut report = ValidationReport::default();
        match self.check_node(value, ROOT, 0, &mut report) {
            Some(node) if report.is_valid() => Ok(node),
            _ => Err(SchemaError::InvalidSchema(report)),
        }
    }

    /// Validate a record schema: an object mapping attribute names to nodes
    pub fn validate_schema(&self, value: &SchemaValue) -> ValidationReport {
        let mut report = ValidationReport::default();
        self.check_members(value, ROOT, 0, &mut report);
        debug!(
            nodes = report.nodes_checked,
            violations = report.violations.len(),
            "validated record schema"
        );
        report
    }

    /// Validate a record schema and, if valid, return it typed
    pub fn narrow_schema(&self, value: &SchemaValue) -> Result<Schema> {
        let mut report = ValidationReport::default();
        match self.check_members(value, ROOT, 0, &mut report) {
            Some(schema) if report.is_valid() => Ok(schema),
            _ => Err(SchemaError::InvalidSchema(report)),
        }
    }

    fn violation(&self, report: &mut ValidationReport, path: &str, code: ViolationCode, message: String) {
        debug!(path, code = code.as_str(), "{}", message);
        report.violations.push(Violation {
            path: path.to_string(),
            code,
            message,
        });
    }

    fn check_node(
        &self,
        value: &SchemaValue,
        path: &str,
        depth: usize,
        report: &mut ValidationReport,
    ) -> Option<SchemaNode> {
        report.nodes_checked += 1;

        if let Some(max_depth) = self.options.max_depth {
            if depth > max_depth {
                self.violation(
                    report,
                    path,
                    ViolationCode::DepthExceeded,
                    format!("nesting depth {depth} exceeds the limit of {max_depth}"),
                );
                return None;
            }
        }

        let (kind, persisted_name, fields) = self.check_base(value, path, report)?;
        trace!(path, kind = kind.as_str(), "checking node");

        match kind {
            TypeTag::Binary => self
                .check_keyable(fields, path, report)
                .map(|keys| SchemaNode::Binary(KeyableType { persisted_name, keys })),
            TypeTag::String => self
                .check_keyable(fields, path, report)
                .map(|keys| SchemaNode::String(KeyableType { persisted_name, keys })),
            TypeTag::Custom => {
                let keys = if self.options.validate_custom_keys {
                    self.check_keyable(fields, path, report)
                } else {
                    let mut ignored = ValidationReport::default();
                    let keys = self.check_keyable(fields, path, &mut ignored);
                    if !ignored.is_valid() {
                        trace!(path, "ignoring malformed key configuration on Custom node");
                    }
                    Some(keys.unwrap_or_default())
                };
                let marshall = match fields.get("marshall") {
                    Some(SchemaValue::Function(Callable::Marshall(f))) => Some(f.clone()),
                    other => {
                        self.not_invocable(report, path, "marshall", other);
                        None
                    }
                };
                let unmarshall = match fields.get("unmarshall") {
                    Some(SchemaValue::Function(Callable::Unmarshall(f))) => Some(f.clone()),
                    other => {
                        self.not_invocable(report, path, "unmarshall", other);
                        None
                    }
                };
                Some(SchemaNode::Custom(CustomType {
                    persisted_name,
                    keys: keys?,
                    marshall: marshall?,
                    unmarshall: unmarshall?,
                }))
            }
            TypeTag::Document => {
                let members_path = format!("{path}.members");
                let members = match fields.get("members") {
                    Some(members) => self.check_members(members, &members_path, depth + 1, report),
                    None => {
                        self.violation(
                            report,
                            &members_path,
                            ViolationCode::InvalidMembers,
                            "Document requires a members object".to_string(),
                        );
                        None
                    }
                };
                let value_constructor = match fields.get("valueConstructor") {
                    None => Some(None),
                    Some(SchemaValue::Function(Callable::Constructor(f))) => Some(Some(f.clone())),
                    Some(other) => {
                        self.violation(
                            report,
                            &format!("{path}.valueConstructor"),
                            ViolationCode::InvalidValueConstructor,
                            format!("expected a zero-argument constructor, found {}", other.type_name()),
                        );
                        None
                    }
                };
                Some(SchemaNode::Document(DocumentType {
                    persisted_name,
                    members: members?,
                    value_constructor: value_constructor?,
                }))
            }
            TypeTag::List => self.check_member_type(fields, path, depth, report).map(|member_type| {
                SchemaNode::List(ListType {
                    persisted_name,
                    member_type: Box::new(member_type),
                })
            }),
            TypeTag::Map => self.check_member_type(fields, path, depth, report).map(|member_type| {
                SchemaNode::Map(MapType {
                    persisted_name,
                    member_type: Box::new(member_type),
                })
            }),
            TypeTag::Number => {
                let keys = self.check_keyable(fields, path, report);
                let is_version_attribute = match fields.get("isVersionAttribute") {
                    None => Some(None),
                    Some(SchemaValue::Bool(flag)) => Some(Some(*flag)),
                    Some(other) => {
                        self.violation(
                            report,
                            &format!("{path}.isVersionAttribute"),
                            ViolationCode::InvalidVersionAttribute,
                            format!("expected a boolean, found {}", other.type_name()),
                        );
                        None
                    }
                };
                Some(SchemaNode::Number(NumberType {
                    persisted_name,
                    keys: keys?,
                    is_version_attribute: is_version_attribute?,
                }))
            }
            TypeTag::Tuple => {
                let members_path = format!("{path}.members");
                let Some(items) = fields.get("members").and_then(SchemaValue::as_list) else {
                    let found = fields.get("members").map_or("nothing", SchemaValue::type_name);
                    self.violation(
                        report,
                        &members_path,
                        ViolationCode::InvalidMembers,
                        format!("Tuple requires a members list, found {found}"),
                    );
                    return None;
                };
                let mut members = Vec::with_capacity(items.len());
                let mut all_valid = true;
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{members_path}[{i}]");
                    match self.check_child(item, &item_path, depth + 1, report) {
                        Some(node) => members.push(node),
                        None => all_valid = false,
                    }
                }
                all_valid.then(|| SchemaNode::Tuple(TupleType { persisted_name, members }))
            }
            TypeTag::BinarySet => Some(SchemaNode::BinarySet(PlainType { persisted_name })),
            TypeTag::Boolean => Some(SchemaNode::Boolean(PlainType { persisted_name })),
            TypeTag::Collection => Some(SchemaNode::Collection(PlainType { persisted_name })),
            TypeTag::Date => Some(SchemaNode::Date(PlainType { persisted_name })),
            TypeTag::Hash => Some(SchemaNode::Hash(PlainType { persisted_name })),
            TypeTag::Null => Some(SchemaNode::Null(PlainType { persisted_name })),
            TypeTag::NumberSet => Some(SchemaNode::NumberSet(PlainType { persisted_name })),
            TypeTag::StringSet => Some(SchemaNode::StringSet(PlainType { persisted_name })),
        }
    }

    /// Base contract: object, registered `kind`, string-or-absent `persistedName`
    fn check_base<'v>(
        &self,
        value: &'v SchemaValue,
        path: &str,
        report: &mut ValidationReport,
    ) -> Option<(TypeTag, Option<String>, &'v BTreeMap<String, SchemaValue>)> {
        let Some(fields) = value.as_object() else {
            self.violation(
                report,
                path,
                ViolationCode::NotAnObject,
                format!("expected a schema node object, found {}", value.type_name()),
            );
            return None;
        };

        let kind = match fields.get("kind") {
            Some(SchemaValue::String(tag)) => match TypeTag::from_tag(tag) {
                Some(kind) => kind,
                None => {
                    self.violation(
                        report,
                        &format!("{path}.kind"),
                        ViolationCode::UnknownKind,
                        format!("{tag:?} is not a registered kind"),
                    );
                    return None;
                }
            },
            other => {
                let found = other.map_or("nothing", SchemaValue::type_name);
                self.violation(
                    report,
                    &format!("{path}.kind"),
                    ViolationCode::MissingKind,
                    format!("expected a kind string, found {found}"),
                );
                return None;
            }
        };

        let persisted_name = match fields.get("persistedName") {
            None => None,
            Some(SchemaValue::String(name)) => {
                if name.is_empty() && self.options.reject_empty_persisted_names {
                    self.violation(
                        report,
                        &format!("{path}.persistedName"),
                        ViolationCode::InvalidPersistedName,
                        "persisted name must not be empty".to_string(),
                    );
                    return None;
                }
                Some(name.clone())
            }
            Some(other) => {
                self.violation(
                    report,
                    &format!("{path}.persistedName"),
                    ViolationCode::InvalidPersistedName,
                    format!("expected a string, found {}", other.type_name()),
                );
                return None;
            }
        };

        Some((kind, persisted_name, fields))
    }

    /// Member list of a Document, or a top-level record schema
    fn check_members(
        &self,
        value: &SchemaValue,
        path: &str,
        depth: usize,
        report: &mut ValidationReport,
    ) -> Option<Schema> {
        let Some(entries) = value.as_object() else {
            self.violation(
                report,
                path,
                ViolationCode::InvalidMembers,
                format!("expected an object of member schemas, found {}", value.type_name()),
            );
            return None;
        };

        let mut schema = Schema::new();
        let mut all_valid = true;
        for (name, member) in entries {
            match self.check_node(member, &format!("{path}.{name}"), depth, report) {
                Some(node) => {
                    schema.insert(name.clone(), node);
                }
                None => all_valid = false,
            }
        }
        all_valid.then_some(schema)
    }

    fn check_member_type(
        &self,
        fields: &BTreeMap<String, SchemaValue>,
        path: &str,
        depth: usize,
        report: &mut ValidationReport,
    ) -> Option<SchemaNode> {
        let member_path = format!("{path}.memberType");
        match fields.get("memberType") {
            Some(member) => self.check_child(member, &member_path, depth + 1, report),
            None => {
                self.violation(
                    report,
                    &member_path,
                    ViolationCode::MissingMemberType,
                    "List and Map nodes require a memberType".to_string(),
                );
                None
            }
        }
    }

    /// A child that is not a record attribute: List/Map member type or Tuple element
    fn check_child(
        &self,
        value: &SchemaValue,
        path: &str,
        depth: usize,
        report: &mut ValidationReport,
    ) -> Option<SchemaNode> {
        let node = self.check_node(value, path, depth, report)?;
        if self.options.reject_nested_persisted_names && node.persisted_name().is_some() {
            self.violation(
                report,
                &format!("{path}.persistedName"),
                ViolationCode::NestedPersistedName,
                "member types and tuple elements cannot carry a persisted name".to_string(),
            );
            return None;
        }
        Some(node)
    }

    fn check_keyable(
        &self,
        fields: &BTreeMap<String, SchemaValue>,
        path: &str,
        report: &mut ValidationReport,
    ) -> Option<KeyableConfig> {
        let key_configuration = match fields.get("keyConfiguration") {
            None => Some(None),
            Some(value) => self
                .check_key_configuration(value, &format!("{path}.keyConfiguration"), report)
                .map(Some),
        };

        let index_path = format!("{path}.indexKeyConfigurations");
        let index_key_configurations = match fields.get("indexKeyConfigurations") {
            None => Some(Vec::new()),
            Some(SchemaValue::List(items)) => {
                let mut configs = Vec::with_capacity(items.len());
                let mut all_valid = true;
                for (i, item) in items.iter().enumerate() {
                    match self.check_index_key_configuration(item, &format!("{index_path}[{i}]"), report) {
                        Some(config) => configs.push(config),
                        None => all_valid = false,
                    }
                }
                all_valid.then_some(configs)
            }
            Some(other) => {
                self.violation(
                    report,
                    &index_path,
                    ViolationCode::InvalidIndexKeyConfiguration,
                    format!("expected a list of index key configurations, found {}", other.type_name()),
                );
                None
            }
        };

        Some(KeyableConfig {
            key_configuration: key_configuration?,
            index_key_configurations: index_key_configurations?,
        })
    }

    fn check_role(
        &self,
        value: &SchemaValue,
        path: &str,
        code: ViolationCode,
        report: &mut ValidationReport,
    ) -> Option<KeyType> {
        let Some(fields) = value.as_object() else {
            self.violation(
                report,
                path,
                code,
                format!("expected an object, found {}", value.type_name()),
            );
            return None;
        };
        match fields.get("role") {
            Some(SchemaValue::String(role)) => {
                let key_type = KeyType::from_tag(role);
                if key_type.is_none() {
                    self.violation(
                        report,
                        &format!("{path}.role"),
                        code,
                        format!("{role:?} is not a registered key role"),
                    );
                }
                key_type
            }
            other => {
                let found = other.map_or("nothing", SchemaValue::type_name);
                self.violation(
                    report,
                    &format!("{path}.role"),
                    code,
                    format!("expected a key role string, found {found}"),
                );
                None
            }
        }
    }

    fn check_key_configuration(
        &self,
        value: &SchemaValue,
        path: &str,
        report: &mut ValidationReport,
    ) -> Option<KeyConfiguration> {
        self.check_role(value, path, ViolationCode::InvalidKeyConfiguration, report)
            .map(KeyConfiguration::new)
    }

    fn check_index_key_configuration(
        &self,
        value: &SchemaValue,
        path: &str,
        report: &mut ValidationReport,
    ) -> Option<IndexKeyConfiguration> {
        let code = ViolationCode::InvalidIndexKeyConfiguration;
        let role = self.check_role(value, path, code, report);
        // Non-objects were already reported by the role check
        let fields = value.as_object()?;
        let index_name = match fields.get("indexName") {
            Some(SchemaValue::String(name)) => Some(name.clone()),
            other => {
                let found = other.map_or("nothing", SchemaValue::type_name);
                self.violation(
                    report,
                    &format!("{path}.indexName"),
                    code,
                    format!("expected an index name string, found {found}"),
                );
                None
            }
        };
        Some(IndexKeyConfiguration {
            role: role?,
            index_name: index_name?,
        })
    }

    fn not_invocable(
        &self,
        report: &mut ValidationReport,
        path: &str,
        field: &str,
        found: Option<&SchemaValue>,
    ) {
        let found = found.map_or("nothing", SchemaValue::type_name);
        self.violation(
            report,
            &format!("{path}.{field}"),
            ViolationCode::NotInvocable,
            format!("Custom nodes require an invocable {field} function, found {found}"),
        );
    }
}

/// Whether `value` is a valid schema node under the base rules
pub fn is_valid_schema_node(value: &SchemaValue) -> bool {
    Validator::default().is_valid(value)
}

/// Whether `value` is a valid record schema under the base rules
pub fn is_valid_schema(value: &SchemaValue) -> bool {
    Validator::default().validate_schema(value).is_valid()
}

impl TryFrom<&SchemaValue> for SchemaNode {
    type Error = SchemaError;

    fn try_from(value: &SchemaValue) -> Result<Self> {
        Validator::default().narrow(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::AttributeValue;
    use serde_json::json;

    fn value(json: serde_json::Value) -> SchemaValue {
        SchemaValue::from(json)
    }

    fn custom(marshall: Option<SchemaValue>, unmarshall: Option<SchemaValue>) -> SchemaValue {
        let mut fields = BTreeMap::from([("kind".to_string(), SchemaValue::from("Custom"))]);
        if let Some(m) = marshall {
            fields.insert("marshall".to_string(), m);
        }
        if let Some(u) = unmarshall {
            fields.insert("unmarshall".to_string(), u);
        }
        SchemaValue::Object(fields)
    }

    fn marshall_fn() -> SchemaValue {
        Callable::marshall(|v| Some(AttributeValue::String(v.to_string()))).into()
    }

    fn unmarshall_fn() -> SchemaValue {
        Callable::unmarshall(|a| json!(a.as_str())).into()
    }

    #[test]
    fn test_unknown_kinds_rejected() {
        for kind in ["Bogus", "string", "LIST", "", "Documents"] {
            assert!(!is_valid_schema_node(&value(json!({"kind": kind}))), "{kind:?}");
        }
    }

    #[test]
    fn test_every_plain_kind_valid() {
        for kind in TypeTag::ALL.iter().filter(|k| !k.is_container() && **k != TypeTag::Custom) {
            assert!(is_valid_schema_node(&value(json!({"kind": kind.as_str()}))), "{kind}");
        }
    }

    #[test]
    fn test_base_contract() {
        assert!(!is_valid_schema_node(&SchemaValue::Null));
        assert!(!is_valid_schema_node(&value(json!("String"))));
        assert!(!is_valid_schema_node(&value(json!({}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": 7}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "String", "persistedName": 7}))));
        assert!(is_valid_schema_node(&value(json!({"kind": "String", "persistedName": "s"}))));
    }

    #[test]
    fn test_base_failure_short_circuits() {
        let report = Validator::default().validate(&value(json!({
            "kind": "Nope",
            "persistedName": 5,
            "keyConfiguration": {"role": "BOGUS"}
        })));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].code, ViolationCode::UnknownKind);
        assert_eq!(report.violations[0].path, "$.kind");
    }

    #[test]
    fn test_list_and_map_member_types() {
        assert!(is_valid_schema_node(&value(json!({"kind": "List", "memberType": {"kind": "String"}}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "List", "memberType": {"kind": "Bogus"}}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Map"}))));
        assert!(is_valid_schema_node(&value(json!({
            "kind": "Map",
            "memberType": {"kind": "List", "memberType": {"kind": "Number"}}
        }))));
    }

    #[test]
    fn test_nested_persisted_name_accepted_by_default() {
        let candidate = value(json!({
            "kind": "List",
            "memberType": {"kind": "String", "persistedName": "inner"}
        }));
        assert!(is_valid_schema_node(&candidate));

        let strict = Validator::new(ValidationOptions::strict()).validate(&candidate);
        assert!(!strict.is_valid());
        assert_eq!(strict.violations[0].code, ViolationCode::NestedPersistedName);
        assert_eq!(strict.violations[0].path, "$.memberType.persistedName");
    }

    #[test]
    fn test_tuples() {
        assert!(is_valid_schema_node(&value(json!({
            "kind": "Tuple",
            "members": [{"kind": "Boolean"}, {"kind": "String"}]
        }))));
        assert!(!is_valid_schema_node(&value(json!({
            "kind": "Tuple",
            "members": [{"kind": "Boolean"}, {"kind": "NotAKind"}]
        }))));
        assert!(is_valid_schema_node(&value(json!({"kind": "Tuple", "members": []}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Tuple", "members": {}}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Tuple"}))));
    }

    #[test]
    fn test_number_key_configurations() {
        assert!(is_valid_schema_node(&value(json!({
            "kind": "Number",
            "keyConfiguration": {"role": "PRIMARY_HASH"}
        }))));
        assert!(!is_valid_schema_node(&value(json!({
            "kind": "Number",
            "keyConfiguration": {"role": "BOGUS"}
        }))));
        assert!(is_valid_schema_node(&value(json!({
            "kind": "Number",
            "indexKeyConfigurations": [{"role": "PRIMARY_RANGE", "indexName": "gsi1"}]
        }))));
        assert!(!is_valid_schema_node(&value(json!({
            "kind": "Number",
            "indexKeyConfigurations": [{"role": "PRIMARY_RANGE"}]
        }))));
        assert!(!is_valid_schema_node(&value(json!({
            "kind": "Number",
            "keyConfiguration": null
        }))));
    }

    #[test]
    fn test_one_bad_index_entry_invalidates_all() {
        let report = Validator::default().validate(&value(json!({
            "kind": "String",
            "indexKeyConfigurations": [
                {"role": "PRIMARY_HASH", "indexName": "a"},
                {"role": "PRIMARY_RANGE", "indexName": "b"},
                {"role": "PRIMARY_RANGE", "indexName": 3}
            ]
        })));
        assert!(!report.is_valid());
        assert!(report.at("$.indexKeyConfigurations[2].indexName").is_some());
    }

    #[test]
    fn test_version_attribute_must_be_boolean() {
        assert!(is_valid_schema_node(&value(json!({"kind": "Number", "isVersionAttribute": true}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Number", "isVersionAttribute": "yes"}))));
    }

    #[test]
    fn test_custom_requires_both_functions() {
        assert!(is_valid_schema_node(&custom(Some(marshall_fn()), Some(unmarshall_fn()))));
        assert!(!is_valid_schema_node(&custom(None, Some(unmarshall_fn()))));
        assert!(!is_valid_schema_node(&custom(Some(marshall_fn()), None)));
        assert!(!is_valid_schema_node(&custom(Some(SchemaValue::Null), Some(unmarshall_fn()))));
        assert!(!is_valid_schema_node(&custom(Some(marshall_fn()), Some(SchemaValue::from("fn")))));
        // Swapped shapes are not invocable with the expected signature
        assert!(!is_valid_schema_node(&custom(Some(unmarshall_fn()), Some(marshall_fn()))));
    }

    fn with_field(candidate: SchemaValue, key: &str, field: serde_json::Value) -> SchemaValue {
        let SchemaValue::Object(mut fields) = candidate else {
            panic!("Expected object");
        };
        fields.insert(key.to_string(), value(field));
        SchemaValue::Object(fields)
    }

    #[test]
    fn test_custom_key_configuration_ignored_by_default() {
        let bogus_key = with_field(
            custom(Some(marshall_fn()), Some(unmarshall_fn())),
            "keyConfiguration",
            json!({"role": "BOGUS"}),
        );
        let report = Validator::default().validate(&bogus_key);
        assert!(report.is_valid(), "{report}");

        let node = Validator::default().narrow(&bogus_key).unwrap();
        assert_eq!(node.keys(), Some(&KeyableConfig::default()));

        let strict = Validator::new(ValidationOptions::strict()).validate(&bogus_key);
        assert_eq!(
            strict.at("$.keyConfiguration.role").map(|v| v.code),
            Some(ViolationCode::InvalidKeyConfiguration)
        );
    }

    #[test]
    fn test_custom_index_keys_ignored_by_default() {
        let unnamed_index = with_field(
            custom(Some(marshall_fn()), Some(unmarshall_fn())),
            "indexKeyConfigurations",
            json!([{"role": "PRIMARY_HASH"}]),
        );
        assert!(is_valid_schema_node(&unnamed_index));

        let options = ValidationOptions {
            validate_custom_keys: true,
            ..Default::default()
        };
        let report = Validator::new(options).validate(&unnamed_index);
        assert!(report.at("$.indexKeyConfigurations[0].indexName").is_some());
    }

    #[test]
    fn test_custom_well_formed_keys_still_narrow() {
        let keyed = with_field(
            custom(Some(marshall_fn()), Some(unmarshall_fn())),
            "keyConfiguration",
            json!({"role": "PRIMARY_RANGE"}),
        );
        let node = Validator::default().narrow(&keyed).unwrap();
        assert_eq!(node.keys().and_then(KeyableConfig::table_role), Some(KeyType::Range));
    }

    #[test]
    fn test_binary_key_configurations() {
        assert!(is_valid_schema_node(&value(json!({
            "kind": "Binary",
            "keyConfiguration": {"role": "PRIMARY_RANGE"},
            "indexKeyConfigurations": [{"role": "PRIMARY_HASH", "indexName": "gsi1"}]
        }))));

        let report = Validator::default().validate(&value(json!({
            "kind": "Binary",
            "keyConfiguration": {"role": "SORT"},
            "indexKeyConfigurations": [{"role": "PRIMARY_HASH", "indexName": "gsi1"}, {"indexName": "gsi2"}]
        })));
        assert_eq!(
            report.at("$.keyConfiguration.role").map(|v| v.code),
            Some(ViolationCode::InvalidKeyConfiguration)
        );
        assert_eq!(
            report.at("$.indexKeyConfigurations[1].role").map(|v| v.code),
            Some(ViolationCode::InvalidIndexKeyConfiguration)
        );
    }

    #[test]
    fn test_index_key_configurations_must_be_a_list() {
        for bad in [json!({"role": "PRIMARY_HASH", "indexName": "gsi1"}), json!("gsi1"), json!(null)] {
            let report = Validator::default().validate(&value(json!({
                "kind": "String",
                "indexKeyConfigurations": bad
            })));
            assert_eq!(
                report.at("$.indexKeyConfigurations").map(|v| v.code),
                Some(ViolationCode::InvalidIndexKeyConfiguration),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_key_configuration_must_be_an_object() {
        for bad in [json!("PRIMARY_HASH"), json!([]), json!(1)] {
            let report = Validator::default().validate(&value(json!({
                "kind": "Number",
                "keyConfiguration": bad
            })));
            assert!(!report.is_valid(), "{bad}");
            assert!(report.with_code(ViolationCode::InvalidKeyConfiguration).count() >= 1, "{bad}");
        }
    }

    #[test]
    fn test_map_member_type_must_be_a_node() {
        assert!(!is_valid_schema_node(&value(json!({"kind": "Map", "memberType": {"kind": "Bogus"}}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Map", "memberType": "String"}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Map", "memberType": null}))));

        let report = Validator::default().validate(&value(json!({
            "kind": "Map",
            "memberType": {"kind": "Bogus"}
        })));
        assert_eq!(
            report.at("$.memberType.kind").map(|v| v.code),
            Some(ViolationCode::UnknownKind)
        );
    }

    #[test]
    fn test_document_members() {
        let valid = value(json!({
            "kind": "Document",
            "members": {"a": {"kind": "String"}, "b": {"kind": "Number"}}
        }));
        assert!(is_valid_schema_node(&valid));

        let invalid = value(json!({
            "kind": "Document",
            "members": {"a": {"kind": "String"}, "b": {"kind": "Nope"}}
        }));
        let report = Validator::default().validate(&invalid);
        assert!(!report.is_valid());
        assert!(report.at("$.members.b.kind").is_some());

        assert!(!is_valid_schema_node(&value(json!({"kind": "Document"}))));
        assert!(!is_valid_schema_node(&value(json!({"kind": "Document", "members": null}))));
        assert!(is_valid_schema_node(&value(json!({"kind": "Document", "members": {}}))));
    }

    #[test]
    fn test_document_value_constructor() {
        let mut fields = BTreeMap::from([
            ("kind".to_string(), SchemaValue::from("Document")),
            ("members".to_string(), SchemaValue::Object(BTreeMap::new())),
        ]);
        fields.insert(
            "valueConstructor".to_string(),
            Callable::constructor(|| json!({"type": "Widget"})).into(),
        );
        let with_constructor = SchemaValue::Object(fields.clone());
        let node = Validator::default().narrow(&with_constructor).unwrap();
        match node {
            SchemaNode::Document(doc) => {
                let constructor = doc.value_constructor.unwrap();
                assert_eq!(constructor(), json!({"type": "Widget"}));
            }
            other => panic!("Expected Document, got {:?}", other),
        }

        fields.insert("valueConstructor".to_string(), marshall_fn());
        assert!(!is_valid_schema_node(&SchemaValue::Object(fields)));
    }

    #[test]
    fn test_collects_violations_across_siblings() {
        let report = Validator::default().validate(&value(json!({
            "kind": "Document",
            "members": {
                "a": {"kind": "Bogus"},
                "b": {"kind": "List"},
                "c": {"kind": "Tuple", "members": [1]}
            }
        })));
        assert_eq!(report.violations.len(), 3);
        assert!(report.at("$.members.a.kind").is_some());
        assert!(report.at("$.members.b.memberType").is_some());
        assert!(report.at("$.members.c.members[0]").is_some());
    }

    #[test]
    fn test_max_depth() {
        let deep = value(json!({
            "kind": "List",
            "memberType": {"kind": "List", "memberType": {"kind": "List", "memberType": {"kind": "Null"}}}
        }));
        let options = ValidationOptions {
            max_depth: Some(2),
            ..Default::default()
        };
        let report = Validator::new(options).validate(&deep);
        assert_eq!(report.with_code(ViolationCode::DepthExceeded).count(), 1);
        assert!(Validator::default().is_valid(&deep));
    }

    #[test]
    fn test_strict_rejects_empty_persisted_name() {
        let candidate = value(json!({"kind": "Date", "persistedName": ""}));
        assert!(is_valid_schema_node(&candidate));
        assert!(!Validator::new(ValidationOptions::strict()).is_valid(&candidate));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let candidate = value(json!({
            "kind": "Document",
            "members": {"a": {"kind": "Map", "memberType": {"kind": "Hash"}}, "b": {"kind": "Bad"}}
        }));
        let validator = Validator::default();
        let first = validator.validate(&candidate);
        let second = validator.validate(&candidate);
        assert_eq!(first, second);
    }

    #[test]
    fn test_record_schema() {
        assert!(is_valid_schema(&value(json!({
            "id": {"kind": "String", "keyConfiguration": {"role": "HASH"}},
            "tags": {"kind": "StringSet"}
        }))));
        assert!(!is_valid_schema(&value(json!({"id": {"kind": "Strng"}}))));
        assert!(!is_valid_schema(&value(json!([]))));
    }

    #[test]
    fn test_report_display() {
        let report = Validator::default().validate(&value(json!({"kind": "Bogus"})));
        let text = report.to_string();
        assert!(text.starts_with("1 violation(s)"));
        assert!(text.contains("UNKNOWN_KIND"));
    }
}
