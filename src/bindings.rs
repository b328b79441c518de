//! Function bindings for JSON schema documents
//!
//! JSON cannot hold functions, so a Custom node written to a file names its
//! marshaller instead: `{"kind": "Custom", "marshall": "isoDate", "unmarshall": "isoDate"}`.
//! [`Bindings`] holds the named functions and substitutes them while turning
//! the JSON into a [`SchemaValue`]. Names that are not bound are left as
//! strings, which the validator rejects as non-invocable.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::tags::TypeTag;
use crate::value::{Callable, ConstructorFn, MarshallFn, SchemaValue, UnmarshallFn};
use crate::wire::AttributeValue;

#[derive(Clone)]
struct Marshaller {
    marshall: MarshallFn,
    unmarshall: UnmarshallFn,
}

/// Named marshallers and value constructors
#[derive(Clone, Default)]
pub struct Bindings {
    marshallers: BTreeMap<String, Marshaller>,
    constructors: BTreeMap<String, ConstructorFn>,
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("marshallers", &self.marshallers.keys().collect::<Vec<_>>())
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a marshall/unmarshall pair under `name`
    pub fn with_marshaller<M, U>(mut self, name: impl Into<String>, marshall: M, unmarshall: U) -> Self
    where
        M: Fn(&serde_json::Value) -> Option<AttributeValue> + Send + Sync + 'static,
        U: Fn(&AttributeValue) -> serde_json::Value + Send + Sync + 'static,
    {
        self.marshallers.insert(
            name.into(),
            Marshaller {
                marshall: Arc::new(marshall),
                unmarshall: Arc::new(unmarshall),
            },
        );
        self
    }

    /// Register a Document value constructor under `name`
    pub fn with_constructor<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> serde_json::Value + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    /// Whether a marshaller is registered under `name`
    pub fn has_marshaller(&self, name: &str) -> bool {
        self.marshallers.contains_key(name)
    }

    pub fn has_constructor(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Convert a JSON schema document, binding function names
    ///
    /// Only the `marshall`/`unmarshall` fields of Custom nodes and the
    /// `valueConstructor` field of Document nodes are candidates for
    /// substitution. Any other string stays a string.
    pub fn resolve(&self, json: serde_json::Value) -> SchemaValue {
        let mut value = SchemaValue::from(json);
        self.bind(&mut value);
        value
    }

    fn bind(&self, value: &mut SchemaValue) {
        match value {
            SchemaValue::Object(fields) => {
                let kind = fields
                    .get("kind")
                    .and_then(SchemaValue::as_str)
                    .and_then(TypeTag::from_tag);

                match kind {
                    Some(TypeTag::Custom) => self.bind_marshaller(fields),
                    Some(TypeTag::Document) => self.bind_constructor(fields),
                    _ => {}
                }

                for child in fields.values_mut() {
                    self.bind(child);
                }
            }
            SchemaValue::List(items) => {
                for item in items {
                    self.bind(item);
                }
            }
            _ => {}
        }
    }

    fn bind_marshaller(&self, fields: &mut BTreeMap<String, SchemaValue>) {
        if let Some(marshaller) = self.lookup_marshaller(fields.get("marshall")) {
            fields.insert(
                "marshall".to_string(),
                SchemaValue::Function(Callable::Marshall(marshaller.marshall.clone())),
            );
        }
        if let Some(marshaller) = self.lookup_marshaller(fields.get("unmarshall")) {
            fields.insert(
                "unmarshall".to_string(),
                SchemaValue::Function(Callable::Unmarshall(marshaller.unmarshall.clone())),
            );
        }
    }

    fn bind_constructor(&self, fields: &mut BTreeMap<String, SchemaValue>) {
        let Some(name) = fields
            .get("valueConstructor")
            .and_then(SchemaValue::as_str)
            .map(str::to_string)
        else {
            return;
        };
        match self.constructors.get(&name) {
            Some(constructor) => {
                let constructor = SchemaValue::Function(Callable::Constructor(constructor.clone()));
                fields.insert("valueConstructor".to_string(), constructor);
            }
            None => debug!(name = %name, "unbound value constructor"),
        }
    }

    fn lookup_marshaller(&self, field: Option<&SchemaValue>) -> Option<&Marshaller> {
        let name = field.and_then(SchemaValue::as_str)?;
        let marshaller = self.marshallers.get(name);
        if marshaller.is_none() {
            debug!(name, "unbound marshaller");
        }
        marshaller
    }
}
