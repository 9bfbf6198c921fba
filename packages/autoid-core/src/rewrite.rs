//! Write-payload rewriting: fills auto-generated identifier fields on insert
//! payloads before they reach the database.
//!
//! Payloads are untyped JSON trees. Each entry of a payload object is first
//! classified into an [`EntryShape`] against the owning model's field
//! metadata, then handled by the matching recursive-descent step:
//!
//! | Shape                  | Handling                                             |
//! |------------------------|------------------------------------------------------|
//! | `Scalar`               | untouched                                            |
//! | `UnknownField`         | untouched (no metadata for the key)                  |
//! | `RelationArray`        | object elements rewritten with the same model        |
//! | `RelationCreate`       | `create` rewritten against the relation target       |
//! | `RelationCreateMany`   | `createMany.data` rewritten as inserts on the target |
//! | `Opaque`               | untouched                                            |
//!
//! Identifiers are only ever added: a truthy caller-supplied value is never
//! replaced and no key is removed.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::idgen::{IdGenerator, UuidV7Generator};
use crate::operation::Operation;
use crate::schema::{FieldDescriptor, ModelDescriptor, ModelIndex};

/// Key holding the nested single (or list) create of a relation write.
const CREATE: &str = "create";
/// Key holding the nested bulk create of a relation write.
const CREATE_MANY: &str = "createMany";
/// Key holding the payload in top-level and `createMany` arguments.
const DATA: &str = "data";
/// Upsert branch applied when the row exists.
const UPDATE: &str = "update";

// ---------------------------------------------------------------------------
// EntryShape
// ---------------------------------------------------------------------------

/// Structural shape of one `key: value` entry of a write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryShape<'m> {
    /// Not an object or array (includes `null`).
    Scalar,
    /// Object or array under a key the model has no field for.
    UnknownField,
    /// Array supplied for a relation field that is not list-valued.
    RelationArray,
    /// Relation write carrying a nested `create`.
    RelationCreate { target: &'m str },
    /// Relation write carrying `createMany.data` as an array.
    RelationCreateMany { target: &'m str },
    /// Any other object, e.g. `connect`, `set`, or a JSON column value.
    Opaque,
}

/// Classify a payload entry against its field metadata.
///
/// The first matching shape wins, so an object with both `create` and
/// `createMany` is treated as `RelationCreate`.
#[must_use]
pub fn classify_entry<'m>(field: Option<&'m FieldDescriptor>, value: &Value) -> EntryShape<'m> {
    if !(value.is_object() || value.is_array()) {
        return EntryShape::Scalar;
    }
    let Some(field) = field else {
        return EntryShape::UnknownField;
    };
    if !field.is_relation() {
        return EntryShape::Opaque;
    }
    if value.is_array() {
        return if field.is_list {
            EntryShape::Opaque
        } else {
            EntryShape::RelationArray
        };
    }

    let target = field.type_name.as_str();
    if value
        .get(CREATE)
        .is_some_and(|create| create.is_object() || create.is_array())
    {
        return EntryShape::RelationCreate { target };
    }
    if value
        .get(CREATE_MANY)
        .and_then(|create_many| create_many.get(DATA))
        .is_some_and(Value::is_array)
    {
        return EntryShape::RelationCreateMany { target };
    }
    EntryShape::Opaque
}

/// Truthiness as the host language defines it: `null`, `false`, `0` and `""`
/// are falsy, everything else (including empty arrays and objects) is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ---------------------------------------------------------------------------
// PayloadRewriter
// ---------------------------------------------------------------------------

/// Rewrites write arguments so that missing auto-identifier fields are
/// generated client-side.
///
/// Holds the read-only [`ModelIndex`] and the identifier source. Cloning is
/// cheap; both are shared behind `Arc`.
#[derive(Clone)]
pub struct PayloadRewriter {
    index: Arc<ModelIndex>,
    generator: Arc<dyn IdGenerator>,
    log_generated: bool,
}

impl std::fmt::Debug for PayloadRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadRewriter")
            .field("models", &self.index.len())
            .field("log_generated", &self.log_generated)
            .finish_non_exhaustive()
    }
}

impl PayloadRewriter {
    /// Create a rewriter that generates UUIDv7 identifiers.
    #[must_use]
    pub fn new(index: Arc<ModelIndex>) -> Self {
        Self::with_generator(index, Arc::new(UuidV7Generator))
    }

    /// Create a rewriter with a custom identifier source.
    #[must_use]
    pub fn with_generator(index: Arc<ModelIndex>, generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            index,
            generator,
            log_generated: true,
        }
    }

    /// Toggle the per-field info log emitted for every generated identifier.
    #[must_use]
    pub fn log_generated(mut self, enabled: bool) -> Self {
        self.log_generated = enabled;
        self
    }

    #[must_use]
    pub fn index(&self) -> &ModelIndex {
        &self.index
    }

    /// Rewrite the arguments of one intercepted query in place.
    ///
    /// - `create`, `createMany`, `update`, `updateMany`: `args.data` is
    ///   rewritten, element by element when it is an array.
    /// - `upsert`: `args.update` is rewritten as an update and `args.create`
    ///   as a create.
    /// - anything else is left untouched.
    ///
    /// Arguments for a model missing from the index are left untouched.
    pub fn rewrite_args(&self, operation: &Operation, model_name: &str, args: &mut Value) {
        if !operation.is_rewritten() {
            return;
        }
        let Some(model) = self.index.get(model_name) else {
            tracing::warn!(
                operation = %operation,
                model = model_name,
                "model not present in schema index, skipping rewrite"
            );
            return;
        };
        let Some(args) = args.as_object_mut() else {
            return;
        };

        tracing::info!(operation = %operation, model = model_name, "rewriting write arguments");

        match operation {
            Operation::Create
            | Operation::CreateMany
            | Operation::Update
            | Operation::UpdateMany => {
                let rewritten = match args.get(DATA) {
                    Some(Value::Array(items)) => Value::Array(
                        items
                            .iter()
                            .map(|item| {
                                let item = item.as_object();
                                Value::Object(self.rewrite(operation, Some(model), item))
                            })
                            .collect(),
                    ),
                    data => Value::Object(self.rewrite(
                        operation,
                        Some(model),
                        data.and_then(Value::as_object),
                    )),
                };
                args.insert(DATA.to_string(), rewritten);
            }
            Operation::Upsert => {
                let update = self.rewrite(
                    &Operation::Update,
                    Some(model),
                    args.get(UPDATE).and_then(Value::as_object),
                );
                let create = self.rewrite(
                    &Operation::Create,
                    Some(model),
                    args.get(CREATE).and_then(Value::as_object),
                );
                args.insert(UPDATE.to_string(), Value::Object(update));
                args.insert(CREATE.to_string(), Value::Object(create));
            }
            Operation::Other(_) => {}
        }
    }

    /// Rewrite a single payload object for `model`.
    ///
    /// Nested relation writes are rewritten recursively. When `operation` is
    /// an insert, every auto-identifier field without a truthy value in
    /// `data` receives a freshly generated identifier.
    ///
    /// A missing `model` or `data` yields an empty object.
    #[must_use]
    pub fn rewrite(
        &self,
        operation: &Operation,
        model: Option<&ModelDescriptor>,
        data: Option<&Map<String, Value>>,
    ) -> Map<String, Value> {
        let (Some(model), Some(data)) = (model, data) else {
            return Map::new();
        };

        let mut output = data.clone();
        for (key, value) in &mut output {
            match classify_entry(model.field(key), value) {
                EntryShape::Scalar | EntryShape::UnknownField | EntryShape::Opaque => {}
                EntryShape::RelationArray => {
                    self.rewrite_relation_array(operation, model, value);
                }
                EntryShape::RelationCreate { target } => {
                    self.rewrite_relation_create(operation, target, value);
                }
                EntryShape::RelationCreateMany { target } => {
                    self.rewrite_relation_create_many(key, model, target, value);
                }
            }
        }

        if operation.is_insert() {
            self.fill_identifiers(model, data, &mut output);
        }
        output
    }

    fn rewrite_relation_array(
        &self,
        operation: &Operation,
        model: &ModelDescriptor,
        value: &mut Value,
    ) {
        if let Value::Array(items) = value {
            self.rewrite_objects(operation, Some(model), items);
        }
    }

    /// Rewrite every object element in place; other elements are kept as-is.
    fn rewrite_objects(
        &self,
        operation: &Operation,
        model: Option<&ModelDescriptor>,
        items: &mut [Value],
    ) {
        for item in items {
            if let Value::Object(object) = item {
                *object = self.rewrite(operation, model, Some(&*object));
            }
        }
    }

    fn rewrite_relation_create(&self, operation: &Operation, target: &str, value: &mut Value) {
        let target_model = self.resolve_target(target);
        let Some(create) = value.get_mut(CREATE) else {
            return;
        };
        match create {
            Value::Array(items) => self.rewrite_objects(operation, target_model, items),
            nested => {
                *nested = Value::Object(self.rewrite(operation, target_model, nested.as_object()));
            }
        }
    }

    fn rewrite_relation_create_many(
        &self,
        key: &str,
        model: &ModelDescriptor,
        target: &str,
        value: &mut Value,
    ) {
        tracing::debug!(field = key, model = %model.name, "rewriting nested createMany");
        let target_model = self.resolve_target(target);
        let Some(Value::Array(items)) = value
            .get_mut(CREATE_MANY)
            .and_then(|create_many| create_many.get_mut(DATA))
        else {
            return;
        };
        self.rewrite_objects(&Operation::Create, target_model, items);
    }

    fn resolve_target(&self, target: &str) -> Option<&ModelDescriptor> {
        let resolved = self.index.get(target);
        if resolved.is_none() {
            tracing::warn!(
                relation_target = target,
                "relation target model not present in schema index"
            );
        }
        resolved
    }

    fn fill_identifiers(
        &self,
        model: &ModelDescriptor,
        input: &Map<String, Value>,
        output: &mut Map<String, Value>,
    ) {
        for name in model.auto_identifier_fields.keys() {
            if input.get(name).is_some_and(is_truthy) {
                continue;
            }
            let id = self.generator.generate();
            if self.log_generated {
                tracing::info!(
                    field = %name,
                    model = %model.name,
                    id = %id,
                    "generated identifier"
                );
            }
            output.insert(name.clone(), Value::String(id));
        }
    }
}
