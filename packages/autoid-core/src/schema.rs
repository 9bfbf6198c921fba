//! Schema classification: turns the host's parsed data model into a
//! [`ModelIndex`] that knows which fields carry generated-identifier defaults.
//!
//! The input mirrors the JSON data model emitted by the host's schema parser:
//!
//! ```json
//! { "datamodel": { "models": [
//!     { "name": "User", "fields": [
//!         { "name": "id", "kind": "scalar", "type": "String", "isList": false,
//!           "default": { "name": "uuid", "args": [4] } }
//!     ] }
//! ] } }
//! ```
//!
//! The index is built once when the extension is set up and is read-only
//! afterwards.

use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// First default argument the host emits for a `dbgenerated("gen_random_uuid()")` default.
pub const GEN_RANDOM_UUID: &str = "gen_random_uuid()";

/// Name of the host's built-in UUID default function.
pub const UUID_FUNCTION: &str = "uuid";

// ---------------------------------------------------------------------------
// Raw schema input
// ---------------------------------------------------------------------------

/// Top-level schema description handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub datamodel: Datamodel,
}

/// Data model section of a [`SchemaDescription`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datamodel {
    #[serde(default)]
    pub models: Vec<ModelDescription>,
}

/// A single model as emitted by the schema parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
}

/// A single field as emitted by the schema parser.
///
/// Parser attributes the classifier has no use for (`isRequired`, `isId`,
/// documentation, ...) are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    pub name: String,
    pub kind: FieldKind,
    /// Scalar type name, or the target model name for relation fields.
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub default: Option<FieldDefault>,
}

/// Field kind as reported by the schema parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Scalar,
    /// Relation to another model.
    Object,
    Enum,
    #[serde(other)]
    Unsupported,
}

/// Declared default of a field.
///
/// Variant order matters for deserialization: an object is only a function
/// default when it carries both `name` and `args`, arrays are list defaults,
/// and anything else is kept as a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDefault {
    Function(DefaultFunction),
    List(Vec<Value>),
    Literal(Value),
}

/// Function-style default such as `uuid(4)` or `dbgenerated("gen_random_uuid()")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultFunction {
    pub name: String,
    pub args: Vec<Value>,
}

/// Returns true when `default` marks a field as a generated UUID.
///
/// Exact, case-sensitive match on either the function name `uuid` or a first
/// argument of `gen_random_uuid()`. No other generator names are recognised.
#[must_use]
pub fn is_auto_identifier(default: Option<&FieldDefault>) -> bool {
    match default {
        Some(FieldDefault::Function(function)) => {
            let random_uuid_arg = matches!(
                function.args.first(),
                Some(Value::String(arg)) if arg == GEN_RANDOM_UUID
            );
            random_uuid_arg || function.name == UUID_FUNCTION
        }
        Some(FieldDefault::List(_) | FieldDefault::Literal(_)) | None => false,
    }
}

// ---------------------------------------------------------------------------
// Classified index
// ---------------------------------------------------------------------------

/// Field metadata after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub type_name: String,
    pub is_list: bool,
    pub default: Option<FieldDefault>,
    pub is_auto_identifier: bool,
}

impl FieldDescriptor {
    /// Whether this field is a relation to another model.
    #[must_use]
    pub fn is_relation(&self) -> bool {
        self.kind == FieldKind::Object
    }
}

impl From<&FieldDescription> for FieldDescriptor {
    fn from(raw: &FieldDescription) -> Self {
        Self {
            name: raw.name.clone(),
            kind: raw.kind,
            type_name: raw.type_name.clone(),
            is_list: raw.is_list,
            default: raw.default.clone(),
            is_auto_identifier: is_auto_identifier(raw.default.as_ref()),
        }
    }
}

/// A model reduced to keyed field views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelDescriptor {
    pub name: String,
    /// Every field, keyed by name.
    pub fields: BTreeMap<String, FieldDescriptor>,
    /// Only the fields whose default marks them as generated identifiers.
    pub auto_identifier_fields: BTreeMap<String, FieldDescriptor>,
}

impl ModelDescriptor {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }
}

impl From<&ModelDescription> for ModelDescriptor {
    fn from(raw: &ModelDescription) -> Self {
        let mut fields = BTreeMap::new();
        let mut auto_identifier_fields = BTreeMap::new();
        for raw_field in &raw.fields {
            let field = FieldDescriptor::from(raw_field);
            if field.is_auto_identifier {
                auto_identifier_fields.insert(field.name.clone(), field.clone());
            }
            fields.insert(field.name.clone(), field);
        }
        Self {
            name: raw.name.clone(),
            fields,
            auto_identifier_fields,
        }
    }
}

/// Model name to [`ModelDescriptor`] lookup, built once at setup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelIndex {
    models: BTreeMap<String, ModelDescriptor>,
}

impl ModelIndex {
    /// Parse a schema description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or does not have the shape of
    /// a schema description.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let value: Value =
            serde_json::from_str(json).context("schema description is not valid JSON")?;
        Self::from_value(value)
    }

    /// Build the index from an already-parsed JSON value.
    ///
    /// Accepts either the full `{ "datamodel": { "models": [...] } }` envelope
    /// or a bare array of models.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has neither shape or a model or field
    /// entry is malformed.
    pub fn from_value(value: Value) -> anyhow::Result<Self> {
        let models: Vec<ModelDescription> = if value.is_array() {
            serde_json::from_value(value).context("malformed model list")?
        } else {
            let schema: SchemaDescription =
                serde_json::from_value(value).context("malformed schema description")?;
            schema.datamodel.models
        };
        Ok(build_index(&models))
    }

    #[must_use]
    pub fn get(&self, model_name: &str) -> Option<&ModelDescriptor> {
        self.models.get(model_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }
}

impl From<&SchemaDescription> for ModelIndex {
    fn from(schema: &SchemaDescription) -> Self {
        build_index(&schema.datamodel.models)
    }
}

/// Classify every field of every model and index the result by model name.
#[must_use]
pub fn build_index(models: &[ModelDescription]) -> ModelIndex {
    let models = models
        .iter()
        .map(|raw| (raw.name.clone(), ModelDescriptor::from(raw)))
        .collect();
    ModelIndex { models }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(value: Value) -> FieldDescription {
        serde_json::from_value(value).expect("field description")
    }

    fn sample_schema() -> Value {
        json!({
            "datamodel": {
                "models": [
                    {
                        "name": "User",
                        "fields": [
                            { "name": "id", "kind": "scalar", "type": "String", "isList": false,
                              "isRequired": true, "isId": true,
                              "default": { "name": "uuid", "args": [4] } },
                            { "name": "email", "kind": "scalar", "type": "String", "isList": false },
                            { "name": "posts", "kind": "object", "type": "Post", "isList": true }
                        ]
                    },
                    {
                        "name": "Post",
                        "fields": [
                            { "name": "id", "kind": "scalar", "type": "String", "isList": false,
                              "default": { "name": "dbgenerated", "args": ["gen_random_uuid()"] } },
                            { "name": "title", "kind": "scalar", "type": "String", "isList": false,
                              "default": "untitled" }
                        ]
                    }
                ]
            }
        })
    }

    // ---- is_auto_identifier ----

    #[test]
    fn uuid_function_is_auto_identifier() {
        let f = field(json!({
            "name": "id", "kind": "scalar",
            "default": { "name": "uuid", "args": [] }
        }));
        assert!(is_auto_identifier(f.default.as_ref()));
    }

    #[test]
    fn gen_random_uuid_argument_is_auto_identifier() {
        let f = field(json!({
            "name": "id", "kind": "scalar",
            "default": { "name": "dbgenerated", "args": ["gen_random_uuid()"] }
        }));
        assert!(is_auto_identifier(f.default.as_ref()));
    }

    #[test]
    fn other_functions_are_not_auto_identifiers() {
        for default in [
            json!({ "name": "cuid", "args": [] }),
            json!({ "name": "autoincrement", "args": [] }),
            json!({ "name": "now", "args": [] }),
            json!({ "name": "UUID", "args": [] }),
            json!({ "name": "dbgenerated", "args": ["GEN_RANDOM_UUID()"] }),
            json!({ "name": "dbgenerated", "args": ["gen_random_uuid"] }),
            json!({ "name": "dbgenerated", "args": ["now()", "gen_random_uuid()"] }),
        ] {
            let f = field(json!({ "name": "id", "kind": "scalar", "default": default.clone() }));
            assert!(!is_auto_identifier(f.default.as_ref()), "{default}");
        }
    }

    #[test]
    fn literal_list_and_missing_defaults_are_not_auto_identifiers() {
        let literal = field(json!({ "name": "a", "kind": "scalar", "default": "uuid" }));
        let list = field(json!({
            "name": "b", "kind": "scalar", "isList": true,
            "default": ["gen_random_uuid()"]
        }));
        let none = field(json!({ "name": "c", "kind": "scalar" }));
        let null = field(json!({ "name": "d", "kind": "scalar", "default": null }));

        assert!(matches!(literal.default, Some(FieldDefault::Literal(_))));
        assert!(matches!(list.default, Some(FieldDefault::List(_))));
        assert!(none.default.is_none());
        assert!(null.default.is_none());
        for f in [literal, list, none, null] {
            assert!(!is_auto_identifier(f.default.as_ref()));
        }
    }

    #[test]
    fn object_default_without_args_is_literal() {
        let f = field(json!({ "name": "meta", "kind": "scalar", "default": { "name": "uuid" } }));
        assert!(matches!(f.default, Some(FieldDefault::Literal(_))));
        assert!(!is_auto_identifier(f.default.as_ref()));
    }

    // ---- build_index ----

    #[test]
    fn index_contains_every_model_and_field() {
        let index = ModelIndex::from_value(sample_schema()).expect("index");
        assert_eq!(index.len(), 2);

        let user = index.get("User").expect("User");
        assert_eq!(user.fields.len(), 3);
        assert!(user.field("email").is_some());
        assert!(user.field("posts").expect("posts").is_relation());
        assert_eq!(user.field("posts").expect("posts").type_name, "Post");
    }

    #[test]
    fn auto_identifier_view_is_restricted() {
        let index = ModelIndex::from_value(sample_schema()).expect("index");

        let user = index.get("User").expect("User");
        assert_eq!(user.auto_identifier_fields.keys().collect::<Vec<_>>(), vec!["id"]);
        assert!(user.fields["id"].is_auto_identifier);
        assert!(!user.fields["email"].is_auto_identifier);

        let post = index.get("Post").expect("Post");
        assert_eq!(post.auto_identifier_fields.keys().collect::<Vec<_>>(), vec!["id"]);
        assert!(!post.fields["title"].is_auto_identifier);
    }

    #[test]
    fn bare_model_list_is_accepted() {
        let models = sample_schema()["datamodel"]["models"].clone();
        let index = ModelIndex::from_value(models).expect("index");
        assert!(index.get("Post").is_some());
    }

    #[test]
    fn from_json_str_matches_from_value() {
        let text = sample_schema().to_string();
        let a = ModelIndex::from_json_str(&text).expect("index");
        let b = ModelIndex::from_value(sample_schema()).expect("index");
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_field_kind_is_unsupported() {
        let f = field(json!({ "name": "geo", "kind": "composite" }));
        assert_eq!(f.kind, FieldKind::Unsupported);
    }

    #[test]
    fn malformed_schema_is_an_error() {
        assert!(ModelIndex::from_json_str("not json").is_err());
        let nameless_model = json!({ "datamodel": { "models": [{ "fields": [] }] } });
        assert!(ModelIndex::from_value(nameless_model).is_err());
        let kindless_field = json!([{ "name": "User", "fields": [{ "name": "id" }] }]);
        assert!(ModelIndex::from_value(kindless_field).is_err());
        assert!(ModelIndex::from_value(json!("User")).is_err());
    }

    #[test]
    fn empty_schema_builds_empty_index() {
        let index = ModelIndex::from(&SchemaDescription::default());
        assert!(index.is_empty());
        assert!(index.get("User").is_none());
    }
}
