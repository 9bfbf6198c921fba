//! `autoid` core: schema classification and write-payload rewriting that
//! fills generated-UUID identifier fields client-side with UUIDv7 values.

pub mod idgen;
pub mod operation;
pub mod rewrite;
pub mod schema;

pub use idgen::{IdGenerator, UuidV7Generator};
pub use operation::Operation;
pub use rewrite::{classify_entry, is_truthy, EntryShape, PayloadRewriter};
pub use schema::{
    build_index, is_auto_identifier, DefaultFunction, FieldDefault, FieldDescription,
    FieldDescriptor, FieldKind, ModelDescription, ModelDescriptor, ModelIndex, SchemaDescription,
};
