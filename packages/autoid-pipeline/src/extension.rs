//! Extension setup: builds the schema index once and hands out layers that
//! share it.

use std::path::PathBuf;
use std::sync::Arc;

use autoid_core::{IdGenerator, PayloadRewriter, UuidV7Generator};

use crate::config::ExtensionConfig;
use crate::middleware::AutoIdLayer;

/// Errors raised while setting up the extension.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to read schema description from {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema description: {0:#}")]
    Schema(#[from] anyhow::Error),
}

/// Configured identifier extension.
///
/// Owns the classified schema for its whole lifetime. Every layer produced
/// by [`AutoIdExtension::layer`] shares the same read-only index.
#[derive(Debug, Clone)]
pub struct AutoIdExtension {
    rewriter: PayloadRewriter,
}

impl AutoIdExtension {
    /// Set up the extension with UUIDv7 identifiers.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the configured schema cannot be loaded.
    pub fn new(config: &ExtensionConfig) -> Result<Self, SetupError> {
        Self::with_generator(config, Arc::new(UuidV7Generator))
    }

    /// Set up the extension with a custom identifier source.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the configured schema cannot be loaded.
    pub fn with_generator(
        config: &ExtensionConfig,
        generator: Arc<dyn IdGenerator>,
    ) -> Result<Self, SetupError> {
        let index = config.load_index()?;
        let identifier_fields: usize = index
            .models()
            .map(|m| m.auto_identifier_fields.len())
            .sum();
        tracing::debug!(models = index.len(), identifier_fields, "schema index built");
        let rewriter = PayloadRewriter::with_generator(Arc::new(index), generator)
            .log_generated(config.log_generated);
        Ok(Self { rewriter })
    }

    #[must_use]
    pub fn rewriter(&self) -> &PayloadRewriter {
        &self.rewriter
    }

    /// Tower layer that rewrites write arguments before the wrapped executor.
    #[must_use]
    pub fn layer(&self) -> AutoIdLayer {
        AutoIdLayer::new(self.rewriter.clone())
    }
}

#[cfg(test)]
mod tests {
    use autoid_core::{ModelIndex, Operation, SchemaDescription};
    use serde_json::json;

    use super::*;

    fn schema() -> SchemaDescription {
        serde_json::from_value(json!({ "datamodel": { "models": [
            { "name": "User", "fields": [
                { "name": "id", "kind": "scalar", "type": "String",
                  "default": { "name": "dbgenerated", "args": ["gen_random_uuid()"] } },
                { "name": "email", "kind": "scalar", "type": "String" }
            ] }
        ] } }))
        .expect("schema")
    }

    #[test]
    fn builds_index_from_inline_schema() {
        let ext = AutoIdExtension::new(&ExtensionConfig::from_schema(schema())).expect("extension");
        let expected = ModelIndex::from(&schema());
        assert_eq!(ext.rewriter().index(), &expected);
    }

    #[test]
    fn custom_generator_is_used() {
        let ext = AutoIdExtension::with_generator(
            &ExtensionConfig::from_schema(schema()),
            Arc::new(|| "fixed-id".to_string()),
        )
        .expect("extension");

        let mut args = json!({ "data": { "email": "a@b.c" } });
        ext.rewriter().rewrite_args(&Operation::Create, "User", &mut args);
        assert_eq!(args, json!({ "data": { "email": "a@b.c", "id": "fixed-id" } }));
    }

    #[test]
    fn schema_error_message_includes_cause() {
        let err = SetupError::from(anyhow::anyhow!("bad field").context("malformed model list"));
        assert_eq!(err.to_string(), "invalid schema description: malformed model list: bad field");
    }
}
