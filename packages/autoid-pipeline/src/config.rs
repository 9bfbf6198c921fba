use std::path::PathBuf;

use autoid_core::{ModelIndex, SchemaDescription};

use crate::extension::SetupError;

/// Where the extension reads the host's schema description from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Already-parsed description handed over by the host.
    Inline(SchemaDescription),
    /// JSON file on disk, either the full description or a bare model list.
    Path(PathBuf),
}

impl Default for SchemaSource {
    fn default() -> Self {
        Self::Inline(SchemaDescription::default())
    }
}

/// Setup-time configuration for the identifier extension.
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Schema description used to classify identifier fields.
    pub schema: SchemaSource,
    /// Emit an info log for every generated identifier.
    pub log_generated: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            schema: SchemaSource::default(),
            log_generated: true,
        }
    }
}

impl ExtensionConfig {
    #[must_use]
    pub fn from_schema(schema: SchemaDescription) -> Self {
        Self {
            schema: SchemaSource::Inline(schema),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            schema: SchemaSource::Path(path.into()),
            ..Self::default()
        }
    }

    /// Load and classify the configured schema.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::Io` if the schema file cannot be read and
    /// `SetupError::Schema` if its contents are malformed.
    pub fn load_index(&self) -> Result<ModelIndex, SetupError> {
        match &self.schema {
            SchemaSource::Inline(schema) => Ok(ModelIndex::from(schema)),
            SchemaSource::Path(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(ModelIndex::from_json_str(&text)?)
            }
        }
    }
}
