//! Builder configuration.
//!
//! Every setting has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! id_strategy = "uuid"
//! id_prefix = "fld"
//! max_import_depth = 16
//! seed_new_groups = false
//! ```

use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::limits::MAX_IMPORT_DEPTH;
use crate::model::{IdGenerator, SequentialIds, UuidIds};

/// How node ids are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Process-local counter.
    #[default]
    Sequential,
    /// UUIDv7.
    Uuid,
}

/// Settings for a [`FormBuilder`](crate::builder::FormBuilder) session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub id_strategy: IdStrategy,
    pub id_prefix: String,
    /// Nesting depth beyond which imported subtrees are dropped.
    pub max_import_depth: usize,
    /// Whether groups added in the builder start with one empty field.
    pub seed_new_groups: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Sequential,
            id_prefix: "node".to_string(),
            max_import_depth: MAX_IMPORT_DEPTH,
            seed_new_groups: true,
        }
    }
}

impl BuilderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads a TOML configuration file.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("loaded builder config from {:?}", path);
        Ok(config)
    }

    /// Creates the id generator this configuration asks for.
    pub fn id_generator(&self) -> Box<dyn IdGenerator> {
        match self.id_strategy {
            IdStrategy::Sequential => Box::new(SequentialIds::with_prefix(&self.id_prefix)),
            IdStrategy::Uuid => Box::new(UuidIds::with_prefix(&self.id_prefix)),
        }
    }
}
