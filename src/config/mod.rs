//! Schema configuration for permstore
//!
//! Permission tables can be declared in TOML instead of code:
//!
//! ```toml
//! default_policy = "rw"
//!
//! [schemas.User]
//! default_policy = "r"
//! fields = { password = "none", nickname = "rw" }
//! nested = { address = "Address" }
//!
//! [schemas.Address]
//! fields = { zip = "r" }
//! ```
//!
//! A parsed [`StoreConfig`] is turned into shared schemas by
//! [`SchemaRegistry::from_config`](crate::schema::SchemaRegistry::from_config).

pub mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::path::PATH_SEPARATOR;
use crate::permissions::Permission;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Default policy for schemas that do not set their own
    #[serde(default)]
    pub default_policy: Permission,
    /// Schema definitions keyed by schema name
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaConfig>,
}

/// One schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub default_policy: Option<Permission>,
    /// Field name -> declared permission
    #[serde(default)]
    pub fields: BTreeMap<String, Permission>,
    /// Field name -> name of the schema for stores created under that field
    #[serde(default)]
    pub nested: BTreeMap<String, String>,
}

impl StoreConfig {
    /// Parses a TOML document and validates it.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading store config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks field names and nested schema references.
    ///
    /// Field names may not contain the path separator, since such a field
    /// could never be addressed by a path.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, schema) in &self.schemas {
            let field_names = schema.fields.keys().chain(schema.nested.keys());
            for field in field_names {
                if field.contains(PATH_SEPARATOR) {
                    return Err(ConfigError::validation(format!(
                        "Field '{}' in schema '{}' contains the path separator '{}'",
                        field, name, PATH_SEPARATOR
                    )));
                }
            }
            for (field, target) in &schema.nested {
                if !self.schemas.contains_key(target) {
                    return Err(ConfigError::validation(format!(
                        "Field '{}' in schema '{}' refers to unknown schema '{}'",
                        field, name, target
                    )));
                }
            }
        }
        Ok(())
    }
}
