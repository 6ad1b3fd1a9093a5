use std::collections::HashMap;
use std::rc::Rc;

use super::store_schema::StoreSchema;
use crate::config::{ConfigError, SchemaConfig, StoreConfig};
use crate::store::Store;

/// Holds every schema resolved from a [`StoreConfig`], keyed by name.
///
/// The registry is an explicit value; nothing is registered globally.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Rc<StoreSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves all schemas in `config`, including nested references.
    ///
    /// Fails if the config does not validate or if nested references form a
    /// cycle.
    pub fn from_config(config: &StoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut resolved = HashMap::new();
        for name in config.schemas.keys() {
            let mut visiting = Vec::new();
            resolve(name, config, &mut resolved, &mut visiting)?;
        }

        log::debug!("Resolved {} schema(s) from config", resolved.len());
        Ok(Self { schemas: resolved })
    }

    /// Loads a schema or replaces an existing one with the same name.
    pub fn load_schema(&mut self, schema: StoreSchema) -> Rc<StoreSchema> {
        let schema = Rc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), Rc::clone(&schema));
        schema
    }

    pub fn get(&self, name: &str) -> Option<Rc<StoreSchema>> {
        self.schemas.get(name).cloned()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Creates an empty store governed by the named schema.
    pub fn store(&self, name: &str) -> Option<Store> {
        self.get(name).map(Store::with_schema)
    }

    /// Schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn resolve(
    name: &str,
    config: &StoreConfig,
    resolved: &mut HashMap<String, Rc<StoreSchema>>,
    visiting: &mut Vec<String>,
) -> Result<Rc<StoreSchema>, ConfigError> {
    if let Some(schema) = resolved.get(name) {
        return Ok(Rc::clone(schema));
    }
    if visiting.iter().any(|v| v == name) {
        visiting.push(name.to_string());
        return Err(ConfigError::Validation(format!(
            "Nested schema cycle: {}",
            visiting.join(" -> ")
        )));
    }

    let definition: &SchemaConfig = config
        .schemas
        .get(name)
        .ok_or_else(|| ConfigError::Validation(format!("Unknown schema '{}'", name)))?;

    visiting.push(name.to_string());
    let mut schema = StoreSchema::new(name)
        .with_default_policy(definition.default_policy.unwrap_or(config.default_policy));
    for (field, permission) in &definition.fields {
        schema = schema.restrict(field.clone(), *permission);
    }
    for (field, nested_name) in &definition.nested {
        let nested = resolve(nested_name, config, resolved, visiting)?;
        schema = schema.nest(field.clone(), nested);
    }
    visiting.pop();

    let schema = Rc::new(schema);
    resolved.insert(name.to_string(), Rc::clone(&schema));
    Ok(schema)
}
