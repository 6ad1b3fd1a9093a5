use std::collections::HashMap;
use std::rc::Rc;

use crate::permissions::Permission;

/// Permission table for one kind of store.
///
/// A schema is defined once and then shared by every store of that kind.
/// Lookups fall back to `default_policy` for undeclared fields. Fields may
/// also name a nested schema: a plain object written into such a field is
/// materialized into a store governed by that nested schema instead of the
/// default one.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSchema {
    name: String,
    default_policy: Permission,
    fields: HashMap<String, Permission>,
    nested: HashMap<String, Rc<StoreSchema>>,
}

impl StoreSchema {
    /// Creates a schema with a `rw` default policy and no declarations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_policy: Permission::ReadWrite,
            fields: HashMap::new(),
            nested: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_default_policy(mut self, policy: Permission) -> Self {
        self.default_policy = policy;
        self
    }

    /// Declares the permission of `field`.
    ///
    /// Declaring the same field twice keeps the last declaration.
    #[must_use]
    pub fn restrict(mut self, field: impl Into<String>, permission: Permission) -> Self {
        let field = field.into();
        if let Some(previous) = self.fields.insert(field.clone(), permission) {
            log::warn!(
                "Permission for '{}' on schema '{}' redeclared: {} -> {}",
                field,
                self.name,
                previous,
                permission
            );
        }
        self
    }

    /// Declares the schema used for stores created under `field`.
    #[must_use]
    pub fn nest(mut self, field: impl Into<String>, schema: impl Into<Rc<StoreSchema>>) -> Self {
        self.nested.insert(field.into(), schema.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_policy(&self) -> Permission {
        self.default_policy
    }

    /// The explicitly declared permission of `field`, if any.
    pub fn declared(&self, field: &str) -> Option<Permission> {
        self.fields.get(field).copied()
    }

    /// The permission governing `field`: declared, else the default policy.
    pub fn permission_for(&self, field: &str) -> Permission {
        self.declared(field).unwrap_or(self.default_policy)
    }

    pub fn nested_schema(&self, field: &str) -> Option<&Rc<StoreSchema>> {
        self.nested.get(field)
    }

    /// Iterates the explicit declarations.
    pub fn declarations(&self) -> impl Iterator<Item = (&str, Permission)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for StoreSchema {
    fn default() -> Self {
        Self::new("Store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_fields_use_default_policy() {
        let schema = StoreSchema::new("Profile")
            .with_default_policy(Permission::Read)
            .restrict("bio", Permission::ReadWrite);

        assert_eq!(schema.permission_for("bio"), Permission::ReadWrite);
        assert_eq!(schema.permission_for("age"), Permission::Read);
        assert_eq!(schema.declared("age"), None);
    }

    #[test]
    fn default_schema_is_read_write() {
        let schema = StoreSchema::default();
        assert_eq!(schema.name(), "Store");
        assert_eq!(schema.default_policy(), Permission::ReadWrite);
        assert_eq!(schema.declarations().count(), 0);
    }

    #[test]
    fn redeclaration_keeps_last() {
        let schema = StoreSchema::new("Profile")
            .restrict("bio", Permission::Read)
            .restrict("bio", Permission::None);
        assert_eq!(schema.declared("bio"), Some(Permission::None));
    }

    #[test]
    fn nested_schema_lookup() {
        let address = StoreSchema::new("Address").restrict("zip", Permission::Read);
        let user = StoreSchema::new("User").nest("address", address.clone());

        assert_eq!(user.nested_schema("address").map(|s| s.as_ref()), Some(&address));
        assert!(user.nested_schema("name").is_none());
    }
}
