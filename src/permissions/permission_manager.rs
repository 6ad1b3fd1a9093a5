use crate::permissions::types::policy::Permission;
use crate::schema::StoreSchema;
use crate::store::Store;

/// Returns the permission that governs `field_name` on `store`.
///
/// A field without an explicit declaration in the store's schema falls back
/// to the schema's default policy. Absence of a declaration is not an error.
#[must_use]
pub fn get_permission(store: &Store, field_name: &str) -> Permission {
    store.schema().permission_for(field_name)
}

/// Enforces schema permission tables for store accesses.
///
/// The manager itself is stateless; every decision is derived from the
/// schema passed in, so one instance can serve every store in a tree.
/// Three checks exist:
/// - read: the field's permission is `r` or `rw`
/// - write: the field's permission is `w` or `rw`
/// - traverse: either of the above, used for ancestors of a deep write
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissionManager {}

impl PermissionManager {
    /// Creates a new PermissionManager instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether `field_name` may be read under `schema`.
    #[must_use]
    pub fn has_read_permission(&self, schema: &StoreSchema, field_name: &str) -> bool {
        let permission = schema.permission_for(field_name);
        let allowed = permission.is_readable();
        if !allowed {
            log::debug!(
                "Read denied on '{}' of schema '{}' (permission {})",
                field_name,
                schema.name(),
                permission
            );
        }
        allowed
    }

    /// Checks whether `field_name` may be overwritten under `schema`.
    #[must_use]
    pub fn has_write_permission(&self, schema: &StoreSchema, field_name: &str) -> bool {
        let permission = schema.permission_for(field_name);
        let allowed = permission.is_writable();
        if !allowed {
            log::debug!(
                "Write denied on '{}' of schema '{}' (permission {})",
                field_name,
                schema.name(),
                permission
            );
        }
        allowed
    }

    /// Checks whether a write may descend through `field_name`.
    ///
    /// Modifying a descendant only requires read or write access on the
    /// ancestor, not full write access.
    #[must_use]
    pub fn has_traverse_permission(&self, schema: &StoreSchema, field_name: &str) -> bool {
        let permission = schema.permission_for(field_name);
        let allowed = permission.is_readable() || permission.is_writable();
        if !allowed {
            log::debug!(
                "Traversal denied on '{}' of schema '{}'",
                field_name,
                schema.name()
            );
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> StoreSchema {
        StoreSchema::new("Account")
            .restrict("id", Permission::Read)
            .restrict("secret", Permission::None)
            .restrict("inbox", Permission::Write)
    }

    #[test]
    fn declared_permissions_drive_checks() {
        let manager = PermissionManager::new();
        let schema = schema();

        assert!(manager.has_read_permission(&schema, "id"));
        assert!(!manager.has_write_permission(&schema, "id"));

        assert!(!manager.has_read_permission(&schema, "inbox"));
        assert!(manager.has_write_permission(&schema, "inbox"));

        assert!(!manager.has_read_permission(&schema, "secret"));
        assert!(!manager.has_write_permission(&schema, "secret"));
    }

    #[test]
    fn traversal_needs_read_or_write() {
        let manager = PermissionManager::new();
        let schema = schema();

        assert!(manager.has_traverse_permission(&schema, "id"));
        assert!(manager.has_traverse_permission(&schema, "inbox"));
        assert!(manager.has_traverse_permission(&schema, "undeclared"));
        assert!(!manager.has_traverse_permission(&schema, "secret"));
    }

    #[test]
    fn get_permission_falls_back_to_default_policy() {
        let store = Store::with_schema(
            StoreSchema::new("Locked")
                .with_default_policy(Permission::None)
                .restrict("open", Permission::ReadWrite),
        );

        assert_eq!(get_permission(&store, "open"), Permission::ReadWrite);
        assert_eq!(get_permission(&store, "anything"), Permission::None);
    }
}
