//! # permstore
//!
//! A permissioned, hierarchically-nested key/value store.
//!
//! A [`Store`] holds named fields. A field can hold a JSON primitive, a JSON
//! array, another store, or a producer closure evaluated on every read.
//! Fields are addressed by colon-delimited paths such as `user:address:zip`,
//! and every path segment is checked against the permission table
//! ([`StoreSchema`]) of the store it lives in.
//!
//! ```
//! use permstore::{Permission, Store, StoreSchema};
//! use serde_json::json;
//!
//! let schema = StoreSchema::new("Account")
//!     .restrict("id", Permission::Read)
//!     .restrict("password", Permission::Write);
//! let account = Store::with_fields(schema, [("id", json!(42))]).unwrap();
//!
//! account.write("password", "hunter2").unwrap();
//! account.write("profile", json!({ "name": "Ada" })).unwrap();
//!
//! assert!(account.read("password").is_err());
//! assert!(account.write("id", 7).is_err());
//! assert_eq!(
//!     account.read("profile:name").unwrap().and_then(|v| v.into_json()),
//!     Some(json!("Ada"))
//! );
//! ```

pub mod config;
pub mod error;
pub mod path;
pub mod permissions;
pub mod schema;
pub mod store;
pub mod value;

pub use config::{ConfigError, SchemaConfig, StoreConfig};
pub use error::{Access, StoreError, StoreResult};
pub use path::{
    keys_to_path, lookup_nested, materialize_as_store, materialize_with_schema, path_to_keys,
    write_nested, PATH_SEPARATOR,
};
pub use permissions::{get_permission, is_readable, is_writable, Permission, PermissionManager};
pub use schema::{SchemaRegistry, StoreSchema};
pub use store::Store;
pub use value::{Producer, ReadValue, StoreValue};
