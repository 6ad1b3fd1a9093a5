pub mod registry;
pub mod store_schema;

pub use registry::SchemaRegistry;
pub use store_schema::StoreSchema;
