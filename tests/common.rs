//! Common test utilities and fixtures for store integration tests

#![allow(dead_code)]

use permstore::{Permission, ReadValue, Store, StoreResult, StoreSchema};
use serde_json::{json, Value};

/// Initialize logging once; later calls are ignored
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Store with `a = true` and `b = { c: true, d: true }`, all `rw`
pub fn sample_store() -> Store {
    let store = Store::new();
    store
        .write_entries(object(json!({ "a": true, "b": { "c": true, "d": true } })))
        .expect("rw fields accept writes");
    store
}

/// Schema declaring one field per permission level
pub fn lattice_schema() -> StoreSchema {
    StoreSchema::new("Lattice")
        .restrict("none", Permission::None)
        .restrict("r", Permission::Read)
        .restrict("w", Permission::Write)
        .restrict("rw", Permission::ReadWrite)
}

pub fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// Reads `path` and unwraps a JSON result
pub fn read_json(store: &Store, path: &str) -> StoreResult<Option<Value>> {
    store.read(path).map(|v| v.and_then(ReadValue::into_json))
}
