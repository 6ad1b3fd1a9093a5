use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Access, StoreError, StoreResult};
use crate::path::{lookup_nested, materialize_with_schema, path_to_keys, split_head, write_nested};
use crate::permissions::{Permission, PermissionManager};
use crate::schema::StoreSchema;
use crate::value::{json_kind, ReadValue, StoreValue};

const PERMISSIONS: PermissionManager = PermissionManager {};

struct StoreState {
    schema: Rc<StoreSchema>,
    fields: BTreeMap<String, StoreValue>,
}

/// A permissioned container of named fields.
///
/// Fields hold JSON primitives, JSON arrays, nested stores, or producers.
/// Every access through [`read`](Store::read) and [`write`](Store::write) is
/// checked against the store's schema; paths descend into nested stores,
/// each of which enforces its own schema.
///
/// `Store` is a handle: clones share the same fields. It is meant for one
/// thread of control and is neither `Send` nor `Sync`.
#[derive(Clone)]
pub struct Store {
    inner: Rc<RefCell<StoreState>>,
}

impl Store {
    /// Creates an empty store with the default `rw` schema.
    pub fn new() -> Self {
        Self::with_schema(StoreSchema::default())
    }

    pub fn with_schema(schema: impl Into<Rc<StoreSchema>>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreState {
                schema: schema.into(),
                fields: BTreeMap::new(),
            })),
        }
    }

    /// Creates a store with initial field values.
    ///
    /// Initial values are assigned without permission checks, which is how
    /// read-only fields get their contents. Plain objects are still
    /// materialized into nested stores.
    pub fn with_fields<I, K, V>(schema: impl Into<Rc<StoreSchema>>, fields: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<StoreValue>,
    {
        let store = Self::with_schema(schema);
        let schema = store.schema();
        for (key, value) in fields {
            let key = key.into();
            let value = materialize_with_schema(value.into(), child_schema(&schema, &key))?;
            store.set(key, value);
        }
        Ok(store)
    }

    pub fn schema(&self) -> Rc<StoreSchema> {
        Rc::clone(&self.inner.borrow().schema)
    }

    pub fn default_policy(&self) -> Permission {
        self.inner.borrow().schema.default_policy()
    }

    pub fn allowed_to_read(&self, key: &str) -> bool {
        PERMISSIONS.has_read_permission(&self.schema(), key)
    }

    pub fn allowed_to_write(&self, key: &str) -> bool {
        PERMISSIONS.has_write_permission(&self.schema(), key)
    }

    /// Returns the raw value of a field without permission checks.
    ///
    /// Producers are returned unevaluated. A field holding a plain JSON
    /// object is an error: objects are only stored as nested stores.
    pub fn get(&self, key: &str) -> StoreResult<Option<StoreValue>> {
        let value = self.inner.borrow().fields.get(key).cloned();
        match value {
            Some(value) if value.is_plain_object() => Err(StoreError::type_compatibility(
                key,
                "plain objects must be materialized into a store before being stored",
            )),
            other => Ok(other),
        }
    }

    /// Assigns a field directly. No permission check, no conversion.
    pub fn set(&self, key: impl Into<String>, value: StoreValue) {
        self.inner.borrow_mut().fields.insert(key.into(), value);
    }

    /// Reads the value at `path`.
    ///
    /// The first key must be readable here. When the path continues into a
    /// nested store, that store checks the rest of the path against its own
    /// schema; when it continues into plain JSON (an array, for instance) the
    /// remaining keys are looked up without further checks. Producers at the
    /// end of the path are invoked on every call.
    pub fn read(&self, path: &str) -> StoreResult<Option<ReadValue>> {
        let (head, rest) = split_head(path);

        if !self.allowed_to_read(head) {
            return Err(StoreError::permission_denied(Access::Read, head, path));
        }

        let value = self.resolve(head)?;
        let Some(rest) = rest else {
            return Ok(value);
        };

        log::trace!("read '{}': descending into '{}'", path, head);
        match value {
            Some(ReadValue::Store(child)) => child.read(rest).map_err(|e| e.within(head)),
            Some(ReadValue::Json(json)) => {
                let keys = path_to_keys(rest);
                Ok(lookup_nested(Some(&json), &keys).cloned().map(ReadValue::Json))
            }
            None => Ok(None),
        }
    }

    /// Writes `value` at `path` and returns `value` as supplied.
    ///
    /// A single-key path needs write permission on that key. A longer path
    /// needs only read or write permission on its first key; the write is
    /// then handed to the nested store found there, which applies its own
    /// schema, or merged into a freshly created container when the field is
    /// empty. Plain objects in `value` are materialized into stores.
    pub fn write<V: Into<StoreValue>>(&self, path: &str, value: V) -> StoreResult<StoreValue> {
        let value = value.into();
        let schema = self.schema();
        let (head, rest) = split_head(path);

        match rest {
            Some(rest) => {
                if !PERMISSIONS.has_traverse_permission(&schema, head) {
                    return Err(StoreError::permission_denied(Access::ReadOrWrite, head, path));
                }

                match self.get(head)? {
                    Some(StoreValue::Store(child)) => {
                        log::trace!("write '{}': delegating to nested store '{}'", path, head);
                        child.write(rest, value.clone()).map_err(|e| e.within(head))?;
                    }
                    current => {
                        log::trace!("write '{}': merging below '{}'", path, head);
                        let keys = path_to_keys(rest);
                        let merged = write_into(&schema, head, current, &keys, value.clone())?;
                        self.set(head, merged);
                    }
                }
            }
            None => {
                if !PERMISSIONS.has_write_permission(&schema, head) {
                    return Err(StoreError::permission_denied(Access::Write, head, path));
                }
                log::trace!("write '{}'", path);
                let converted = materialize_with_schema(value.clone(), child_schema(&schema, head))?;
                self.set(head, converted);
            }
        }

        Ok(value)
    }

    /// Writes each entry in iteration order.
    ///
    /// Stops at the first failure. Entries written before it stay written.
    pub fn write_entries<I, K, V>(&self, entries: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<StoreValue>,
    {
        for (key, value) in entries {
            self.write(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Every readable field with its raw value; unreadable fields are left out.
    pub fn entries(&self) -> BTreeMap<String, StoreValue> {
        let state = self.inner.borrow();
        let mut entries = BTreeMap::new();
        for (key, value) in &state.fields {
            if state.schema.permission_for(key).is_readable() {
                entries.insert(key.clone(), value.clone());
            }
        }
        entries
    }

    /// Exports the readable tree as plain JSON.
    ///
    /// Producers are evaluated and nested stores are exported under their own
    /// schemas. A field leading back to a store already being exported above
    /// it is left out.
    pub fn snapshot(&self) -> JsonValue {
        self.snapshot_below(&mut Vec::new())
    }

    fn snapshot_below(&self, ancestors: &mut Vec<Store>) -> JsonValue {
        ancestors.push(self.clone());
        let mut map = Map::new();
        for (key, value) in self.entries() {
            let store = match value {
                StoreValue::Json(json) => {
                    map.insert(key, json);
                    continue;
                }
                StoreValue::Store(store) => store,
                StoreValue::Producer(producer) => match producer() {
                    ReadValue::Json(json) => {
                        map.insert(key, json);
                        continue;
                    }
                    ReadValue::Store(store) => store,
                },
            };
            if ancestors.iter().any(|seen| seen.ptr_eq(&store)) {
                log::warn!("snapshot: skipping '{}', it refers back to an enclosing store", key);
                continue;
            }
            map.insert(key, store.snapshot_below(ancestors));
        }
        ancestors.pop();
        JsonValue::Object(map)
    }

    /// All field names, readable or not.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().fields.is_empty()
    }

    /// True if both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn resolve(&self, key: &str) -> StoreResult<Option<ReadValue>> {
        match self.get(key)? {
            None => Ok(None),
            Some(StoreValue::Json(json)) => Ok(Some(ReadValue::Json(json))),
            Some(StoreValue::Store(store)) => Ok(Some(ReadValue::Store(store))),
            Some(StoreValue::Producer(producer)) => match producer() {
                ReadValue::Json(json @ JsonValue::Object(_)) => Err(StoreError::type_compatibility(
                    key,
                    format!("producer yielded a {}", json_kind(&json)),
                )),
                produced => Ok(Some(produced)),
            },
        }
    }
}

/// Schema for a store created under `key` of a store governed by `parent`.
fn child_schema(parent: &StoreSchema, key: &str) -> Rc<StoreSchema> {
    parent
        .nested_schema(key)
        .cloned()
        .unwrap_or_else(|| Rc::new(StoreSchema::default()))
}

/// Places `value` at `keys` below `current`, the value of `key` in a store
/// governed by `parent`, and returns the new value for `key`.
///
/// Empty containers (absent, `null`, `false`, `0` or `""`) become fresh
/// stores. Arrays are rebuilt with [`write_nested`] and keep plain JSON.
/// Fields are assigned raw, without permission checks.
fn write_into(
    parent: &StoreSchema,
    key: &str,
    current: Option<StoreValue>,
    keys: &[String],
    value: StoreValue,
) -> StoreResult<StoreValue> {
    let Some((next, rest)) = keys.split_first() else {
        return materialize_with_schema(value, child_schema(parent, key));
    };

    let container = match current {
        None => Store::with_schema(child_schema(parent, key)),
        Some(StoreValue::Json(json)) if is_empty_container(&json) => {
            Store::with_schema(child_schema(parent, key))
        }
        Some(StoreValue::Json(array @ JsonValue::Array(_))) => {
            return match value {
                StoreValue::Json(json) => Ok(StoreValue::Json(write_nested(Some(array), keys, json))),
                other => Err(StoreError::type_compatibility(
                    key,
                    format!("cannot place a {} inside an array", other.kind()),
                )),
            };
        }
        Some(StoreValue::Store(store)) => store,
        Some(other) => {
            return Err(StoreError::type_compatibility(
                key,
                format!("cannot write \"{}\" into a {}", next, other.kind()),
            ))
        }
    };

    let existing = container.get(next)?;
    let merged = write_into(&container.schema(), next, existing, rest, value)?;
    container.set(next.clone(), merged);
    Ok(StoreValue::Store(container))
}

/// Values a deep write may replace with a fresh store.
fn is_empty_container(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(flag) => !flag,
        JsonValue::Number(n) => n.as_f64() == Some(0.0),
        JsonValue::String(text) => text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Store {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        let keys: Vec<&String> = state.fields.keys().collect();
        f.debug_struct("Store")
            .field("schema", &state.schema.name())
            .field("keys", &keys)
            .finish()
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}
