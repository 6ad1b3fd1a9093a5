use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::rc::Rc;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// A zero-argument callable stored as a field value.
///
/// Invoked on every read that ends on its field; the result is never cached.
pub type Producer = Rc<dyn Fn() -> ReadValue>;

/// Raw content of a store field.
///
/// `Json` holds primitives and arrays. A JSON object is only valid as input
/// to a write, where it is materialized into a nested [`Store`]; a field found
/// holding one is reported as a type compatibility error.
#[derive(Clone)]
pub enum StoreValue {
    Json(JsonValue),
    Store(Store),
    Producer(Producer),
}

impl StoreValue {
    /// Wraps a closure as a producer field value.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> ReadValue + 'static,
    {
        StoreValue::Producer(Rc::new(f))
    }

    /// Converts any serializable value into its JSON form.
    ///
    /// Values serde_json cannot represent (maps with non-string keys, for
    /// example) are rejected as type compatibility errors.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> StoreResult<Self> {
        serde_json::to_value(value)
            .map(StoreValue::Json)
            .map_err(|e| StoreError::type_compatibility("<value>", e.to_string()))
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            StoreValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            StoreValue::Store(store) => Some(store),
            _ => None,
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, StoreValue::Producer(_))
    }

    pub fn is_plain_object(&self) -> bool {
        matches!(self, StoreValue::Json(JsonValue::Object(_)))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreValue::Json(value) => json_kind(value),
            StoreValue::Store(_) => "store",
            StoreValue::Producer(_) => "producer",
        }
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "plain object",
    }
}

impl fmt::Debug for StoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreValue::Json(value) => f.debug_tuple("Json").field(value).finish(),
            StoreValue::Store(store) => f.debug_tuple("Store").field(store).finish(),
            StoreValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl PartialEq for StoreValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StoreValue::Json(a), StoreValue::Json(b)) => a == b,
            (StoreValue::Store(a), StoreValue::Store(b)) => a.ptr_eq(b),
            (StoreValue::Producer(a), StoreValue::Producer(b)) => {
                std::ptr::eq(Rc::as_ptr(a) as *const u8, Rc::as_ptr(b) as *const u8)
            }
            _ => false,
        }
    }
}

impl From<JsonValue> for StoreValue {
    fn from(value: JsonValue) -> Self {
        StoreValue::Json(value)
    }
}

impl From<Store> for StoreValue {
    fn from(store: Store) -> Self {
        StoreValue::Store(store)
    }
}

impl From<ReadValue> for StoreValue {
    fn from(value: ReadValue) -> Self {
        match value {
            ReadValue::Json(value) => StoreValue::Json(value),
            ReadValue::Store(store) => StoreValue::Store(store),
        }
    }
}

macro_rules! json_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for StoreValue {
                fn from(value: $t) -> Self {
                    StoreValue::Json(JsonValue::from(value))
                }
            }

            impl From<$t> for ReadValue {
                fn from(value: $t) -> Self {
                    ReadValue::Json(JsonValue::from(value))
                }
            }
        )*
    };
}

json_from!(bool, i32, i64, u32, u64, f64, String, &str);

/// What a read resolves to: a JSON value or a handle to a nested store.
#[derive(Clone, Debug, PartialEq)]
pub enum ReadValue {
    Json(JsonValue),
    Store(Store),
}

impl ReadValue {
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            ReadValue::Json(value) => Some(value),
            ReadValue::Store(_) => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            ReadValue::Store(store) => Some(store),
            ReadValue::Json(_) => None,
        }
    }

    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            ReadValue::Json(value) => Some(value),
            ReadValue::Store(_) => None,
        }
    }

    pub fn into_store(self) -> Option<Store> {
        match self {
            ReadValue::Store(store) => Some(store),
            ReadValue::Json(_) => None,
        }
    }
}

impl From<JsonValue> for ReadValue {
    fn from(value: JsonValue) -> Self {
        ReadValue::Json(value)
    }
}

impl From<Store> for ReadValue {
    fn from(store: Store) -> Self {
        ReadValue::Store(store)
    }
}
