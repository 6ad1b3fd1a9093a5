//! Colon-delimited path helpers and deep conversion of plain data.
//!
//! Paths like `user:address:zip` address a field through nested containers.
//! Segments are kept verbatim: no trimming, and empty segments are literal
//! keys. The lookup and write helpers here know nothing about permissions;
//! enforcement belongs to [`Store`].

use serde_json::{Map, Value as JsonValue};
use std::rc::Rc;

use crate::error::StoreResult;
use crate::schema::StoreSchema;
use crate::store::Store;
use crate::value::StoreValue;

/// Hierarchy separator. Fixed; not configurable.
pub const PATH_SEPARATOR: char = ':';

/// Splits a path into its keys.
pub fn path_to_keys(path: &str) -> Vec<String> {
    path.split(PATH_SEPARATOR).map(str::to_string).collect()
}

/// Joins keys into a path. Inverse of [`path_to_keys`].
pub fn keys_to_path<S: AsRef<str>>(keys: &[S]) -> String {
    let mut out = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(PATH_SEPARATOR);
        }
        out.push_str(key.as_ref());
    }
    out
}

/// Splits off the first key: `"a:b:c"` gives `("a", Some("b:c"))`.
pub fn split_head(path: &str) -> (&str, Option<&str>) {
    match path.split_once(PATH_SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Looks up the value at `keys` inside a plain nested structure.
///
/// Objects are indexed by key and arrays by decimal index. Returns `None` as
/// soon as the container at some step is absent, `null`, or a primitive.
/// An empty key list yields the container itself.
pub fn lookup_nested<'a, S: AsRef<str>>(
    container: Option<&'a JsonValue>,
    keys: &[S],
) -> Option<&'a JsonValue> {
    let mut current = container?;
    for key in keys {
        let key = key.as_ref();
        current = match current {
            JsonValue::Object(map) => map.get(key)?,
            JsonValue::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Returns `container` rebuilt so that the value at `keys` is `value`.
///
/// Sibling fields are kept. Arrays are indexed by decimal key and padded
/// with `null` up to the index. Any other container (absent, `null`, a
/// primitive, or an array addressed by a non-numeric key) is replaced by a
/// fresh object. An empty key list yields `value`.
pub fn write_nested<S: AsRef<str>>(
    container: Option<JsonValue>,
    keys: &[S],
    value: JsonValue,
) -> JsonValue {
    let Some((head, rest)) = keys.split_first() else {
        return value;
    };

    let mut map = match container {
        Some(JsonValue::Object(map)) => map,
        Some(JsonValue::Array(mut items)) => match head.as_ref().parse::<usize>() {
            Ok(index) => {
                if index >= items.len() {
                    items.resize(index + 1, JsonValue::Null);
                }
                let child = std::mem::take(&mut items[index]);
                items[index] = write_nested(Some(child), rest, value);
                return JsonValue::Array(items);
            }
            Err(_) => Map::new(),
        },
        _ => Map::new(),
    };
    let child = map.remove(head.as_ref());
    map.insert(head.as_ref().to_string(), write_nested(child, rest, value));
    JsonValue::Object(map)
}

/// Deep-converts a plain object into a [`Store`] with the default schema.
///
/// The object's entries go through the new store's own permission-checked
/// [`Store::write_entries`], which converts nested objects in turn. Arrays,
/// primitives, producers and stores pass through unchanged, so converting an
/// already converted value is a no-op.
pub fn materialize_as_store(value: StoreValue) -> StoreResult<StoreValue> {
    materialize_with_schema(value, Rc::new(StoreSchema::default()))
}

/// Like [`materialize_as_store`], with `schema` governing the new store.
pub fn materialize_with_schema(
    value: StoreValue,
    schema: Rc<StoreSchema>,
) -> StoreResult<StoreValue> {
    match value {
        StoreValue::Json(JsonValue::Object(map)) => {
            log::debug!(
                "Materializing object with {} key(s) as '{}' store",
                map.len(),
                schema.name()
            );
            let store = Store::with_schema(schema);
            store.write_entries(map)?;
            Ok(StoreValue::Store(store))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;
    use serde_json::json;

    fn sample() -> JsonValue {
        json!({ "a": true, "b": { "c": true, "d": true } })
    }

    #[test]
    fn splits_and_joins() {
        assert_eq!(path_to_keys("a:b:c"), vec!["a", "b", "c"]);
        assert_eq!(keys_to_path(&["a", "b", "c"]), "a:b:c");
    }

    #[test]
    fn empty_segments_are_literal() {
        assert_eq!(path_to_keys(""), vec![""]);
        assert_eq!(path_to_keys("a::b"), vec!["a", "", "b"]);
        assert_eq!(path_to_keys(":a:"), vec!["", "a", ""]);
        for path in ["", "a::b", ":a:", " a : b "] {
            assert_eq!(keys_to_path(&path_to_keys(path)), path);
        }
    }

    #[test]
    fn split_head_keeps_rest_verbatim() {
        assert_eq!(split_head("a"), ("a", None));
        assert_eq!(split_head("a:b:c"), ("a", Some("b:c")));
        assert_eq!(split_head("a:"), ("a", Some("")));
        assert_eq!(split_head(":x"), ("", Some("x")));
    }

    #[test]
    fn lookup_descends_objects_and_arrays() {
        let value = json!({ "list": [10, { "name": "n" }], "b": { "c": false } });
        assert_eq!(lookup_nested(Some(&value), &["b", "c"]), Some(&json!(false)));
        assert_eq!(lookup_nested(Some(&value), &["list", "1", "name"]), Some(&json!("n")));
        assert_eq!(lookup_nested(Some(&value), &["list", "7"]), None);
        assert_eq!(lookup_nested(Some(&value), &["list", "x"]), None);
    }

    #[test]
    fn lookup_short_circuits_on_missing_containers() {
        let value = json!({ "a": null, "n": 3 });
        assert_eq!(lookup_nested(None, &["a"]), None);
        assert_eq!(lookup_nested(Some(&value), &["a", "b"]), None);
        assert_eq!(lookup_nested(Some(&value), &["n", "b"]), None);
        assert_eq!(lookup_nested(Some(&value), &["missing", "b"]), None);
        assert_eq!(lookup_nested(Some(&value), &["a"]), Some(&JsonValue::Null));
    }

    #[test]
    fn write_changes_existing_object() {
        let written = write_nested(Some(sample()), &["b", "c"], json!(false));
        assert_eq!(written, json!({ "a": true, "b": { "c": false, "d": true } }));
    }

    #[test]
    fn write_creates_object() {
        let written = write_nested(None, &["b", "c"], json!(false));
        assert_eq!(written, json!({ "b": { "c": false } }));
    }

    #[test]
    fn write_creates_nested_key() {
        let written = write_nested(Some(sample()), &["b", "e"], json!(false));
        assert_eq!(
            written,
            json!({ "a": true, "b": { "c": true, "d": true, "e": false } })
        );
    }

    #[test]
    fn write_replaces_primitive_containers() {
        let written = write_nested(Some(sample()), &["a", "x"], json!(1));
        assert_eq!(written, json!({ "a": { "x": 1 }, "b": { "c": true, "d": true } }));
    }

    #[test]
    fn write_indexes_into_arrays() {
        let list = json!({ "list": [1, 2] });

        let written = write_nested(Some(list.clone()), &["list", "0"], json!(3));
        assert_eq!(written, json!({ "list": [3, 2] }));

        let padded = write_nested(Some(list.clone()), &["list", "5"], json!(9));
        assert_eq!(padded, json!({ "list": [1, 2, null, null, null, 9] }));
        assert_eq!(lookup_nested(Some(&padded), &["list", "5"]), Some(&json!(9)));
        assert_eq!(lookup_nested(Some(&padded), &["list", "1"]), Some(&json!(2)));

        let deeper = write_nested(Some(list), &["list", "1", "k"], json!(true));
        assert_eq!(deeper, json!({ "list": [1, { "k": true }] }));
    }

    #[test]
    fn write_then_lookup_leaves_other_paths_alone() {
        let keys = ["q", "r", "s"];
        let written = write_nested(Some(sample()), &keys, json!("v"));
        assert_eq!(lookup_nested(Some(&written), &keys), Some(&json!("v")));
        assert_eq!(lookup_nested(Some(&written), &["a"]), Some(&json!(true)));
        assert_eq!(lookup_nested(Some(&written), &["b", "d"]), Some(&json!(true)));
    }

    #[test]
    fn write_with_no_keys_returns_value() {
        let keys: [&str; 0] = [];
        assert_eq!(write_nested(Some(sample()), &keys, json!(5)), json!(5));
    }

    #[test]
    fn materialize_converts_objects_recursively() {
        let value = materialize_as_store(json!({ "a": 1, "b": { "c": [1, 2] } }).into()).unwrap();
        let store = value.as_store().unwrap();
        let inner = store.get("b").unwrap().unwrap();
        let inner = inner.as_store().unwrap();
        assert_eq!(inner.get("c").unwrap(), Some(StoreValue::Json(json!([1, 2]))));
    }

    #[test]
    fn materialize_passes_other_values_through() {
        let array: StoreValue = json!([{ "x": 1 }]).into();
        assert_eq!(materialize_as_store(array.clone()).unwrap(), array);

        let store: StoreValue = Store::new().into();
        assert_eq!(materialize_as_store(store.clone()).unwrap(), store);
    }

    #[test]
    fn materialize_respects_schema_permissions() {
        let schema = Rc::new(StoreSchema::new("Frozen").restrict("id", Permission::Read));
        let result = materialize_with_schema(json!({ "id": 1 }).into(), schema);
        assert!(result.unwrap_err().is_permission_denied());
    }
}
