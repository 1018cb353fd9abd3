//! Assertions over heap graphs.

use graft::{Heap, Key, ObjectId, Value};

/// The record referenced by `value`, panicking with context otherwise.
pub fn expect_ref(heap: &Heap, value: &Value) -> ObjectId {
    value
        .as_object()
        .unwrap_or_else(|| panic!("Expected an object reference, got {}", heap.describe(value)))
}

/// The record referenced by slot `field` of `id`.
pub fn field_ref(heap: &Heap, id: ObjectId, field: &str) -> ObjectId {
    let value = heap
        .field(id, field)
        .unwrap_or_else(|| panic!("Expected {} to have field `{}`", id, field));
    expect_ref(heap, value)
}

/// Assert slot `field` of `id` holds `expected`.
pub fn assert_field(heap: &Heap, id: ObjectId, field: &str, expected: impl Into<Value>) {
    let expected = expected.into();
    assert_eq!(
        heap.field(id, field),
        Some(&expected),
        "Expected `{}` of {} to be {}",
        field,
        heap.describe(&Value::Ref(id)),
        expected
    );
}

pub fn assert_type(heap: &Heap, id: ObjectId, expected: &str) {
    assert_eq!(
        heap.type_of(id).map(|t| t.as_str()),
        Some(expected),
        "Expected {} to be a `{}`",
        heap.describe(&Value::Ref(id)),
        expected
    );
}

/// The elements of the list held in slot `field` of `id`.
pub fn list_items(heap: &Heap, id: ObjectId, field: &str) -> Vec<Value> {
    let list = field_ref(heap, id, field);
    heap.list(list)
        .unwrap_or_else(|| panic!("Expected `{}` of {} to hold a list", field, id))
        .clone()
}

/// The list elements as object handles.
pub fn list_refs(heap: &Heap, id: ObjectId, field: &str) -> Vec<ObjectId> {
    list_items(heap, id, field)
        .iter()
        .map(|value| expect_ref(heap, value))
        .collect()
}

/// The entry `key` of the map held in slot `field` of `id`.
pub fn map_entry(heap: &Heap, id: ObjectId, field: &str, key: &str) -> Option<Value> {
    let map = field_ref(heap, id, field);
    heap.map(map)
        .unwrap_or_else(|| panic!("Expected `{}` of {} to hold a map", field, id))
        .get(&Key::from(key))
        .cloned()
}

/// The keys of the map held in slot `field` of `id`, in order.
pub fn map_keys(heap: &Heap, id: ObjectId, field: &str) -> Vec<Key> {
    let map = field_ref(heap, id, field);
    heap.map(map)
        .unwrap_or_else(|| panic!("Expected `{}` of {} to hold a map", field, id))
        .keys()
        .cloned()
        .collect()
}

/// String keys, for comparing against [`map_keys`].
pub fn keys(names: &[&str]) -> Vec<Key> {
    names.iter().map(|name| Key::from(*name)).collect()
}
