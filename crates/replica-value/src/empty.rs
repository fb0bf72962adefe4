//! Emptiness predicate

use crate::value::{HeapRef, Value};

/// Whether a value counts as "empty".
///
/// `undefined`, `null`, `""`, zero-length arrays, empty maps and sets, and
/// plain records without own enumerable keys are empty. Everything else,
/// including `0`, `false`, functions and dates, is not.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Heap(HeapRef::Array(arr)) => arr.is_empty(),
        Value::Heap(HeapRef::Map(map)) => map.size() == 0,
        Value::Heap(HeapRef::Set(set)) => set.size() == 0,
        Value::Heap(HeapRef::Object(obj)) => obj.own_enumerable_keys().is_empty(),
        _ => false,
    }
}
