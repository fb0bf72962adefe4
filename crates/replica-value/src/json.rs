//! Conversion between value graphs and JSON documents.
//!
//! `to_json` follows `JSON.stringify`: `undefined`, functions and symbols are
//! dropped from records and become `null` in arrays, non-finite numbers become
//! `null`, dates serialize through their ISO string, BigInts are rejected and
//! a cycle is an error. Shared (acyclic) references are serialized once per
//! occurrence.

use rustc_hash::FxHashSet;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::error::{ValueError, ValueResult};
use crate::intrinsics::Intrinsics;
use crate::object::{JsObject, PropertyDescriptor, PropertyKey};
use crate::value::{HeapRef, Value};

impl Intrinsics {
    /// Build a value graph from a JSON document
    pub fn value_from_json(&self, json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::null(),
            JsonValue::Bool(b) => Value::boolean(*b),
            JsonValue::Number(n) => Value::number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::string(s),
            JsonValue::Array(items) => self
                .array_from(items.iter().map(|item| self.value_from_json(item)))
                .into(),
            JsonValue::Object(fields) => {
                let obj = self.new_object();
                for (key, field) in fields {
                    obj.set(key.as_str(), self.value_from_json(field));
                }
                obj.into()
            }
        }
    }
}

/// Serialize a value graph to JSON.
///
/// Returns `Ok(None)` where `JSON.stringify` would return `undefined`
/// (a top-level `undefined`, function or symbol).
pub fn to_json(value: &Value) -> ValueResult<Option<JsonValue>> {
    Serializer::default().value(value, "root")
}

#[derive(Default)]
struct Serializer {
    stack: FxHashSet<usize>,
}

fn number(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        // also folds -0 into 0
        return JsonValue::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
}

impl Serializer {
    fn value(&mut self, value: &Value, path: &str) -> ValueResult<Option<JsonValue>> {
        let json = match value {
            Value::Undefined | Value::Symbol(_) => return Ok(None),
            Value::Null => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Number(n) => number(*n),
            Value::String(s) => JsonValue::String(s.to_string()),
            Value::BigInt(_) => {
                return Err(ValueError::type_error("Do not know how to serialize a BigInt"));
            }
            Value::Heap(HeapRef::Function(_)) => return Ok(None),
            Value::Heap(HeapRef::Date(d)) => {
                d.to_iso_string().map_or(JsonValue::Null, JsonValue::String)
            }
            Value::Heap(heap) => {
                let identity = heap.identity();
                if !self.stack.insert(identity) {
                    return Err(ValueError::CircularJson(path.to_string()));
                }
                let result = self.heap(heap, path);
                self.stack.remove(&identity);
                result?
            }
        };
        Ok(Some(json))
    }

    fn heap(&mut self, heap: &HeapRef, path: &str) -> ValueResult<JsonValue> {
        match heap {
            HeapRef::Array(arr) => {
                let mut items = Vec::with_capacity(arr.len());
                for (i, slot) in arr.slots().iter().enumerate() {
                    let item = match slot {
                        Some(v) => self.value(v, &format!("{}[{}]", path, i))?,
                        None => None,
                    };
                    items.push(item.unwrap_or(JsonValue::Null));
                }
                Ok(JsonValue::Array(items))
            }
            HeapRef::TypedArray(ta) => {
                let mut fields = JsonMap::new();
                for i in 0..ta.length() {
                    let n = ta.get(i).unwrap_or(f64::NAN);
                    fields.insert(i.to_string(), number(n));
                }
                Ok(JsonValue::Object(fields))
            }
            other => self.record(other.object(), path),
        }
    }

    fn record(&mut self, obj: &JsObject, path: &str) -> ValueResult<JsonValue> {
        let mut fields = JsonMap::new();
        for (key, desc) in obj.own_properties() {
            if key.is_symbol() || !desc.is_enumerable() {
                continue;
            }
            let value = match desc {
                PropertyDescriptor::Data { value, .. } => value,
                PropertyDescriptor::Accessor {
                    get: Some(getter), ..
                } => match getter.as_function() {
                    Some(f) => f.call(&[]).map_err(ValueError::TypeError)?,
                    None => continue,
                },
                PropertyDescriptor::Accessor { get: None, .. } => continue,
            };
            let name = match &key {
                PropertyKey::Index(i) => i.to_string(),
                other => other.to_string(),
            };
            if let Some(json) = self.value(&value, &format!("{}.{}", path, name))? {
                fields.insert(name, json);
            }
        }
        Ok(JsonValue::Object(fields))
    }
}
