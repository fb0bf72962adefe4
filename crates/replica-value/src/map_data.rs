//! Backing data structures for Map and Set (ES2023 §23.1, §23.2).
//!
//! Uses SameValueZero semantics via `MapKey`, insertion-ordered storage
//! with tombstone-based deletion for live iteration.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::object::JsObject;
use crate::value::Value;

// ============================================================================
// MapKey: Value wrapper with SameValueZero Hash/Eq for Map/Set keys
// ============================================================================

/// A wrapper around `Value` that implements `Hash` and `Eq` using SameValueZero
/// semantics as required by ES2023 Map and Set.
///
/// SameValueZero: NaN equals NaN, -0 equals +0, otherwise strict equality.
#[derive(Clone, Debug)]
pub struct MapKey(pub Value);

impl MapKey {
    /// Returns a reference to the underlying `Value`.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the `MapKey` and returns the underlying `Value`.
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Normalize a float for SameValueZero hashing: -0 → +0, NaN → canonical NaN bits.
fn normalize_float_bits(n: f64) -> u64 {
    if n == 0.0 {
        0u64
    } else if n.is_nan() {
        0x7FF8_0000_0000_0000u64
    } else {
        n.to_bits()
    }
}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let v = &self.0;
        std::mem::discriminant(v).hash(state);
        match v {
            Value::Undefined | Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Number(n) => normalize_float_bits(*n).hash(state),
            Value::String(s) => s.hash(state),
            Value::Symbol(sym) => sym.id.hash(state),
            Value::BigInt(b) => b.hash(state),
            Value::Heap(h) => h.identity().hash(state),
        }
    }
}

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        same_value_zero(&self.0, &other.0)
    }
}

impl Eq for MapKey {}

/// SameValueZero comparison
pub fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => a == b,
    }
}

// ============================================================================
// MapData
// ============================================================================

/// Internal storage for a JavaScript `Map`.
///
/// Entries are stored in a `Vec` in insertion order. Deleted entries become
/// `None` (tombstones) so that live iterators correctly skip them and still
/// see entries appended after iterator creation.
///
/// A separate hash map provides O(1) key→index lookup.
#[derive(Debug, Default)]
pub struct MapData {
    inner: RwLock<MapDataInner>,
}

#[derive(Debug, Default)]
struct MapDataInner {
    /// Insertion-ordered entries. `None` = tombstone (deleted).
    entries: Vec<Option<(MapKey, Value)>>,
    /// Key → index in `entries` for O(1) lookup.
    index: FxHashMap<MapKey, usize>,
    /// Count of live (non-None) entries.
    size: usize,
}

impl MapData {
    /// Create an empty MapData.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Get the value associated with `key`, or `None`.
    pub fn get(&self, key: &MapKey) -> Option<Value> {
        let inner = self.inner.read();
        let idx = *inner.index.get(key)?;
        match inner.entries.get(idx) {
            Some(Some((_, v))) => Some(v.clone()),
            _ => None,
        }
    }

    /// Returns `true` if `key` exists.
    pub fn has(&self, key: &MapKey) -> bool {
        self.inner.read().index.contains_key(key)
    }

    /// Insert or update `key` → `value`. Returns `true` if this was an update.
    pub fn set(&self, key: MapKey, value: Value) -> bool {
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.index.get(&key) {
            // Update in place, keeping the original key and insertion order
            if let Some(Some((_, v))) = inner.entries.get_mut(idx) {
                *v = value;
            }
            true
        } else {
            let idx = inner.entries.len();
            inner.index.insert(key.clone(), idx);
            inner.entries.push(Some((key, value)));
            inner.size += 1;
            false
        }
    }

    /// Delete `key`. Returns `true` if it existed.
    pub fn delete(&self, key: &MapKey) -> bool {
        let mut inner = self.inner.write();
        if let Some(idx) = inner.index.remove(key) {
            inner.entries[idx] = None; // tombstone
            inner.size -= 1;
            true
        } else {
            false
        }
    }

    /// Remove all entries (iterators in progress will see "done").
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        for entry in inner.entries.iter_mut() {
            *entry = None;
        }
        inner.index.clear();
        inner.size = 0;
    }

    /// Read entry at `position` for iterator advancement.
    /// Returns `(key, value)` at that index, or `None` if tombstone/out-of-bounds.
    pub fn entry_at(&self, position: usize) -> Option<(Value, Value)> {
        let inner = self.inner.read();
        match inner.entries.get(position) {
            Some(Some((k, v))) => Some((k.value().clone(), v.clone())),
            _ => None,
        }
    }

    /// Current length of the entries vector (including tombstones).
    pub fn entries_len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Collect all live entries in insertion order.
    /// The lock is released before returning, enabling re-entrant operations.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        let inner = self.inner.read();
        let mut result = Vec::with_capacity(inner.size);
        for (k, v) in inner.entries.iter().flatten() {
            result.push((k.value().clone(), v.clone()));
        }
        result
    }
}

// ============================================================================
// SetData
// ============================================================================

/// Internal storage for a JavaScript `Set`.
///
/// Same tombstone-based design as `MapData`, but stores only keys (no values).
#[derive(Debug, Default)]
pub struct SetData {
    inner: RwLock<SetDataInner>,
}

#[derive(Debug, Default)]
struct SetDataInner {
    entries: Vec<Option<MapKey>>,
    index: FxHashMap<MapKey, usize>,
    size: usize,
}

impl SetData {
    /// Create an empty SetData.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn size(&self) -> usize {
        self.inner.read().size
    }

    /// Returns `true` if `key` exists.
    pub fn has(&self, key: &MapKey) -> bool {
        self.inner.read().index.contains_key(key)
    }

    /// Add a value. Returns `true` if already present (no-op).
    pub fn add(&self, key: MapKey) -> bool {
        let mut inner = self.inner.write();
        if inner.index.contains_key(&key) {
            return true;
        }
        let idx = inner.entries.len();
        inner.index.insert(key.clone(), idx);
        inner.entries.push(Some(key));
        inner.size += 1;
        false
    }

    /// Delete `key`. Returns `true` if it existed.
    pub fn delete(&self, key: &MapKey) -> bool {
        let mut inner = self.inner.write();
        if let Some(idx) = inner.index.remove(key) {
            inner.entries[idx] = None;
            inner.size -= 1;
            true
        } else {
            false
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        for entry in inner.entries.iter_mut() {
            *entry = None;
        }
        inner.index.clear();
        inner.size = 0;
    }

    /// Collect all live entries in insertion order.
    pub fn values(&self) -> Vec<Value> {
        let inner = self.inner.read();
        let mut result = Vec::with_capacity(inner.size);
        for k in inner.entries.iter().flatten() {
            result.push(k.value().clone());
        }
        result
    }
}

// ============================================================================
// JsMap / JsSet
// ============================================================================

/// A JavaScript Map
#[derive(Debug)]
pub struct JsMap {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    data: MapData,
}

impl JsMap {
    /// Create an empty map
    pub fn new(object: Arc<JsObject>) -> Self {
        Self {
            object,
            data: MapData::new(),
        }
    }

    /// `size`
    pub fn size(&self) -> usize {
        self.data.size()
    }

    /// `get(key)`
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.data.get(&MapKey(key.clone()))
    }

    /// `has(key)`
    pub fn has(&self, key: &Value) -> bool {
        self.data.has(&MapKey(key.clone()))
    }

    /// `set(key, value)`
    pub fn set(&self, key: Value, value: Value) {
        self.data.set(MapKey(key), value);
    }

    /// `delete(key)`
    pub fn delete(&self, key: &Value) -> bool {
        self.data.delete(&MapKey(key.clone()))
    }

    /// `clear()`
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Live entries in insertion order
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.data.entries()
    }

    /// Backing storage
    pub fn data(&self) -> &MapData {
        &self.data
    }
}

/// A JavaScript Set
#[derive(Debug)]
pub struct JsSet {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    data: SetData,
}

impl JsSet {
    /// Create an empty set
    pub fn new(object: Arc<JsObject>) -> Self {
        Self {
            object,
            data: SetData::new(),
        }
    }

    /// `size`
    pub fn size(&self) -> usize {
        self.data.size()
    }

    /// `has(value)`
    pub fn has(&self, value: &Value) -> bool {
        self.data.has(&MapKey(value.clone()))
    }

    /// `add(value)`
    pub fn add(&self, value: Value) {
        self.data.add(MapKey(value));
    }

    /// `delete(value)`
    pub fn delete(&self, value: &Value) -> bool {
        self.data.delete(&MapKey(value.clone()))
    }

    /// `clear()`
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Live values in insertion order
    pub fn values(&self) -> Vec<Value> {
        self.data.values()
    }
}
