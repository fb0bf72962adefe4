//! WeakMap and WeakSet
//!
//! Entries are keyed by heap identity and hold only a weak handle to the key's
//! object, so a key that is dropped elsewhere stops matching. Contents cannot
//! be enumerated.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::object::JsObject;
use crate::value::{HeapRef, Value};

struct WeakEntry {
    key: Weak<JsObject>,
    value: Value,
}

impl WeakEntry {
    fn is_live(&self) -> bool {
        self.key.strong_count() > 0
    }
}

/// A JavaScript WeakMap
pub struct JsWeakMap {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    entries: RwLock<FxHashMap<usize, WeakEntry>>,
}

impl JsWeakMap {
    /// Create an empty WeakMap
    pub fn new(object: Arc<JsObject>) -> Self {
        Self {
            object,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// `set(key, value)`
    pub fn set(&self, key: &HeapRef, value: Value) {
        let mut entries = self.entries.write();
        entries.retain(|_, e| e.is_live());
        entries.insert(
            key.identity(),
            WeakEntry {
                key: Arc::downgrade(key.object()),
                value,
            },
        );
    }

    /// `get(key)`
    pub fn get(&self, key: &HeapRef) -> Option<Value> {
        self.entries
            .read()
            .get(&key.identity())
            .filter(|e| e.is_live())
            .map(|e| e.value.clone())
    }

    /// `has(key)`
    pub fn has(&self, key: &HeapRef) -> bool {
        self.get(key).is_some()
    }

    /// `delete(key)`
    pub fn delete(&self, key: &HeapRef) -> bool {
        self.entries.write().remove(&key.identity()).is_some()
    }
}

impl fmt::Debug for JsWeakMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakMap { <items unknown> }")
    }
}

/// A JavaScript WeakSet
pub struct JsWeakSet {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    entries: RwLock<FxHashMap<usize, Weak<JsObject>>>,
}

impl JsWeakSet {
    /// Create an empty WeakSet
    pub fn new(object: Arc<JsObject>) -> Self {
        Self {
            object,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// `add(value)`
    pub fn add(&self, value: &HeapRef) {
        let mut entries = self.entries.write();
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.insert(value.identity(), Arc::downgrade(value.object()));
    }

    /// `has(value)`
    pub fn has(&self, value: &HeapRef) -> bool {
        self.entries
            .read()
            .get(&value.identity())
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// `delete(value)`
    pub fn delete(&self, value: &HeapRef) -> bool {
        self.entries.write().remove(&value.identity()).is_some()
    }
}

impl fmt::Debug for JsWeakSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakSet { <items unknown> }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap_object() -> HeapRef {
        HeapRef::Object(Arc::new(JsObject::new(None)))
    }

    #[test]
    fn test_weak_map_get_set() {
        let map = JsWeakMap::new(Arc::new(JsObject::new(None)));
        let key = heap_object();
        map.set(&key, Value::int32(7));

        assert_eq!(map.get(&key), Some(Value::int32(7)));
        assert!(!map.has(&heap_object()));
        assert!(map.delete(&key));
        assert!(!map.has(&key));
    }

    #[test]
    fn test_dropped_key_stops_matching() {
        let map = JsWeakMap::new(Arc::new(JsObject::new(None)));
        let key = heap_object();
        let identity = key.identity();
        map.set(&key, Value::int32(1));
        drop(key);

        let entries = map.entries.read();
        assert!(!entries.get(&identity).is_some_and(WeakEntry::is_live));
    }

    #[test]
    fn test_weak_set() {
        let set = JsWeakSet::new(Arc::new(JsObject::new(None)));
        let member = heap_object();
        set.add(&member);

        assert!(set.has(&member));
        assert!(!set.has(&heap_object()));
        assert!(set.delete(&member));
        assert!(!set.has(&member));
    }
}
