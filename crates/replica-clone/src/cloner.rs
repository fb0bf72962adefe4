//! Deep clone over value graphs
//!
//! Key features:
//! - Handles circular references
//! - Preserves shared references within a clone operation
//! - Keeps prototypes, so user class instances stay instances of their class
//! - Copies binary buffers once, even when several views share them
//! - Lenient mode keeps functions by reference; strict mode rejects them with a path

use std::sync::Arc;

use replica_value::object::PropertyDescriptor;
use replica_value::{
    HeapRef, JsArray, JsArrayBuffer, JsDate, JsError, JsMap, JsObject, JsRegExp, JsSet, JsWeakMap,
    JsWeakSet, Value,
};
use rustc_hash::FxHashMap;

use crate::config::{CloneConfig, CloneMode};
use crate::error::{CloneError, CloneResult};
use crate::path::{ClonePath, PathSegment};

/// Performs the deep clone algorithm
#[derive(Debug)]
pub struct DeepCloner {
    /// Map from source identity to the source and its clone.
    ///
    /// Holding the source keeps its address from being reused while it is
    /// still a key.
    memory: FxHashMap<usize, (HeapRef, Value)>,
    mode: CloneMode,
    path: ClonePath,
}

impl Default for DeepCloner {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepCloner {
    /// Create a lenient cloner
    pub fn new() -> Self {
        Self::with_config(&CloneConfig::default())
    }

    /// Create a strict cloner
    pub fn strict() -> Self {
        Self::with_config(&CloneConfig::strict())
    }

    /// Create a cloner from settings
    pub fn with_config(config: &CloneConfig) -> Self {
        Self {
            memory: FxHashMap::with_capacity_and_hasher(
                config.visited_capacity,
                Default::default(),
            ),
            mode: config.mode,
            path: ClonePath::new(),
        }
    }

    /// Function handling mode
    pub fn mode(&self) -> CloneMode {
        self.mode
    }

    /// Number of heap values recorded in the visited-set
    pub fn visited_count(&self) -> usize {
        self.memory.len()
    }

    /// Clone `value` with a fresh visited-set
    pub fn run(&mut self, value: &Value) -> CloneResult<Value> {
        self.memory.clear();
        self.run_shared(value)
    }

    /// Clone `value`, keeping the visited-set of earlier calls.
    ///
    /// Several roots cloned through one cloner keep the references they
    /// have in common. Every visited source stays alive until the next
    /// [`run`](Self::run) or until the cloner is dropped.
    pub fn run_shared(&mut self, value: &Value) -> CloneResult<Value> {
        self.path.clear();

        #[cfg(feature = "clone_logging")]
        tracing::debug!(
            target: "replica::clone",
            mode = ?self.mode,
            kind = value.type_of(),
            "deep clone start"
        );

        let result = self.internal_clone(value);

        #[cfg(feature = "clone_logging")]
        tracing::debug!(
            target: "replica::clone",
            visited = self.memory.len(),
            ok = result.is_ok(),
            "deep clone end"
        );

        result
    }

    fn internal_clone(&mut self, value: &Value) -> CloneResult<Value> {
        match value {
            Value::Heap(heap) => self.clone_heap(heap),
            // Primitives are immutable; sharing them is a copy
            primitive => Ok(primitive.clone()),
        }
    }

    fn clone_heap(&mut self, heap: &HeapRef) -> CloneResult<Value> {
        if let Some((_, cloned)) = self.memory.get(&heap.identity()) {
            #[cfg(feature = "clone_logging")]
            tracing::trace!(
                target: "replica::clone",
                path = %self.path,
                kind = heap.class_name(),
                "visited-set hit"
            );
            return Ok(cloned.clone());
        }

        match heap {
            HeapRef::Object(obj) => self.clone_object(heap, obj),
            HeapRef::Array(arr) => self.clone_array(heap, arr),
            HeapRef::Map(map) => self.clone_map(heap, map),
            HeapRef::Set(set) => self.clone_set(heap, set),
            HeapRef::Error(err) => self.clone_error(heap, err),
            HeapRef::Date(date) => {
                let cloned = JsDate::new(sibling(&date.object), date.time_value());
                self.finish_leaf(heap, HeapRef::Date(Arc::new(cloned)))
            }
            HeapRef::RegExp(re) => {
                // lastIndex is per-use state and starts over
                let cloned =
                    JsRegExp::new(sibling(&re.object), re.source.clone(), re.flags.clone());
                self.finish_leaf(heap, HeapRef::RegExp(Arc::new(cloned)))
            }
            HeapRef::WeakMap(wm) => {
                // Entries cannot be enumerated
                let cloned = JsWeakMap::new(sibling(&wm.object));
                self.finish_leaf(heap, HeapRef::WeakMap(Arc::new(cloned)))
            }
            HeapRef::WeakSet(ws) => {
                let cloned = JsWeakSet::new(sibling(&ws.object));
                self.finish_leaf(heap, HeapRef::WeakSet(Arc::new(cloned)))
            }
            HeapRef::ArrayBuffer(ab) => {
                let (cloned, _) = self.copy_buffer(ab);
                self.copy_properties(&ab.object, &cloned.object, false)?;
                Ok(cloned.into())
            }
            HeapRef::TypedArray(ta) => {
                let (buffer, fresh) = self.copy_buffer(ta.buffer());
                let cloned = Arc::new(ta.rebind(sibling(&ta.object), buffer.clone()));
                self.finish_view(heap, HeapRef::TypedArray(cloned), ta.buffer(), &buffer, fresh)
            }
            HeapRef::DataView(dv) => {
                let (buffer, fresh) = self.copy_buffer(dv.buffer());
                let cloned = Arc::new(dv.rebind(sibling(&dv.object), buffer.clone()));
                self.finish_view(heap, HeapRef::DataView(cloned), dv.buffer(), &buffer, fresh)
            }
            // Functions never enter the visited-set
            HeapRef::Function(_) => self.keep_function(heap),
        }
    }

    fn keep_function(&self, heap: &HeapRef) -> CloneResult<Value> {
        match self.mode {
            CloneMode::Lenient => Ok(Value::Heap(heap.clone())),
            CloneMode::Strict => Err(self.non_copyable()),
        }
    }

    fn non_copyable(&self) -> CloneError {
        #[cfg(feature = "clone_logging")]
        tracing::debug!(
            target: "replica::clone",
            path = %self.path,
            "strict clone rejected a function"
        );

        CloneError::NonCopyable {
            path: self.path.clone(),
        }
    }

    /// Record `cloned` as the copy of `source`; must precede any recursion
    fn remember(&mut self, source: &HeapRef, cloned: Value) {
        self.memory.insert(source.identity(), (source.clone(), cloned));
    }

    /// Register a clone, then copy the own properties of its backing object
    fn finish_leaf(&mut self, source: &HeapRef, cloned: HeapRef) -> CloneResult<Value> {
        let cloned = Value::Heap(cloned);
        self.remember(source, cloned.clone());
        if let Some(target) = cloned.as_heap() {
            self.copy_properties(source.object(), target.object(), false)?;
        }
        Ok(cloned)
    }

    /// Register a view, then copy the properties of a freshly copied buffer
    /// and of the view itself
    fn finish_view(
        &mut self,
        source: &HeapRef,
        cloned: HeapRef,
        source_buffer: &JsArrayBuffer,
        buffer: &JsArrayBuffer,
        fresh_buffer: bool,
    ) -> CloneResult<Value> {
        let cloned = Value::Heap(cloned);
        self.remember(source, cloned.clone());

        if fresh_buffer {
            self.path.push(PathSegment::Key("buffer".into()));
            self.copy_properties(&source_buffer.object, &buffer.object, false)?;
            self.path.pop();
        }
        if let Some(target) = cloned.as_heap() {
            self.copy_properties(source.object(), target.object(), false)?;
        }
        Ok(cloned)
    }

    fn clone_object(&mut self, source: &HeapRef, obj: &Arc<JsObject>) -> CloneResult<Value> {
        let target = sibling(obj);
        let cloned = Value::from(target.clone());
        // Store before recursing
        self.remember(source, cloned.clone());
        self.copy_properties(obj, &target, false)?;
        Ok(cloned)
    }

    fn clone_array(&mut self, source: &HeapRef, arr: &Arc<JsArray>) -> CloneResult<Value> {
        let target = Arc::new(JsArray::new(sibling(&arr.object), arr.len()));
        let cloned = Value::from(target.clone());
        self.remember(source, cloned.clone());

        for (index, slot) in arr.slots().into_iter().enumerate() {
            // Holes stay holes
            let Some(element) = slot else { continue };
            self.path.push(PathSegment::Index(index));
            let element = self.internal_clone(&element)?;
            self.path.pop();
            target.set(index, element);
        }

        self.copy_properties(&arr.object, &target.object, false)?;
        Ok(cloned)
    }

    fn clone_map(&mut self, source: &HeapRef, map: &Arc<JsMap>) -> CloneResult<Value> {
        let target = Arc::new(JsMap::new(sibling(&map.object)));
        let cloned = Value::from(target.clone());
        self.remember(source, cloned.clone());

        for (index, (key, value)) in map.entries().into_iter().enumerate() {
            self.path.push(PathSegment::MapKey(index));
            let cloned_key = self.internal_clone(&key)?;
            self.path.pop();

            self.path.push(PathSegment::Key(key.to_display_string()));
            let cloned_value = self.internal_clone(&value)?;
            self.path.pop();

            target.set(cloned_key, cloned_value);
        }

        self.copy_properties(&map.object, &target.object, false)?;
        Ok(cloned)
    }

    fn clone_set(&mut self, source: &HeapRef, set: &Arc<JsSet>) -> CloneResult<Value> {
        let target = Arc::new(JsSet::new(sibling(&set.object)));
        let cloned = Value::from(target.clone());
        self.remember(source, cloned.clone());

        for (index, element) in set.values().into_iter().enumerate() {
            self.path.push(PathSegment::SetValue(index));
            let element = self.internal_clone(&element)?;
            self.path.pop();
            target.add(element);
        }

        self.copy_properties(&set.object, &target.object, false)?;
        Ok(cloned)
    }

    fn clone_error(&mut self, source: &HeapRef, err: &Arc<JsError>) -> CloneResult<Value> {
        let target = Arc::new(JsError::new(
            sibling(&err.object),
            err.name.clone(),
            err.message.clone(),
            err.stack.clone(),
        ));
        let cloned = Value::from(target.clone());
        self.remember(source, cloned.clone());
        self.copy_properties(&err.object, &target.object, true)?;
        Ok(cloned)
    }

    /// Copy a buffer's bytes once per clone and register the copy.
    ///
    /// Returns the copy and whether it was made by this call; the caller
    /// copies the buffer's properties for a fresh copy.
    fn copy_buffer(&mut self, ab: &Arc<JsArrayBuffer>) -> (Arc<JsArrayBuffer>, bool) {
        let source = HeapRef::ArrayBuffer(ab.clone());
        if let Some((_, Value::Heap(HeapRef::ArrayBuffer(cloned)))) =
            self.memory.get(&source.identity())
        {
            return (cloned.clone(), false);
        }

        let cloned = Arc::new(JsArrayBuffer::from_bytes(
            sibling(&ab.object),
            ab.to_bytes(),
        ));
        self.remember(&source, Value::from(cloned.clone()));
        (cloned, true)
    }

    /// Copy own properties from `source` onto `target`, keeping attributes
    fn copy_properties(
        &mut self,
        source: &JsObject,
        target: &JsObject,
        enumerable_only: bool,
    ) -> CloneResult<()> {
        for (key, desc) in source.own_properties() {
            if enumerable_only && !desc.is_enumerable() {
                continue;
            }

            self.path.push(PathSegment::Key(key.to_string()));
            let desc = match desc {
                PropertyDescriptor::Data { value, attributes } => PropertyDescriptor::Data {
                    value: self.internal_clone(&value)?,
                    attributes,
                },
                PropertyDescriptor::Accessor {
                    get,
                    set,
                    attributes,
                } => {
                    self.check_accessor(get.as_ref())?;
                    self.check_accessor(set.as_ref())?;
                    PropertyDescriptor::Accessor {
                        get,
                        set,
                        attributes,
                    }
                }
            };
            self.path.pop();

            target.define_property(key, desc);
        }
        Ok(())
    }

    /// Accessor functions are behavior, not data; strict mode refuses them
    fn check_accessor(&self, accessor: Option<&Value>) -> CloneResult<()> {
        match accessor {
            Some(f) if f.is_function() && self.mode == CloneMode::Strict => {
                Err(self.non_copyable())
            }
            _ => Ok(()),
        }
    }
}

/// Fresh backing object with the same prototype
fn sibling(object: &JsObject) -> Arc<JsObject> {
    Arc::new(JsObject::sibling_of(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_value::{Intrinsics, PropertyKey};

    #[test]
    fn test_clone_primitives() {
        let mut cloner = DeepCloner::new();

        assert!(cloner.run(&Value::undefined()).unwrap().is_undefined());
        assert!(cloner.run(&Value::null()).unwrap().is_null());
        assert_eq!(cloner.run(&Value::boolean(true)).unwrap().as_boolean(), Some(true));
        assert_eq!(cloner.run(&Value::number(42.5)).unwrap().as_number(), Some(42.5));
        assert_eq!(cloner.run(&Value::string("hello")).unwrap().as_str(), Some("hello"));
        assert_eq!(cloner.visited_count(), 0);
    }

    #[test]
    fn test_clone_object() {
        let intrinsics = Intrinsics::new();
        let obj = intrinsics.new_object();
        obj.set("x", Value::int32(42));
        obj.set("y", Value::string("hello"));

        let mut cloner = DeepCloner::new();
        let original = Value::from(obj.clone());
        let cloned = cloner.run(&original).unwrap();

        let cloned_obj = cloned.as_object().unwrap();
        assert!(!Arc::ptr_eq(&obj, cloned_obj));
        assert_eq!(cloned_obj.get(&PropertyKey::from("x")), Some(Value::int32(42)));
        assert_eq!(cloned_obj.get(&PropertyKey::from("y")), Some(Value::string("hello")));
    }

    #[test]
    fn test_clone_array() {
        let intrinsics = Intrinsics::new();
        let arr = intrinsics.array_from([Value::int32(1), Value::int32(2), Value::int32(3)]);

        let mut cloner = DeepCloner::new();
        let cloned = cloner.run(&Value::from(arr.clone())).unwrap();

        let cloned_arr = cloned.as_array().unwrap();
        assert!(!Arc::ptr_eq(&arr, cloned_arr));
        assert_eq!(cloned_arr.len(), 3);
        assert_eq!(cloned_arr.get(1), Some(Value::int32(2)));
    }

    #[test]
    fn test_circular_reference() {
        let intrinsics = Intrinsics::new();
        let obj = intrinsics.new_object();
        obj.set("self", Value::from(obj.clone()));

        let mut cloner = DeepCloner::new();
        let cloned = cloner.run(&Value::from(obj.clone())).unwrap();

        let cloned_obj = cloned.as_object().unwrap();
        let self_ref = cloned_obj.get(&PropertyKey::from("self")).unwrap();
        assert!(Arc::ptr_eq(cloned_obj, self_ref.as_object().unwrap()));
        assert!(!Arc::ptr_eq(&obj, cloned_obj));
        assert_eq!(cloner.visited_count(), 1);
    }

    #[test]
    fn test_strict_rejects_function() {
        let intrinsics = Intrinsics::new();
        let obj = intrinsics.new_object();
        obj.set("f", Value::from(intrinsics.new_function("f", |_| Ok(Value::undefined()))));

        let err = DeepCloner::strict().run(&Value::from(obj)).unwrap_err();
        assert_eq!(err.to_string(), "Non-copyable value found at path: root.f");
    }

    #[test]
    fn test_lenient_keeps_function() {
        let intrinsics = Intrinsics::new();
        let f = Value::from(intrinsics.new_function("f", |_| Ok(Value::int32(1))));
        let cloned = DeepCloner::new().run(&f).unwrap();
        assert!(cloned.ptr_eq(&f));
    }

    #[test]
    fn test_run_resets_memory() {
        let intrinsics = Intrinsics::new();
        let obj = Value::from(intrinsics.new_object());

        let mut cloner = DeepCloner::new();
        let first = cloner.run(&obj).unwrap();
        let second = cloner.run(&obj).unwrap();
        assert!(!first.ptr_eq(&second));

        let third = cloner.run_shared(&obj).unwrap();
        assert!(third.ptr_eq(&second));
    }

    #[test]
    fn test_shared_buffer_copied_once() {
        let intrinsics = Intrinsics::new();
        let buffer = intrinsics.new_array_buffer(8);
        let bytes = intrinsics
            .typed_array_over(buffer.clone(), replica_value::TypedArrayKind::Uint8, 0, 8)
            .unwrap();
        let words = intrinsics
            .typed_array_over(buffer, replica_value::TypedArrayKind::Uint32, 4, 1)
            .unwrap();

        let pair = intrinsics.array_from([Value::from(bytes), Value::from(words)]);
        let cloned = DeepCloner::new().run(&Value::from(pair)).unwrap();
        let cloned = cloned.as_array().unwrap();

        let a = cloned.get(0).unwrap();
        let b = cloned.get(1).unwrap();
        let a = a.as_typed_array().unwrap();
        let b = b.as_typed_array().unwrap();
        assert!(Arc::ptr_eq(a.buffer(), b.buffer()));

        b.set(0, 7.0);
        assert_eq!(a.get(4), Some(7.0));
    }
    #[test]
    fn test_run_shared_after_source_dropped() {
        let intrinsics = Intrinsics::new();
        let mut cloner = DeepCloner::new();

        for n in 0..200 {
            let obj = intrinsics.new_object();
            obj.set("n", Value::int32(n));
            let cloned = cloner.run_shared(&Value::from(obj)).unwrap();
            // A later object can never be served an earlier object's clone
            let field = cloned.as_object().unwrap().get(&PropertyKey::from("n"));
            assert_eq!(field, Some(Value::int32(n)));
        }
        assert_eq!(cloner.visited_count(), 200);
    }

    #[test]
    fn test_view_reached_through_buffer_property() {
        let intrinsics = Intrinsics::new();
        let ta = intrinsics
            .new_typed_array(replica_value::TypedArrayKind::Uint8, 4)
            .unwrap();
        let view = Value::from(ta.clone());
        ta.buffer().object.set("view", view.clone());

        let mut cloner = DeepCloner::new();
        let cloned = cloner.run(&view).unwrap();
        let cloned_ta = cloned.as_typed_array().unwrap();

        let back = cloned_ta.buffer().object.get(&PropertyKey::from("view")).unwrap();
        assert!(back.ptr_eq(&cloned));
        assert!(!Arc::ptr_eq(cloned_ta.buffer(), ta.buffer()));
        assert_eq!(cloner.visited_count(), 2);
    }
}
