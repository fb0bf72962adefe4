//! Arrays
//!
//! Elements are stored densely as `Option<Value>`: `None` is a hole, which is
//! not the same thing as a slot holding `undefined`.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::object::JsObject;
use crate::value::Value;

/// A JavaScript array
#[derive(Debug)]
pub struct JsArray {
    /// The object portion (prototype, named properties)
    pub object: Arc<JsObject>,
    elements: RwLock<Vec<Option<Value>>>,
}

impl JsArray {
    /// Create an array of `length` holes
    pub fn new(object: Arc<JsObject>, length: usize) -> Self {
        Self {
            object,
            elements: RwLock::new(vec![None; length]),
        }
    }

    /// Create a dense array from values
    pub fn from_values(object: Arc<JsObject>, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            object,
            elements: RwLock::new(values.into_iter().map(Some).collect()),
        }
    }

    /// `length`
    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    /// Whether `length` is zero
    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    /// Element at `index`, `None` for holes and out-of-range indices
    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned().flatten()
    }

    /// Own-property check for an index (false for holes)
    pub fn has_index(&self, index: usize) -> bool {
        matches!(self.elements.read().get(index), Some(Some(_)))
    }

    /// Store `value` at `index`, growing the array with holes if needed
    pub fn set(&self, index: usize, value: Value) {
        let mut elements = self.elements.write();
        if index >= elements.len() {
            elements.resize(index + 1, None);
        }
        elements[index] = Some(value);
    }

    /// Append an element
    pub fn push(&self, value: Value) {
        self.elements.write().push(Some(value));
    }

    /// Turn an index into a hole. Returns `true` if the index was in range.
    pub fn delete(&self, index: usize) -> bool {
        let mut elements = self.elements.write();
        match elements.get_mut(index) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Truncate, or extend with holes
    pub fn set_length(&self, length: usize) {
        self.elements.write().resize(length, None);
    }

    /// Snapshot of every slot, holes included
    pub fn slots(&self) -> Vec<Option<Value>> {
        self.elements.read().clone()
    }

    /// Number of slots that are not holes
    pub fn present_count(&self) -> usize {
        self.elements.read().iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(length: usize) -> JsArray {
        JsArray::new(Arc::new(JsObject::new(None)), length)
    }

    #[test]
    fn test_holes_are_not_undefined() {
        let arr = array(3);
        arr.set(0, Value::int32(1));
        arr.set(2, Value::undefined());

        assert_eq!(arr.len(), 3);
        assert!(arr.has_index(0));
        assert!(!arr.has_index(1));
        assert!(arr.has_index(2));
        assert_eq!(arr.get(1), None);
        assert_eq!(arr.get(2), Some(Value::undefined()));
        assert_eq!(arr.present_count(), 2);
    }

    #[test]
    fn test_set_past_end_grows_with_holes() {
        let arr = array(0);
        arr.set(4, Value::int32(5));
        assert_eq!(arr.len(), 5);
        assert_eq!(arr.present_count(), 1);
    }

    #[test]
    fn test_delete_and_length() {
        let arr = JsArray::from_values(
            Arc::new(JsObject::new(None)),
            [Value::int32(1), Value::int32(2), Value::int32(3)],
        );
        assert!(arr.delete(1));
        assert!(!arr.delete(9));
        assert!(!arr.has_index(1));

        arr.set_length(1);
        assert_eq!(arr.slots(), vec![Some(Value::int32(1))]);
    }
}
