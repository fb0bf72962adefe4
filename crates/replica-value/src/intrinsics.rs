//! Intrinsics registry for built-in prototypes.
//!
//! This module provides the `Intrinsics` struct which holds references to the
//! prototype objects every built-in kind inherits from, and the factory
//! methods that build values wired to those prototypes.
//!
//! Initialization follows a two-stage pattern:
//! 1. **Stage 1**: Allocate `Object.prototype` and `Function.prototype`
//! 2. **Stage 2**: Allocate every other prototype on top of them

use std::sync::Arc;

use crate::array::JsArray;
use crate::array_buffer::JsArrayBuffer;
use crate::data_view::JsDataView;
use crate::date::{JsDate, parse_date};
use crate::error::{ValueError, ValueResult};
use crate::error_object::{ErrorKind, JsError};
use crate::function::JsFunction;
use crate::map_data::{JsMap, JsSet};
use crate::object::{JsObject, PropertyAttributes, PropertyDescriptor};
use crate::regexp::JsRegExp;
use crate::typed_array::{JsTypedArray, TypedArrayKind};
use crate::value::Value;
use crate::weak::{JsWeakMap, JsWeakSet};

/// Registry of built-in prototypes.
///
/// Cloning an `Intrinsics` shares the same prototype objects.
#[derive(Clone, Debug)]
pub struct Intrinsics {
    // ========================================================================
    // Core prototypes
    // ========================================================================
    /// `Object.prototype`, whose `[[Prototype]]` is `null`
    pub object_prototype: Arc<JsObject>,
    /// `Function.prototype`
    pub function_prototype: Arc<JsObject>,

    // ========================================================================
    // Collection prototypes
    // ========================================================================
    /// `Array.prototype`
    pub array_prototype: Arc<JsObject>,
    /// `Map.prototype`
    pub map_prototype: Arc<JsObject>,
    /// `Set.prototype`
    pub set_prototype: Arc<JsObject>,
    /// `WeakMap.prototype`
    pub weak_map_prototype: Arc<JsObject>,
    /// `WeakSet.prototype`
    pub weak_set_prototype: Arc<JsObject>,

    // ========================================================================
    // Error prototypes, indexed by `ErrorKind::index`
    // ========================================================================
    error_prototypes: Vec<Arc<JsObject>>,

    // ========================================================================
    // Other built-in prototypes
    // ========================================================================
    /// `RegExp.prototype`
    pub regexp_prototype: Arc<JsObject>,
    /// `Date.prototype`
    pub date_prototype: Arc<JsObject>,
    /// `ArrayBuffer.prototype`
    pub array_buffer_prototype: Arc<JsObject>,
    /// `DataView.prototype`
    pub data_view_prototype: Arc<JsObject>,
    /// `%TypedArray%.prototype`
    pub typed_array_prototype: Arc<JsObject>,
    typed_array_prototypes: Vec<Arc<JsObject>>,
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self::new()
    }
}

fn proto(parent: &Arc<JsObject>) -> Arc<JsObject> {
    Arc::new(JsObject::new(Some(parent.clone())))
}

impl Intrinsics {
    /// Build a fresh set of prototypes
    pub fn new() -> Self {
        // Stage 1
        let object_prototype = Arc::new(JsObject::new(None));
        let function_prototype = proto(&object_prototype);

        // Stage 2
        let error_prototypes: Vec<Arc<JsObject>> = {
            let base = proto(&object_prototype);
            let mut protos = vec![base.clone()];
            protos.extend(ErrorKind::ALL[1..].iter().map(|_| proto(&base)));
            for (kind, p) in ErrorKind::ALL.iter().zip(&protos) {
                p.define_property(
                    "name",
                    PropertyDescriptor::data_with_attrs(
                        Value::string(kind.name()),
                        PropertyAttributes::hidden(),
                    ),
                );
                p.define_property(
                    "message",
                    PropertyDescriptor::data_with_attrs(
                        Value::string(""),
                        PropertyAttributes::hidden(),
                    ),
                );
            }
            protos
        };

        let typed_array_prototype = proto(&object_prototype);
        let typed_array_prototypes = TypedArrayKind::ALL
            .iter()
            .map(|_| proto(&typed_array_prototype))
            .collect();

        Self {
            function_prototype,
            array_prototype: proto(&object_prototype),
            map_prototype: proto(&object_prototype),
            set_prototype: proto(&object_prototype),
            weak_map_prototype: proto(&object_prototype),
            weak_set_prototype: proto(&object_prototype),
            error_prototypes,
            regexp_prototype: proto(&object_prototype),
            date_prototype: proto(&object_prototype),
            array_buffer_prototype: proto(&object_prototype),
            data_view_prototype: proto(&object_prototype),
            typed_array_prototype,
            typed_array_prototypes,
            object_prototype,
        }
    }

    /// Prototype for a native error kind
    pub fn error_prototype(&self, kind: ErrorKind) -> &Arc<JsObject> {
        &self.error_prototypes[kind.index()]
    }

    /// Prototype for a typed array kind
    pub fn typed_array_prototype_for(&self, kind: TypedArrayKind) -> &Arc<JsObject> {
        &self.typed_array_prototypes[kind.index()]
    }

    fn instance(&self, prototype: &Arc<JsObject>) -> Arc<JsObject> {
        proto(prototype)
    }

    // ========================================================================
    // Factories
    // ========================================================================

    /// `{}`
    pub fn new_object(&self) -> Arc<JsObject> {
        self.instance(&self.object_prototype)
    }

    /// `Object.create(prototype)`
    pub fn new_object_with_prototype(&self, prototype: Option<Arc<JsObject>>) -> Arc<JsObject> {
        Arc::new(JsObject::new(prototype))
    }

    /// A prototype object for a user-defined class.
    ///
    /// Inherits from `parent` (or `Object.prototype`) and carries a hidden
    /// `constructor` function named `name`.
    pub fn new_class_prototype(&self, name: &str, parent: Option<&Arc<JsObject>>) -> Arc<JsObject> {
        let prototype = self.instance(parent.unwrap_or(&self.object_prototype));
        let constructor = self.new_function(name, |_| Ok(Value::undefined()));
        prototype.define_property(
            "constructor",
            PropertyDescriptor::data_with_attrs(constructor.into(), PropertyAttributes::hidden()),
        );
        prototype
    }

    /// `new Array(length)`, all holes
    pub fn new_array(&self, length: usize) -> Arc<JsArray> {
        Arc::new(JsArray::new(self.instance(&self.array_prototype), length))
    }

    /// Array literal
    pub fn array_from(&self, values: impl IntoIterator<Item = Value>) -> Arc<JsArray> {
        Arc::new(JsArray::from_values(
            self.instance(&self.array_prototype),
            values,
        ))
    }

    /// A native function
    pub fn new_function<F>(&self, name: &str, f: F) -> Arc<JsFunction>
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Arc::new(JsFunction::new(
            self.instance(&self.function_prototype),
            name,
            f,
        ))
    }

    /// `new Date(time)`
    pub fn new_date(&self, time: f64) -> Arc<JsDate> {
        Arc::new(JsDate::new(self.instance(&self.date_prototype), time))
    }

    /// `new Date(string)`, rejecting strings that do not parse
    pub fn parse_date(&self, input: &str) -> ValueResult<Arc<JsDate>> {
        let time = parse_date(input).ok_or_else(|| ValueError::InvalidDate(input.to_string()))?;
        Ok(self.new_date(time))
    }

    /// `new RegExp(source, flags)`
    pub fn new_regexp(&self, source: &str, flags: &str) -> Arc<JsRegExp> {
        Arc::new(JsRegExp::new(
            self.instance(&self.regexp_prototype),
            source,
            flags,
        ))
    }

    /// `new Map()`
    pub fn new_map(&self) -> Arc<JsMap> {
        Arc::new(JsMap::new(self.instance(&self.map_prototype)))
    }

    /// `new Set()`
    pub fn new_set(&self) -> Arc<JsSet> {
        Arc::new(JsSet::new(self.instance(&self.set_prototype)))
    }

    /// `new WeakMap()`
    pub fn new_weak_map(&self) -> Arc<JsWeakMap> {
        Arc::new(JsWeakMap::new(self.instance(&self.weak_map_prototype)))
    }

    /// `new WeakSet()`
    pub fn new_weak_set(&self) -> Arc<JsWeakSet> {
        Arc::new(JsWeakSet::new(self.instance(&self.weak_set_prototype)))
    }

    /// `new ArrayBuffer(byte_length)`
    pub fn new_array_buffer(&self, byte_length: usize) -> Arc<JsArrayBuffer> {
        Arc::new(JsArrayBuffer::new(
            self.instance(&self.array_buffer_prototype),
            byte_length,
        ))
    }

    /// `new Uint8Array(length)` and friends, with a fresh buffer
    pub fn new_typed_array(
        &self,
        kind: TypedArrayKind,
        length: usize,
    ) -> ValueResult<Arc<JsTypedArray>> {
        let byte_length = length
            .checked_mul(kind.element_size())
            .ok_or_else(|| ValueError::range_error("Invalid typed array length"))?;
        let buffer = self.new_array_buffer(byte_length);
        self.typed_array_over(buffer, kind, 0, length)
    }

    /// `new Uint8Array(buffer, byte_offset, length)` and friends
    pub fn typed_array_over(
        &self,
        buffer: Arc<JsArrayBuffer>,
        kind: TypedArrayKind,
        byte_offset: usize,
        length: usize,
    ) -> ValueResult<Arc<JsTypedArray>> {
        let object = self.instance(self.typed_array_prototype_for(kind));
        JsTypedArray::new(object, buffer, kind, byte_offset, length).map(Arc::new)
    }

    /// `new DataView(buffer, byte_offset, byte_length)`
    pub fn new_data_view(
        &self,
        buffer: Arc<JsArrayBuffer>,
        byte_offset: usize,
        byte_length: Option<usize>,
    ) -> ValueResult<Arc<JsDataView>> {
        let object = self.instance(&self.data_view_prototype);
        JsDataView::new(object, buffer, byte_offset, byte_length).map(Arc::new)
    }

    /// `new TypeError(message)` and friends
    pub fn new_error(&self, kind: ErrorKind, message: &str) -> Arc<JsError> {
        Arc::new(JsError::with_captured_stack(
            self.instance(self.error_prototype(kind)),
            kind.name(),
            message,
        ))
    }

    /// An instance of a user-defined error subclass
    pub fn new_error_with_prototype(
        &self,
        prototype: &Arc<JsObject>,
        name: &str,
        message: &str,
    ) -> Arc<JsError> {
        Arc::new(JsError::with_captured_stack(
            self.instance(prototype),
            name,
            message,
        ))
    }
}
