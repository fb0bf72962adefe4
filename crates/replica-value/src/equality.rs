//! Structural equality across value graphs.
//!
//! `deep_equals` compares two graphs kind by kind: dates by time value,
//! regexps by source and flags, binary views by bytes, maps and sets by their
//! ordered entries, records by prototype and own properties. Primitives use
//! SameValue and functions compare by identity. A pair of heap values already
//! under comparison is assumed equal, which makes cyclic graphs terminate.

use rustc_hash::FxHashSet;

use crate::object::{JsObject, PropertyDescriptor};
use crate::value::{HeapRef, Value};

/// Deep, type-appropriate equality
pub fn deep_equals(a: &Value, b: &Value) -> bool {
    DeepEq::default().values(a, b)
}

#[derive(Default)]
struct DeepEq {
    in_progress: FxHashSet<(usize, usize)>,
}

impl DeepEq {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Heap(x), Value::Heap(y)) => self.heap(x, y),
            (Value::Heap(_), _) | (_, Value::Heap(_)) => false,
            _ => a.same_value(b),
        }
    }

    fn optional(&mut self, a: &Option<Value>, b: &Option<Value>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => self.values(x, y),
            (None, None) => true,
            _ => false,
        }
    }

    fn heap(&mut self, a: &HeapRef, b: &HeapRef) -> bool {
        if a.ptr_eq(b) {
            return true;
        }
        if !self.in_progress.insert((a.identity(), b.identity())) {
            return true;
        }
        if !a.object().same_prototype(b.object()) {
            return false;
        }

        match (a, b) {
            (HeapRef::Object(x), HeapRef::Object(y)) => self.properties(x, y, false),
            (HeapRef::Array(x), HeapRef::Array(y)) => {
                let (xs, ys) = (x.slots(), y.slots());
                xs.len() == ys.len()
                    && xs.iter().zip(&ys).all(|(p, q)| self.optional(p, q))
            }
            // Same identity was handled above
            (HeapRef::Function(_), HeapRef::Function(_)) => false,
            (HeapRef::Date(x), HeapRef::Date(y)) => {
                Value::number(x.time_value()).same_value(&Value::number(y.time_value()))
            }
            (HeapRef::RegExp(x), HeapRef::RegExp(y)) => x.source == y.source && x.flags == y.flags,
            (HeapRef::Map(x), HeapRef::Map(y)) => {
                let (xs, ys) = (x.entries(), y.entries());
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(&ys)
                        .all(|((xk, xv), (yk, yv))| self.values(xk, yk) && self.values(xv, yv))
            }
            (HeapRef::Set(x), HeapRef::Set(y)) => {
                let (xs, ys) = (x.values(), y.values());
                xs.len() == ys.len() && xs.iter().zip(&ys).all(|(p, q)| self.values(p, q))
            }
            // Contents are opaque
            (HeapRef::WeakMap(_), HeapRef::WeakMap(_)) => true,
            (HeapRef::WeakSet(_), HeapRef::WeakSet(_)) => true,
            (HeapRef::ArrayBuffer(x), HeapRef::ArrayBuffer(y)) => x.to_bytes() == y.to_bytes(),
            (HeapRef::TypedArray(x), HeapRef::TypedArray(y)) => {
                x.kind() == y.kind() && x.length() == y.length() && x.view_bytes() == y.view_bytes()
            }
            (HeapRef::DataView(x), HeapRef::DataView(y)) => x.view_bytes() == y.view_bytes(),
            (HeapRef::Error(x), HeapRef::Error(y)) => {
                x.name == y.name
                    && x.message == y.message
                    && self.properties(&x.object, &y.object, true)
            }
            _ => false,
        }
    }

    fn properties(&mut self, a: &JsObject, b: &JsObject, enumerable_only: bool) -> bool {
        let keep = |(_, desc): &(_, PropertyDescriptor)| !enumerable_only || desc.is_enumerable();
        let xs: Vec<_> = a.own_properties().into_iter().filter(keep).collect();
        let ys: Vec<_> = b.own_properties().into_iter().filter(keep).collect();
        if xs.len() != ys.len() {
            return false;
        }

        xs.iter().zip(&ys).all(|((xk, xd), (yk, yd))| {
            if xk != yk || xd.attributes() != yd.attributes() {
                return false;
            }
            match (xd, yd) {
                (
                    PropertyDescriptor::Data { value: xv, .. },
                    PropertyDescriptor::Data { value: yv, .. },
                ) => self.values(xv, yv),
                (
                    PropertyDescriptor::Accessor { get: xg, set: xset, .. },
                    PropertyDescriptor::Accessor { get: yg, set: yset, .. },
                ) => xg == yg && xset == yset,
                _ => false,
            }
        })
    }
}
