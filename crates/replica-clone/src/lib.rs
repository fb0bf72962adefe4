//! # Replica Clone
//!
//! Deep cloning for `replica-value` graphs.
//!
//! - [`clone`] copies any value and never fails; functions are kept by reference
//! - [`clone_strict`] refuses functions and reports where it found the first one
//! - [`is_cloneable`] tells whether a value itself can be copied
//!
//! Cycles and shared references are preserved: every heap value reachable
//! from the root is copied once, and every reference to it in the source
//! points at that copy in the result.
//!
//! ```
//! use replica_value::{Intrinsics, PropertyKey, Value};
//!
//! let intrinsics = Intrinsics::new();
//! let obj = intrinsics.new_object();
//! obj.set("self", Value::from(obj.clone()));
//!
//! let copy = replica_clone::clone(&Value::from(obj.clone()));
//! let copy_obj = copy.as_object().unwrap();
//! let inner = copy_obj.get(&PropertyKey::from("self")).unwrap();
//! assert!(inner.ptr_eq(&copy));
//! assert!(!copy.ptr_eq(&Value::from(obj)));
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cloner;
pub mod config;
pub mod error;
pub mod path;

pub use cloner::DeepCloner;
pub use config::{CloneConfig, CloneMode};
pub use error::{CloneError, CloneResult};
pub use path::{ClonePath, PathSegment};

use replica_value::Value;

/// Deep copy `value`.
///
/// Functions (including accessor functions) are shared with the source.
/// The result has the same kind as the input.
pub fn clone(value: &Value) -> Value {
    // Lenient mode has no failure path
    DeepCloner::new()
        .run(value)
        .unwrap_or_else(|_| value.clone())
}

/// Deep copy `value`, failing on the first function found.
///
/// Traversal is depth-first in own-key and insertion order; the error
/// carries the path to the offending value, e.g. `root.nested.deeper.func`.
pub fn clone_strict(value: &Value) -> CloneResult<Value> {
    DeepCloner::strict().run(value)
}

/// Whether `value` itself can be deep copied (everything but functions).
///
/// Nested values are not inspected.
pub fn is_cloneable(value: &Value) -> bool {
    !value.is_function()
}
