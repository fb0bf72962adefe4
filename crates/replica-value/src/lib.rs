//! # Replica Value
//!
//! JavaScript-style value graphs for Rust.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: Values are `Send + Sync`; heap cells use `parking_lot` locks
//! - **Reference semantics**: cloning a `Value` aliases the heap cell, so shared
//!   and cyclic graphs behave like they do in an engine
//! - **Identity**: every heap kind owns an ordinary object whose address is its identity
//! - **Prototypes**: built-in kinds hang off an `Intrinsics` registry; user
//!   classes are plain prototype objects

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod array;
pub mod array_buffer;
pub mod data_view;
pub mod date;
pub mod empty;
pub mod equality;
pub mod error;
pub mod error_object;
pub mod function;
pub mod intrinsics;
pub mod json;
pub mod map_data;
pub mod object;
pub mod regexp;
pub mod typed_array;
pub mod value;
pub mod weak;

pub use array::JsArray;
pub use array_buffer::JsArrayBuffer;
pub use data_view::JsDataView;
pub use date::JsDate;
pub use empty::is_empty;
pub use equality::deep_equals;
pub use error::{ValueError, ValueResult};
pub use error_object::{ErrorKind, JsError};
pub use function::{JsFunction, NativeFn};
pub use intrinsics::Intrinsics;
pub use json::to_json;
pub use map_data::{JsMap, JsSet, MapKey};
pub use object::{JsObject, PropertyAttributes, PropertyDescriptor, PropertyKey};
pub use regexp::JsRegExp;
pub use typed_array::{JsTypedArray, TypedArrayKind};
pub use value::{HeapRef, Symbol, Value};
pub use weak::{JsWeakMap, JsWeakSet};
