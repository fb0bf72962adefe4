//! Dynamic values
//!
//! A `Value` is either a primitive, stored inline, or a `HeapRef` pointing at
//! a shared, interior-mutable heap cell. Cloning a `Value` copies the
//! reference, never the heap cell: aliasing and cycles behave the way they do
//! in a JavaScript engine.

use num_bigint::BigInt;
use num_traits::Zero;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::array::JsArray;
use crate::array_buffer::JsArrayBuffer;
use crate::data_view::JsDataView;
use crate::date::JsDate;
use crate::error_object::JsError;
use crate::function::JsFunction;
use crate::map_data::{JsMap, JsSet};
use crate::object::JsObject;
use crate::regexp::JsRegExp;
use crate::typed_array::JsTypedArray;
use crate::weak::{JsWeakMap, JsWeakSet};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// A JavaScript Symbol
#[derive(Debug)]
pub struct Symbol {
    /// Symbol description
    pub description: Option<String>,
    /// Unique ID
    pub id: u64,
}

impl Symbol {
    /// Create a fresh, unique symbol
    pub fn new(description: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            description: description.map(str::to_string),
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Reference to heap-allocated data
#[derive(Clone)]
pub enum HeapRef {
    /// Plain record or user-defined class instance
    Object(Arc<JsObject>),
    /// Array (possibly sparse)
    Array(Arc<JsArray>),
    /// Callable function
    Function(Arc<JsFunction>),
    /// Date
    Date(Arc<JsDate>),
    /// RegExp
    RegExp(Arc<JsRegExp>),
    /// Map
    Map(Arc<JsMap>),
    /// Set
    Set(Arc<JsSet>),
    /// WeakMap
    WeakMap(Arc<JsWeakMap>),
    /// WeakSet
    WeakSet(Arc<JsWeakSet>),
    /// ArrayBuffer (raw binary data buffer)
    ArrayBuffer(Arc<JsArrayBuffer>),
    /// TypedArray (view over ArrayBuffer)
    TypedArray(Arc<JsTypedArray>),
    /// DataView (arbitrary byte-order access to ArrayBuffer)
    DataView(Arc<JsDataView>),
    /// Error or any subclass of it
    Error(Arc<JsError>),
}

impl HeapRef {
    /// The ordinary object backing this heap value (properties + prototype)
    pub fn object(&self) -> &Arc<JsObject> {
        match self {
            HeapRef::Object(o) => o,
            HeapRef::Array(a) => &a.object,
            HeapRef::Function(f) => &f.object,
            HeapRef::Date(d) => &d.object,
            HeapRef::RegExp(r) => &r.object,
            HeapRef::Map(m) => &m.object,
            HeapRef::Set(s) => &s.object,
            HeapRef::WeakMap(w) => &w.object,
            HeapRef::WeakSet(w) => &w.object,
            HeapRef::ArrayBuffer(ab) => &ab.object,
            HeapRef::TypedArray(ta) => &ta.object,
            HeapRef::DataView(dv) => &dv.object,
            HeapRef::Error(e) => &e.object,
        }
    }

    /// Identity of this heap value. Two references alias iff identities match.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(self.object()) as usize
    }

    /// Whether two references point at the same heap value
    pub fn ptr_eq(&self, other: &HeapRef) -> bool {
        self.identity() == other.identity()
    }

    /// Built-in tag, as `Object.prototype.toString` would report it
    pub fn class_name(&self) -> &'static str {
        match self {
            HeapRef::Object(_) => "Object",
            HeapRef::Array(_) => "Array",
            HeapRef::Function(_) => "Function",
            HeapRef::Date(_) => "Date",
            HeapRef::RegExp(_) => "RegExp",
            HeapRef::Map(_) => "Map",
            HeapRef::Set(_) => "Set",
            HeapRef::WeakMap(_) => "WeakMap",
            HeapRef::WeakSet(_) => "WeakSet",
            HeapRef::ArrayBuffer(_) => "ArrayBuffer",
            HeapRef::TypedArray(ta) => ta.kind().name(),
            HeapRef::DataView(_) => "DataView",
            HeapRef::Error(_) => "Error",
        }
    }
}

impl fmt::Debug for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapRef::Object(o) => f.debug_tuple("Object").field(o).finish(),
            HeapRef::Array(a) => f.debug_tuple("Array").field(&a.len()).finish(),
            HeapRef::Function(func) => f.debug_tuple("Function").field(&func.name).finish(),
            HeapRef::Date(d) => f.debug_tuple("Date").field(&d.time_value()).finish(),
            HeapRef::RegExp(r) => write!(f, "RegExp(/{}/{})", r.source, r.flags),
            HeapRef::Map(m) => f.debug_tuple("Map").field(&m.size()).finish(),
            HeapRef::Set(s) => f.debug_tuple("Set").field(&s.size()).finish(),
            HeapRef::WeakMap(_) => f.write_str("WeakMap"),
            HeapRef::WeakSet(_) => f.write_str("WeakSet"),
            HeapRef::ArrayBuffer(ab) => write!(f, "ArrayBuffer({})", ab.byte_length()),
            HeapRef::TypedArray(ta) => write!(f, "{}({})", ta.kind().name(), ta.length()),
            HeapRef::DataView(dv) => write!(f, "DataView({})", dv.byte_length()),
            HeapRef::Error(e) => write!(f, "{}({:?})", e.name, e.message),
        }
    }
}

/// A JavaScript value
///
/// Primitives are stored inline; objects live behind `HeapRef`.
/// This type is `Send + Sync` because all heap-allocated data is behind `Arc`.
#[derive(Clone, Default)]
pub enum Value {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// IEEE 754 double (NaN, signed zero and infinities included)
    Number(f64),
    /// Immutable string
    String(Arc<str>),
    /// Symbol (compared by id)
    Symbol(Arc<Symbol>),
    /// Arbitrary precision integer
    BigInt(Arc<BigInt>),
    /// Heap object
    Heap(HeapRef),
}

impl Value {
    /// Create undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// Create null value
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Create boolean value
    #[inline]
    pub const fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    /// Create number value
    #[inline]
    pub const fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create number value from a 32-bit integer
    #[inline]
    pub const fn int32(n: i32) -> Self {
        Self::Number(n as f64)
    }

    /// Create string value
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Create symbol value
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// Create BigInt value
    pub fn bigint(value: impl Into<BigInt>) -> Self {
        Self::BigInt(Arc::new(value.into()))
    }

    /// Is undefined
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is null or undefined
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Is a number
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Is anything but a heap object
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Heap(_))
    }

    /// Is a heap object of any kind (functions included)
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Heap(_))
    }

    /// Is a function
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Heap(HeapRef::Function(_)))
    }

    /// Get boolean payload
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get number payload
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get string payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get symbol payload
    pub fn as_symbol(&self) -> Option<&Arc<Symbol>> {
        match self {
            Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Get BigInt payload
    pub fn as_bigint(&self) -> Option<&Arc<BigInt>> {
        match self {
            Self::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Get heap reference
    pub fn as_heap(&self) -> Option<&HeapRef> {
        match self {
            Self::Heap(h) => Some(h),
            _ => None,
        }
    }

    /// Plain record / class instance
    pub fn as_object(&self) -> Option<&Arc<JsObject>> {
        match self {
            Self::Heap(HeapRef::Object(o)) => Some(o),
            _ => None,
        }
    }

    /// Array
    pub fn as_array(&self) -> Option<&Arc<JsArray>> {
        match self {
            Self::Heap(HeapRef::Array(a)) => Some(a),
            _ => None,
        }
    }

    /// Function
    pub fn as_function(&self) -> Option<&Arc<JsFunction>> {
        match self {
            Self::Heap(HeapRef::Function(f)) => Some(f),
            _ => None,
        }
    }

    /// Date
    pub fn as_date(&self) -> Option<&Arc<JsDate>> {
        match self {
            Self::Heap(HeapRef::Date(d)) => Some(d),
            _ => None,
        }
    }

    /// RegExp
    pub fn as_regexp(&self) -> Option<&Arc<JsRegExp>> {
        match self {
            Self::Heap(HeapRef::RegExp(r)) => Some(r),
            _ => None,
        }
    }

    /// Map
    pub fn as_map(&self) -> Option<&Arc<JsMap>> {
        match self {
            Self::Heap(HeapRef::Map(m)) => Some(m),
            _ => None,
        }
    }

    /// Set
    pub fn as_set(&self) -> Option<&Arc<JsSet>> {
        match self {
            Self::Heap(HeapRef::Set(s)) => Some(s),
            _ => None,
        }
    }

    /// WeakMap
    pub fn as_weak_map(&self) -> Option<&Arc<JsWeakMap>> {
        match self {
            Self::Heap(HeapRef::WeakMap(w)) => Some(w),
            _ => None,
        }
    }

    /// WeakSet
    pub fn as_weak_set(&self) -> Option<&Arc<JsWeakSet>> {
        match self {
            Self::Heap(HeapRef::WeakSet(w)) => Some(w),
            _ => None,
        }
    }

    /// ArrayBuffer
    pub fn as_array_buffer(&self) -> Option<&Arc<JsArrayBuffer>> {
        match self {
            Self::Heap(HeapRef::ArrayBuffer(ab)) => Some(ab),
            _ => None,
        }
    }

    /// TypedArray
    pub fn as_typed_array(&self) -> Option<&Arc<JsTypedArray>> {
        match self {
            Self::Heap(HeapRef::TypedArray(ta)) => Some(ta),
            _ => None,
        }
    }

    /// DataView
    pub fn as_data_view(&self) -> Option<&Arc<JsDataView>> {
        match self {
            Self::Heap(HeapRef::DataView(dv)) => Some(dv),
            _ => None,
        }
    }

    /// Error
    pub fn as_error(&self) -> Option<&Arc<JsError>> {
        match self {
            Self::Heap(HeapRef::Error(e)) => Some(e),
            _ => None,
        }
    }

    /// Identity of the heap value, `None` for primitives
    pub fn identity(&self) -> Option<usize> {
        self.as_heap().map(HeapRef::identity)
    }

    /// Whether both values are the very same heap object
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self.as_heap(), other.as_heap()) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// `Object.is` semantics: NaN equals NaN, +0 and -0 differ
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                (a.is_nan() && b.is_nan())
                    || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            _ => self == other,
        }
    }

    /// Get the type name (for typeof)
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "object", // typeof null === "object" (historical bug)
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::BigInt(_) => "bigint",
            Self::Heap(HeapRef::Function(_)) => "function",
            Self::Heap(_) => "object",
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Number(n) => !n.is_nan() && *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::BigInt(b) => !b.is_zero(),
            Self::Symbol(_) | Self::Heap(_) => true,
        }
    }

    /// String conversion used for property names and diagnostics
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.to_string(),
            Self::Symbol(s) => s.to_string(),
            Self::BigInt(b) => b.to_string(),
            Self::Heap(HeapRef::Function(f)) => format!("[Function: {}]", f.name),
            Self::Heap(h) => format!("[object {}]", h.class_name()),
        }
    }
}

/// Number::toString for the common cases (integers print without a fraction)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", number_to_string(*n)),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Symbol(s) => write!(f, "{}", s),
            Self::BigInt(b) => write!(f, "{}n", b),
            Self::Heap(h) => write!(f, "{:?}", h),
        }
    }
}

/// Strict equality (`===`)
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            // NaN != NaN is correct
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.id == b.id,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::Heap(a), Self::Heap(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<HeapRef> for Value {
    fn from(h: HeapRef) -> Self {
        Self::Heap(h)
    }
}

macro_rules! impl_from_heap {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Arc<$ty>> for Value {
                fn from(v: Arc<$ty>) -> Self {
                    Self::Heap(HeapRef::$variant(v))
                }
            }
        )*
    };
}

impl_from_heap! {
    JsObject => Object,
    JsArray => Array,
    JsFunction => Function,
    JsDate => Date,
    JsRegExp => RegExp,
    JsMap => Map,
    JsSet => Set,
    JsWeakMap => WeakMap,
    JsWeakSet => WeakSet,
    JsArrayBuffer => ArrayBuffer,
    JsTypedArray => TypedArray,
    JsDataView => DataView,
    JsError => Error,
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::int32(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}
