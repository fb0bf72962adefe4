//! Ordinary objects
//!
//! Every heap value owns one of these for its own properties and prototype.
//! Properties keep insertion order; `own_keys` reports them the way
//! `Reflect.ownKeys` does (indices ascending, then strings, then symbols).

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::value::{Symbol, Value};

/// Property key (string, symbol or array index)
#[derive(Clone, Debug)]
pub enum PropertyKey {
    /// String property key
    String(Arc<str>),
    /// Symbol property key
    Symbol(Arc<Symbol>),
    /// Integer index
    Index(u32),
}

impl PropertyKey {
    /// Create a string property key.
    ///
    /// Canonical numeric strings (`"0"`, `"17"`) become index keys, so
    /// `obj["1"]` and `obj[1]` address the same slot.
    pub fn string(s: &str) -> Self {
        match parse_index(s) {
            Some(i) => Self::Index(i),
            None => Self::String(Arc::from(s)),
        }
    }

    /// Create a symbol property key
    pub fn symbol(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }

    /// Create an index property key
    pub fn index(i: u32) -> Self {
        Self::Index(i)
    }

    /// Is this a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }
}

fn parse_index(s: &str) -> Option<u32> {
    if s.is_empty() || (s.len() > 1 && s.starts_with('0')) {
        return None;
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // u32::MAX is a valid property name but not a valid array index
    s.parse::<u32>().ok().filter(|i| *i != u32::MAX)
}

impl PartialEq for PropertyKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.id == b.id,
            (Self::Index(a), Self::Index(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropertyKey {}

impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::String(s) => s.hash(state),
            Self::Symbol(sym) => sym.id.hash(state),
            Self::Index(i) => i.hash(state),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Symbol(sym) => write!(f, "{}", sym),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        Self::Index(i)
    }
}

impl From<Arc<Symbol>> for PropertyKey {
    fn from(sym: Arc<Symbol>) -> Self {
        Self::Symbol(sym)
    }
}

/// Property attributes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable
    pub writable: bool,
    /// Property is enumerable
    pub enumerable: bool,
    /// Property is configurable
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Writable and configurable but hidden from enumeration
    pub const fn hidden() -> Self {
        Self {
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

/// Property descriptor
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    /// Data property
    Data {
        /// The value
        value: Value,
        /// Attributes
        attributes: PropertyAttributes,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<Value>,
        /// Setter function
        set: Option<Value>,
        /// Attributes (`writable` is ignored)
        attributes: PropertyAttributes,
    },
}

impl PropertyDescriptor {
    /// Create a data property
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Create an accessor property
    pub fn accessor(
        get: Option<Value>,
        set: Option<Value>,
        attributes: PropertyAttributes,
    ) -> Self {
        Self::Accessor {
            get,
            set,
            attributes,
        }
    }

    /// Get the value (for data properties)
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// Attributes of either descriptor kind
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Check if writable
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { .. } => false,
        }
    }

    /// Check if enumerable
    pub fn is_enumerable(&self) -> bool {
        self.attributes().enumerable
    }

    /// Check if configurable
    pub fn is_configurable(&self) -> bool {
        self.attributes().configurable
    }
}

type PropertyMap = IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>;

/// An ordinary object
///
/// Thread-safe with interior mutability.
pub struct JsObject {
    /// Own properties, in insertion order
    properties: RwLock<PropertyMap>,
    /// Prototype (None for `Object.prototype` and `Object.create(null)`)
    prototype: Option<Arc<JsObject>>,
}

impl JsObject {
    /// Create a new empty object
    pub fn new(prototype: Option<Arc<JsObject>>) -> Self {
        Self {
            properties: RwLock::new(PropertyMap::with_hasher(FxBuildHasher)),
            prototype,
        }
    }

    /// Create a new object with the same prototype as `other`
    pub fn sibling_of(other: &JsObject) -> Self {
        Self::new(other.prototype.clone())
    }

    /// Get property by key, walking the prototype chain.
    ///
    /// Accessor properties report `None`: there is no receiver to call them with.
    pub fn get(&self, key: &PropertyKey) -> Option<Value> {
        if let Some(desc) = self.properties.read().get(key) {
            return desc.value().cloned();
        }

        if let Some(proto) = &self.prototype {
            return proto.get(key);
        }

        None
    }

    /// Get an own property descriptor
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.read().get(key).cloned()
    }

    /// Set property by key
    ///
    /// Returns `false` when an existing own property is not writable.
    pub fn set(&self, key: impl Into<PropertyKey>, value: Value) -> bool {
        let key = key.into();
        let mut props = self.properties.write();
        match props.get_mut(&key) {
            Some(PropertyDescriptor::Data { value: slot, attributes }) => {
                if !attributes.writable {
                    return false;
                }
                *slot = value;
                true
            }
            Some(PropertyDescriptor::Accessor { .. }) => false,
            None => {
                props.insert(key, PropertyDescriptor::data(value));
                true
            }
        }
    }

    /// Define a property with descriptor, replacing any existing one
    pub fn define_property(&self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) {
        self.properties.write().insert(key.into(), desc);
    }

    /// Delete property
    pub fn delete(&self, key: &PropertyKey) -> bool {
        let mut props = self.properties.write();
        match props.get(key) {
            Some(desc) if !desc.is_configurable() => false,
            Some(_) => props.shift_remove(key).is_some(),
            None => true,
        }
    }

    /// Check if object has own property
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Check if object has property (including prototype chain)
    pub fn has(&self, key: &PropertyKey) -> bool {
        if self.has_own(key) {
            return true;
        }

        if let Some(proto) = &self.prototype {
            return proto.has(key);
        }

        false
    }

    /// Own property keys: indices ascending, then strings, then symbols
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let props = self.properties.read();
        let mut indices: Vec<u32> = props
            .keys()
            .filter_map(|k| match k {
                PropertyKey::Index(i) => Some(*i),
                _ => None,
            })
            .collect();
        indices.sort_unstable();

        let mut keys: Vec<PropertyKey> = Vec::with_capacity(props.len());
        keys.extend(indices.into_iter().map(PropertyKey::Index));
        keys.extend(
            props
                .keys()
                .filter(|k| matches!(k, PropertyKey::String(_)))
                .cloned(),
        );
        keys.extend(props.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    /// Own enumerable keys, in `own_keys` order
    pub fn own_enumerable_keys(&self) -> Vec<PropertyKey> {
        self.own_properties()
            .into_iter()
            .filter(|(_, desc)| desc.is_enumerable())
            .map(|(key, _)| key)
            .collect()
    }

    /// Snapshot of every own property, in `own_keys` order.
    ///
    /// The lock is released before returning so callers may recurse into
    /// values that reference this object.
    pub fn own_properties(&self) -> Vec<(PropertyKey, PropertyDescriptor)> {
        let keys = self.own_keys();
        let props = self.properties.read();
        keys.into_iter()
            .filter_map(|key| props.get(&key).cloned().map(|desc| (key, desc)))
            .collect()
    }

    /// Number of own properties
    pub fn property_count(&self) -> usize {
        self.properties.read().len()
    }

    /// Get prototype
    pub fn prototype(&self) -> Option<&Arc<JsObject>> {
        self.prototype.as_ref()
    }

    /// Whether `proto` appears anywhere on this object's prototype chain
    pub fn inherits_from(&self, proto: &Arc<JsObject>) -> bool {
        let mut current = self.prototype.as_ref();
        while let Some(p) = current {
            if Arc::ptr_eq(p, proto) {
                return true;
            }
            current = p.prototype.as_ref();
        }
        false
    }

    /// Whether both objects have the very same prototype reference
    pub fn same_prototype(&self, other: &JsObject) -> bool {
        match (&self.prototype, &other.prototype) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props = self.properties.read();
        f.debug_struct("JsObject")
            .field("properties", &props.len())
            .field("has_prototype", &self.prototype.is_some())
            .finish()
    }
}
