//! Native functions

use std::fmt;
use std::sync::Arc;

use crate::object::JsObject;
use crate::value::Value;

/// Native function handler type
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// A callable function with an attached object for properties
pub struct JsFunction {
    /// Attached object for properties (`prototype`, `name`, user fields)
    pub object: Arc<JsObject>,
    /// Function name (may be empty for anonymous functions)
    pub name: String,
    /// The native function handler
    pub func: NativeFn,
}

impl JsFunction {
    /// Create a function
    pub fn new<F>(object: Arc<JsObject>, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            object,
            name: name.into(),
            func: Arc::new(f),
        }
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.func)(args)
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}
