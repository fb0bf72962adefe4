//! Error objects
//!
//! `name`, `message` and `stack` are internal slots here; the constructor an
//! error belongs to is identified by its prototype, so user subclasses work
//! the same way as the native error types.

use std::sync::Arc;

use crate::object::JsObject;

/// The native error constructors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `Error`
    Error,
    /// `TypeError`
    TypeError,
    /// `RangeError`
    RangeError,
    /// `ReferenceError`
    ReferenceError,
    /// `SyntaxError`
    SyntaxError,
    /// `URIError`
    URIError,
    /// `EvalError`
    EvalError,
}

impl ErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::TypeError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::URIError,
        ErrorKind::EvalError,
    ];

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Constructor name
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::URIError => "URIError",
            ErrorKind::EvalError => "EvalError",
        }
    }
}

/// A JavaScript Error (or subclass instance)
#[derive(Debug)]
pub struct JsError {
    /// The object portion: prototype plus any extra own properties
    pub object: Arc<JsObject>,
    /// `name`
    pub name: String,
    /// `message`
    pub message: String,
    /// `stack`, when one was captured
    pub stack: Option<String>,
}

impl JsError {
    /// Create an error with an explicit stack
    pub fn new(
        object: Arc<JsObject>,
        name: impl Into<String>,
        message: impl Into<String>,
        stack: Option<String>,
    ) -> Self {
        Self {
            object,
            name: name.into(),
            message: message.into(),
            stack,
        }
    }

    /// Create an error whose stack is the `name: message` header line
    pub fn with_captured_stack(
        object: Arc<JsObject>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let message = message.into();
        let stack = Some(format_header(&name, &message));
        Self::new(object, name, message, stack)
    }

    /// `Error.prototype.toString`
    pub fn header(&self) -> String {
        format_header(&self.name, &self.message)
    }
}

fn format_header(name: &str, message: &str) -> String {
    match (name.is_empty(), message.is_empty()) {
        (_, true) => name.to_string(),
        (true, false) => message.to_string(),
        (false, false) => format!("{}: {}", name, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let object = Arc::new(JsObject::new(None));
        let err = JsError::with_captured_stack(object.clone(), "TypeError", "bad input");
        assert_eq!(err.header(), "TypeError: bad input");
        assert_eq!(err.stack.as_deref(), Some("TypeError: bad input"));

        let bare = JsError::new(object, "Error", "", None);
        assert_eq!(bare.header(), "Error");
        assert!(bare.stack.is_none());
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
