//! RegExp objects
//!
//! The source is kept verbatim. It is compiled with the `regex` crate when the
//! pattern and flags fit that engine; otherwise the object still exists and
//! reports no matcher.

use parking_lot::RwLock;
use regex::Regex;
use std::sync::Arc;

use crate::object::JsObject;

/// A JavaScript RegExp
#[derive(Debug)]
pub struct JsRegExp {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    /// The regex pattern
    pub source: String,
    /// The regex flags
    pub flags: String,
    last_index: RwLock<usize>,
    /// The compiled Rust regex (if compilation succeeded)
    pub native_regex: Option<Regex>,
}

impl JsRegExp {
    /// Create a new JsRegExp; `lastIndex` starts at 0
    pub fn new(object: Arc<JsObject>, source: impl Into<String>, flags: impl Into<String>) -> Self {
        let source = source.into();
        let flags = flags.into();
        let native_regex = compile(&source, &flags);
        Self {
            object,
            source,
            flags,
            last_index: RwLock::new(0),
            native_regex,
        }
    }

    /// `lastIndex`
    pub fn last_index(&self) -> usize {
        *self.last_index.read()
    }

    /// Update `lastIndex`
    pub fn set_last_index(&self, index: usize) {
        *self.last_index.write() = index;
    }

    /// `global` flag
    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    /// `RegExp.prototype.test` without `lastIndex` bookkeeping.
    ///
    /// Returns `None` when the pattern could not be compiled.
    pub fn is_match(&self, haystack: &str) -> Option<bool> {
        self.native_regex.as_ref().map(|re| re.is_match(haystack))
    }
}

fn compile(source: &str, flags: &str) -> Option<Regex> {
    let inline: String = flags
        .chars()
        .filter(|c| matches!(c, 'i' | 'm' | 's'))
        .collect();
    let pattern = if inline.is_empty() {
        source.to_string()
    } else {
        format!("(?{}){}", inline, source)
    };
    Regex::new(&pattern).ok()
}
