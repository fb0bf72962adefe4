//! ArrayBuffer implementation
//!
//! ArrayBuffer is the byte storage that TypedArrays and DataViews view into.
//! Views hold an `Arc` to the buffer, so writes through one view are visible
//! through every other view of the same buffer.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::object::JsObject;

/// A JavaScript ArrayBuffer
#[derive(Debug)]
pub struct JsArrayBuffer {
    /// The object portion (properties, prototype, etc.)
    pub object: Arc<JsObject>,
    data: RwLock<Vec<u8>>,
}

impl JsArrayBuffer {
    /// Create a zero-filled ArrayBuffer with the specified byte length
    pub fn new(object: Arc<JsObject>, byte_length: usize) -> Self {
        Self::from_bytes(object, vec![0; byte_length])
    }

    /// Create an ArrayBuffer owning `bytes`
    pub fn from_bytes(object: Arc<JsObject>, bytes: Vec<u8>) -> Self {
        Self {
            object,
            data: RwLock::new(bytes),
        }
    }

    /// Get the byte length
    pub fn byte_length(&self) -> usize {
        self.data.read().len()
    }

    /// Copy of the whole buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Copy `len` bytes starting at `offset`, `None` if out of bounds
    pub fn read(&self, offset: usize, len: usize) -> Option<Vec<u8>> {
        let data = self.data.read();
        let end = offset.checked_add(len)?;
        data.get(offset..end).map(<[u8]>::to_vec)
    }

    /// Write `bytes` at `offset`. Returns `false` if out of bounds.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> bool {
        let mut data = self.data.write();
        let Some(end) = offset.checked_add(bytes.len()) else {
            return false;
        };
        match data.get_mut(offset..end) {
            Some(dst) => {
                dst.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    /// `slice(start, end)`: a new buffer with a copy of the range
    pub fn slice(&self, object: Arc<JsObject>, start: usize, end: usize) -> Option<JsArrayBuffer> {
        let data = self.data.read();
        if start > end || end > data.len() {
            return None;
        }
        Some(JsArrayBuffer::from_bytes(object, data[start..end].to_vec()))
    }
}
