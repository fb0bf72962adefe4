//! TypedArray implementation
//!
//! TypedArrays are views over ArrayBuffer, providing typed access to binary data.
//! All 11 types share common implementation via TypedArrayKind.

use std::sync::Arc;

use crate::array_buffer::JsArrayBuffer;
use crate::error::{ValueError, ValueResult};
use crate::object::JsObject;

/// The kind of TypedArray - determines element size and interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    /// Int8Array - 8-bit signed integers
    Int8,
    /// Uint8Array - 8-bit unsigned integers
    Uint8,
    /// Uint8ClampedArray - 8-bit unsigned integers (clamped)
    Uint8Clamped,
    /// Int16Array - 16-bit signed integers
    Int16,
    /// Uint16Array - 16-bit unsigned integers
    Uint16,
    /// Int32Array - 32-bit signed integers
    Int32,
    /// Uint32Array - 32-bit unsigned integers
    Uint32,
    /// Float32Array - 32-bit floating point
    Float32,
    /// Float64Array - 64-bit floating point
    Float64,
    /// BigInt64Array - 64-bit signed integers (BigInt)
    BigInt64,
    /// BigUint64Array - 64-bit unsigned integers (BigInt)
    BigUint64,
}

impl TypedArrayKind {
    /// Every kind, in declaration order
    pub const ALL: [TypedArrayKind; 11] = [
        TypedArrayKind::Int8,
        TypedArrayKind::Uint8,
        TypedArrayKind::Uint8Clamped,
        TypedArrayKind::Int16,
        TypedArrayKind::Uint16,
        TypedArrayKind::Int32,
        TypedArrayKind::Uint32,
        TypedArrayKind::Float32,
        TypedArrayKind::Float64,
        TypedArrayKind::BigInt64,
        TypedArrayKind::BigUint64,
    ];

    /// Position in `ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Get the byte size of each element
    pub fn element_size(&self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 | TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => 8,
        }
    }

    /// Get the name of this TypedArray type
    pub fn name(&self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
            TypedArrayKind::BigInt64 => "BigInt64Array",
            TypedArrayKind::BigUint64 => "BigUint64Array",
        }
    }

    /// Check if this is a BigInt typed array
    pub fn is_bigint(&self) -> bool {
        matches!(self, TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64)
    }

    fn decode(&self, bytes: &[u8]) -> f64 {
        let mut raw = [0u8; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        match self {
            TypedArrayKind::Int8 => bytes[0] as i8 as f64,
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => bytes[0] as f64,
            TypedArrayKind::Int16 => i16::from_le_bytes([raw[0], raw[1]]) as f64,
            TypedArrayKind::Uint16 => u16::from_le_bytes([raw[0], raw[1]]) as f64,
            TypedArrayKind::Int32 => i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Uint32 => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Float32 => f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64,
            TypedArrayKind::Float64 => f64::from_le_bytes(raw),
            TypedArrayKind::BigInt64 => i64::from_le_bytes(raw) as f64,
            TypedArrayKind::BigUint64 => u64::from_le_bytes(raw) as f64,
        }
    }

    fn encode(&self, value: f64) -> Vec<u8> {
        match self {
            TypedArrayKind::Int8 => (modular(value, 8) as u8 as i8).to_le_bytes().to_vec(),
            TypedArrayKind::Uint8 => (modular(value, 8) as u8).to_le_bytes().to_vec(),
            TypedArrayKind::Uint8Clamped => vec![clamp_u8(value)],
            TypedArrayKind::Int16 => (modular(value, 16) as u16 as i16).to_le_bytes().to_vec(),
            TypedArrayKind::Uint16 => (modular(value, 16) as u16).to_le_bytes().to_vec(),
            TypedArrayKind::Int32 => (modular(value, 32) as u32 as i32).to_le_bytes().to_vec(),
            TypedArrayKind::Uint32 => (modular(value, 32) as u32).to_le_bytes().to_vec(),
            TypedArrayKind::Float32 => (value as f32).to_le_bytes().to_vec(),
            TypedArrayKind::Float64 => value.to_le_bytes().to_vec(),
            TypedArrayKind::BigInt64 => (modular(value, 64) as i64).to_le_bytes().to_vec(),
            TypedArrayKind::BigUint64 => modular(value, 64).to_le_bytes().to_vec(),
        }
    }
}

/// ToInt8/ToUint16/... style wrap-around: truncate, then reduce modulo 2^bits
fn modular(value: f64, bits: u32) -> u64 {
    if !value.is_finite() {
        return 0;
    }
    let modulus = 2f64.powi(bits as i32);
    value.trunc().rem_euclid(modulus) as u64
}

/// ToUint8Clamp: round half to even, clamp to 0..=255
fn clamp_u8(value: f64) -> u8 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= 255.0 {
        255
    } else {
        let floor = value.floor();
        let diff = value - floor;
        let rounded = if diff > 0.5 || (diff == 0.5 && floor % 2.0 != 0.0) {
            floor + 1.0
        } else {
            floor
        };
        rounded as u8
    }
}

/// A JavaScript TypedArray
///
/// TypedArray is a view over an ArrayBuffer, providing typed access to binary data.
/// It does not copy data - it references the underlying buffer.
#[derive(Debug)]
pub struct JsTypedArray {
    /// Associated JavaScript object (for properties and prototype)
    pub object: Arc<JsObject>,
    /// The underlying ArrayBuffer
    buffer: Arc<JsArrayBuffer>,
    /// Byte offset into the buffer
    byte_offset: usize,
    /// Number of elements (not bytes)
    length: usize,
    /// The kind of typed array
    kind: TypedArrayKind,
}

impl JsTypedArray {
    /// Create a new TypedArray view over an ArrayBuffer
    pub fn new(
        object: Arc<JsObject>,
        buffer: Arc<JsArrayBuffer>,
        kind: TypedArrayKind,
        byte_offset: usize,
        length: usize,
    ) -> ValueResult<Self> {
        let elem_size = kind.element_size();

        if byte_offset % elem_size != 0 {
            return Err(ValueError::range_error(format!(
                "start offset of {} should be a multiple of {}",
                kind.name(),
                elem_size
            )));
        }

        let byte_length = length
            .checked_mul(elem_size)
            .ok_or_else(|| ValueError::range_error("TypedArray length overflow"))?;
        let end = byte_offset
            .checked_add(byte_length)
            .ok_or_else(|| ValueError::range_error("TypedArray would extend past end of buffer"))?;
        if end > buffer.byte_length() {
            return Err(ValueError::range_error(
                "TypedArray would extend past end of buffer",
            ));
        }

        Ok(Self {
            object,
            buffer,
            byte_offset,
            length,
            kind,
        })
    }

    /// Same window (kind, offset, length) over another buffer.
    ///
    /// `buffer` should be at least as long as the current one; element
    /// access past its end reads as `None`.
    pub fn rebind(&self, object: Arc<JsObject>, buffer: Arc<JsArrayBuffer>) -> Self {
        Self {
            object,
            buffer,
            byte_offset: self.byte_offset,
            length: self.length,
            kind: self.kind,
        }
    }

    /// Get the kind of this TypedArray
    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    /// Get the underlying ArrayBuffer
    pub fn buffer(&self) -> &Arc<JsArrayBuffer> {
        &self.buffer
    }

    /// Get the byte offset into the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Get the byte length of the view
    pub fn byte_length(&self) -> usize {
        self.length * self.kind.element_size()
    }

    /// Get the number of elements
    pub fn length(&self) -> usize {
        self.length
    }

    /// Bytes covered by this view
    pub fn view_bytes(&self) -> Vec<u8> {
        self.buffer
            .read(self.byte_offset, self.byte_length())
            .unwrap_or_default()
    }

    /// Get an element as f64 (BigInt kinds are converted, possibly lossily)
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.length {
            return None;
        }
        let size = self.kind.element_size();
        let bytes = self.buffer.read(self.byte_offset + index * size, size)?;
        Some(self.kind.decode(&bytes))
    }

    /// Set an element from f64
    pub fn set(&self, index: usize, value: f64) -> bool {
        if index >= self.length {
            return false;
        }
        let byte_index = self.byte_offset + index * self.kind.element_size();
        self.buffer.write(byte_index, &self.kind.encode(value))
    }
}
