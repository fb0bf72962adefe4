//! DataView implementation

use std::sync::Arc;

use crate::array_buffer::JsArrayBuffer;
use crate::error::{ValueError, ValueResult};
use crate::object::JsObject;

/// A JavaScript DataView
#[derive(Debug)]
pub struct JsDataView {
    /// Associated JavaScript object (for properties and prototype)
    pub object: Arc<JsObject>,
    buffer: Arc<JsArrayBuffer>,
    byte_offset: usize,
    byte_length: usize,
}

impl JsDataView {
    /// Create a view of `byte_length` bytes (or the rest of the buffer)
    pub fn new(
        object: Arc<JsObject>,
        buffer: Arc<JsArrayBuffer>,
        byte_offset: usize,
        byte_length: Option<usize>,
    ) -> ValueResult<Self> {
        let buffer_len = buffer.byte_length();
        if byte_offset > buffer_len {
            return Err(ValueError::range_error(format!(
                "Start offset {} is outside the bounds of the buffer",
                byte_offset
            )));
        }
        let byte_length = byte_length.unwrap_or(buffer_len - byte_offset);
        if byte_length > buffer_len - byte_offset {
            return Err(ValueError::range_error(format!(
                "Invalid DataView length {}",
                byte_length
            )));
        }
        Ok(Self {
            object,
            buffer,
            byte_offset,
            byte_length,
        })
    }

    /// Same window over another buffer of at least the same length
    pub fn rebind(&self, object: Arc<JsObject>, buffer: Arc<JsArrayBuffer>) -> Self {
        Self {
            object,
            buffer,
            byte_offset: self.byte_offset,
            byte_length: self.byte_length,
        }
    }

    /// Get the underlying ArrayBuffer
    pub fn buffer(&self) -> &Arc<JsArrayBuffer> {
        &self.buffer
    }

    /// Byte offset into the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Byte length of the view
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Bytes covered by this view
    pub fn view_bytes(&self) -> Vec<u8> {
        self.buffer
            .read(self.byte_offset, self.byte_length)
            .unwrap_or_default()
    }

    fn read<const N: usize>(&self, offset: usize) -> ValueResult<[u8; N]> {
        if offset > self.byte_length || N > self.byte_length - offset {
            return Err(ValueError::range_error("Offset is outside the bounds of the DataView"));
        }
        let bytes = self
            .buffer
            .read(self.byte_offset + offset, N)
            .ok_or_else(|| {
                ValueError::range_error("Offset is outside the bounds of the DataView")
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    fn write(&self, offset: usize, bytes: &[u8]) -> ValueResult<()> {
        if offset > self.byte_length
            || bytes.len() > self.byte_length - offset
            || !self.buffer.write(self.byte_offset + offset, bytes)
        {
            return Err(ValueError::range_error("Offset is outside the bounds of the DataView"));
        }
        Ok(())
    }

    /// `getUint8`
    pub fn get_uint8(&self, offset: usize) -> ValueResult<u8> {
        Ok(self.read::<1>(offset)?[0])
    }

    /// `setUint8`
    pub fn set_uint8(&self, offset: usize, value: u8) -> ValueResult<()> {
        self.write(offset, &[value])
    }

    /// `getUint32`
    pub fn get_uint32(&self, offset: usize, little_endian: bool) -> ValueResult<u32> {
        let raw = self.read::<4>(offset)?;
        Ok(if little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    /// `setUint32`
    pub fn set_uint32(&self, offset: usize, value: u32, little_endian: bool) -> ValueResult<()> {
        let raw = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write(offset, &raw)
    }

    /// `getFloat64`
    pub fn get_float64(&self, offset: usize, little_endian: bool) -> ValueResult<f64> {
        let raw = self.read::<8>(offset)?;
        Ok(if little_endian {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }

    /// `setFloat64`
    pub fn set_float64(&self, offset: usize, value: f64, little_endian: bool) -> ValueResult<()> {
        let raw = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.write(offset, &raw)
    }
}
