// Tue Jan 13 2026 - Alex

use crate::hprof::{FieldType, FieldValue, HprofError, Id};
use bytes::{Buf, Bytes};

/// Big-endian cursor over an in-memory dump. Every read is bounds checked
/// and reports `Truncated` instead of panicking.
#[derive(Debug, Clone)]
pub struct HprofReader {
    buf: Bytes,
    total: usize,
    id_size: usize,
}

impl HprofReader {
    pub fn new(data: Bytes) -> Self {
        let total = data.len();
        Self {
            buf: data,
            total,
            id_size: 4,
        }
    }

    pub fn set_id_size(&mut self, id_size: usize) {
        self.id_size = id_size;
    }

    pub fn id_size(&self) -> usize {
        self.id_size
    }

    pub fn position(&self) -> u64 {
        (self.total - self.buf.remaining()) as u64
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn total_len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        !self.buf.has_remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), HprofError> {
        if self.buf.remaining() < needed {
            return Err(HprofError::Truncated {
                offset: self.position(),
                needed,
                available: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, HprofError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, HprofError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_u32(&mut self) -> Result<u32, HprofError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self) -> Result<i32, HprofError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_u64(&mut self) -> Result<u64, HprofError> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    pub fn read_id(&mut self) -> Result<Id, HprofError> {
        match self.id_size {
            4 => self.read_u32().map(|v| v as Id),
            _ => self.read_u64(),
        }
    }

    /// Zero-copy slice of the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes, HprofError> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    pub fn skip(&mut self, len: usize) -> Result<(), HprofError> {
        self.ensure(len)?;
        self.buf.advance(len);
        Ok(())
    }

    /// Reads bytes up to (and consuming) a NUL terminator.
    pub fn read_c_string(&mut self) -> Result<String, HprofError> {
        let start = self.position();
        match self.buf.iter().position(|&b| b == 0) {
            Some(end) => {
                let raw = self.buf.split_to(end);
                self.buf.advance(1);
                Ok(String::from_utf8_lossy(&raw).into_owned())
            }
            None => Err(HprofError::Truncated {
                offset: start,
                needed: self.buf.remaining() + 1,
                available: self.buf.remaining(),
            }),
        }
    }

    pub fn read_field_type(&mut self) -> Result<FieldType, HprofError> {
        let offset = self.position();
        let code = self.read_u8()?;
        FieldType::from_u8(code)
            .ok_or_else(|| HprofError::malformed(offset, format!("unknown basic type code {}", code)))
    }

    pub fn read_value(&mut self, ty: FieldType) -> Result<FieldValue, HprofError> {
        Ok(match ty {
            FieldType::Object => FieldValue::Object(self.read_id()?),
            FieldType::Boolean => FieldValue::Boolean(self.read_u8()? != 0),
            FieldType::Byte => FieldValue::Byte(self.read_u8()? as i8),
            FieldType::Char => FieldValue::Char(self.read_u16()?),
            FieldType::Short => FieldValue::Short(self.read_u16()? as i16),
            FieldType::Int => FieldValue::Int(self.read_i32()?),
            FieldType::Float => FieldValue::Float(f32::from_bits(self.read_u32()?)),
            FieldType::Long => FieldValue::Long(self.read_u64()? as i64),
            FieldType::Double => FieldValue::Double(f64::from_bits(self.read_u64()?)),
        })
    }
}

/// Decodes one value from a raw field buffer at `offset`. Returns `None`
/// when the slice is too short.
pub fn decode_value(data: &[u8], offset: usize, ty: FieldType, id_size: usize) -> Option<FieldValue> {
    let size = ty.size(id_size);
    let mut raw = data.get(offset..offset.checked_add(size)?)?;
    Some(match ty {
        FieldType::Object if id_size == 4 => FieldValue::Object(raw.get_u32() as Id),
        FieldType::Object => FieldValue::Object(raw.get_u64()),
        FieldType::Boolean => FieldValue::Boolean(raw.get_u8() != 0),
        FieldType::Byte => FieldValue::Byte(raw.get_i8()),
        FieldType::Char => FieldValue::Char(raw.get_u16()),
        FieldType::Short => FieldValue::Short(raw.get_i16()),
        FieldType::Int => FieldValue::Int(raw.get_i32()),
        FieldType::Float => FieldValue::Float(raw.get_f32()),
        FieldType::Long => FieldValue::Long(raw.get_i64()),
        FieldType::Double => FieldValue::Double(raw.get_f64()),
    })
}
