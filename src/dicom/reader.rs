//! Little-endian cursor over a byte buffer

use super::dataset::{Tag, Value};
use super::error::ParseError;
use super::vr::Vr;

/// Length value marking an element or item of undefined length
pub const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

/// Read cursor over a borrowed buffer. Every read is bounds-checked and
/// fails with [`ParseError::TruncatedData`] instead of panicking.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[must_use]
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[must_use]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    fn ensure(&self, needed: usize) -> Result<(), ParseError> {
        if needed > self.remaining() {
            return Err(ParseError::TruncatedData {
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.ensure(n)?;
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_tag(&mut self) -> Result<Tag, ParseError> {
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        Ok(Tag::new(group, element))
    }

    /// Look at the next tag without consuming it
    pub fn peek_tag(&self) -> Result<Tag, ParseError> {
        self.clone().read_tag()
    }

    /// Read the two VR characters of an explicit VR header
    pub fn read_vr_bytes(&mut self) -> Result<[u8; 2], ParseError> {
        let b = self.read_bytes(2)?;
        Ok([b[0], b[1]])
    }

    /// Read `len` bytes and decode them according to `vr`
    pub fn read_value(&mut self, vr: Vr, len: usize) -> Result<Value, ParseError> {
        let bytes = self.read_bytes(len)?;
        Ok(decode_value(vr, bytes))
    }
}

/// Decode a primitive (non-sequence) value
#[must_use]
pub fn decode_value(vr: Vr, bytes: &[u8]) -> Value {
    match vr {
        Vr::US => Value::Int(
            bytes
                .chunks_exact(2)
                .map(|c| i64::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
        ),
        Vr::SS => Value::Int(
            bytes
                .chunks_exact(2)
                .map(|c| i64::from(i16::from_le_bytes([c[0], c[1]])))
                .collect(),
        ),
        Vr::UL => Value::Int(
            bytes
                .chunks_exact(4)
                .map(|c| i64::from(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        ),
        Vr::SL => Value::Int(
            bytes
                .chunks_exact(4)
                .map(|c| i64::from(i32::from_le_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        ),
        Vr::SV => Value::Int(
            bytes
                .chunks_exact(8)
                .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        Vr::FL => Value::Float(
            bytes
                .chunks_exact(4)
                .map(|c| f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]])))
                .collect(),
        ),
        Vr::FD => Value::Float(
            bytes
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        vr if vr.is_text() => {
            let text = String::from_utf8_lossy(bytes);
            Value::Str(text.trim_end_matches('\0').to_string())
        }
        _ => Value::Bytes(bytes.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn reads_little_endian() {
        let buf = [0x08, 0x00, 0x20, 0x00, 0x78, 0x56, 0x34, 0x12];
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.peek_tag().unwrap(), Tag::new(0x0008, 0x0020));
        assert_eq!(reader.read_tag().unwrap(), Tag::new(0x0008, 0x0020));
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert!(reader.is_empty());
    }

    #[test]
    fn truncated_read_reports_offset() {
        let buf = [0u8; 3];
        let mut reader = ByteReader::new(&buf);
        reader.skip(2).unwrap();
        assert_matches!(
            reader.read_u16(),
            Err(ParseError::TruncatedData { offset: 2, needed: 2, available: 1 })
        );
    }

    #[test]
    fn decodes_numeric_values() {
        assert_eq!(decode_value(Vr::US, &[0x00, 0x02]), Value::Int(vec![512]));
        assert_eq!(decode_value(Vr::SS, &[0xFF, 0xFF]), Value::Int(vec![-1]));
        assert_eq!(
            decode_value(Vr::FD, &1.5f64.to_le_bytes()),
            Value::Float(vec![1.5])
        );
    }

    #[test]
    fn strips_nul_padding_from_text() {
        assert_eq!(
            decode_value(Vr::UI, b"1.2.3\0"),
            Value::Str("1.2.3".to_string())
        );
        assert_eq!(
            decode_value(Vr::PN, b"Doe^John"),
            Value::Str("Doe^John".to_string())
        );
    }
}
