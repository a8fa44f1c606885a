//! Location of the Pixel Data element inside the original buffer
//!
//! The parser never copies the pixel payload. It records where the value
//! starts and how long it is, and callers slice the buffer they already own.

use super::vr::Vr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDataRef {
    /// Byte offset of the first value byte
    pub offset: usize,
    /// Value length in bytes. For encapsulated data this spans the item
    /// headers and fragments, excluding the sequence delimiter.
    pub length: usize,
    pub vr: Vr,
    /// Undefined-length (compressed, fragment-based) pixel data
    pub encapsulated: bool,
}

impl PixelDataRef {
    /// Borrow the pixel bytes from the buffer the reference was parsed from
    #[must_use]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.offset..self.offset.checked_add(self.length)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_is_bounds_checked() {
        let buf = [1u8, 2, 3, 4, 5];
        let inside = PixelDataRef { offset: 1, length: 3, vr: Vr::OW, encapsulated: false };
        assert_eq!(inside.slice(&buf), Some(&buf[1..4]));

        let outside = PixelDataRef { offset: 3, length: 5, vr: Vr::OW, encapsulated: false };
        assert_eq!(outside.slice(&buf), None);
    }
}
