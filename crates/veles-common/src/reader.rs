//! Cursor over a borrowed container buffer.
//!
//! [`BinaryReader`] hands out fixed-size header records through zerocopy
//! and little-endian word tables such as palettes. The cursor never runs
//! past the end of the slice; short reads report how much was missing.

use zerocopy::FromBytes;

use crate::{Error, Result};

/// Forward-only reader over a byte slice.
///
/// # Example
///
/// ```
/// use veles_common::BinaryReader;
///
/// let data = [0x44, 0x44, 0x53, 0x20, 0x7c, 0x00, 0x00, 0x00];
/// let mut reader = BinaryReader::new(&data);
///
/// assert!(reader.check_magic(b"DDS "));
/// reader.advance(4);
/// assert_eq!(reader.read_u32_array::<1>().unwrap(), [124]);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Offset of the next unread byte.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Length of the whole buffer, read or not.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Skip `count` bytes. Skipping past the end leaves the reader empty.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(count)?;
        self.position += count;
        Ok(bytes)
    }

    fn peek(&self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if available < count {
            return Err(Error::UnexpectedEof { needed: count, available });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read `N` consecutive little-endian u32 values.
    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N]> {
        let bytes = self.take(N * 4)?;
        let mut out = [0u32; N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(out)
    }

    /// Read a plain-old-data record such as an on-disk header.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.take(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Compare the next bytes against `expected` without consuming them.
    ///
    /// Returns `false` when there are not enough bytes left.
    #[inline]
    pub fn check_magic(&self, expected: &[u8]) -> bool {
        self.peek(expected.len())
            .map(|actual| actual == expected)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

    use super::*;

    #[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Debug, PartialEq)]
    #[repr(C)]
    struct Pair {
        size: u32,
        flags: u32,
    }

    #[test]
    fn test_read_u32_array() {
        let data = [1u8, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32_array::<3>().unwrap(), [1, 2, 3]);
        assert!(reader.is_empty());
        assert!(reader.read_u32_array::<1>().is_err());
    }

    #[test]
    fn test_read_struct_after_magic() {
        let mut data = b"DDS ".to_vec();
        data.extend_from_slice(Pair { size: 124, flags: 0x1007 }.as_bytes());
        let mut reader = BinaryReader::new(&data);

        assert!(reader.check_magic(b"DDS "));
        assert_eq!(reader.position(), 0);
        reader.advance(4);
        assert_eq!(reader.read_struct::<Pair>().unwrap(), Pair { size: 124, flags: 0x1007 });
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_check_magic_short_buffer() {
        let data = *b"DDS";
        let reader = BinaryReader::new(&data);

        assert!(!reader.check_magic(b"DDS "));
        assert!(!reader.check_magic(b"XDS"));
        assert!(reader.check_magic(b"DD"));
    }

    #[test]
    fn test_short_read_reports_missing() {
        let data = [0u8; 6];
        let mut reader = BinaryReader::new(&data);
        reader.advance(2);

        match reader.read_struct::<Pair>() {
            Err(Error::UnexpectedEof { needed, available }) => {
                assert_eq!((needed, available), (8, 4));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(reader.remaining(), 4);
        assert_eq!(reader.len(), 6);
    }

    #[test]
    fn test_advance_past_end() {
        let data = [0u8; 4];
        let mut reader = BinaryReader::new(&data);
        reader.advance(10);

        assert!(reader.is_empty());
        assert_eq!(reader.remaining(), 0);
    }
}
