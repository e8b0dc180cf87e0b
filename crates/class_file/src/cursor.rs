use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// A bounds-checked read position over a borrowed class file buffer.
///
/// Every read either consumes exactly the bytes it asks for or fails with
/// [`ClassFileError::OutOfBounds`] and leaves the offset where it was.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.buf.len() {
            return Err(ClassFileError::OutOfBounds {
                offset,
                needed: 0,
                len: self.buf.len(),
            });
        }

        self.offset = offset;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(ClassFileError::OutOfBounds {
                offset: self.offset,
                needed: n,
                len: self.buf.len(),
            });
        }

        let bytes = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(Endian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(Endian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(Endian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(Endian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(Endian::read_i64(self.read_bytes(8)?))
    }
}
