//! Sequential byte cursor shared by every encoder and decoder in the crate.
//!
//! The wire convention is borsh-compatible: little-endian fixed-width
//! integers, u32 length prefixes on strings and sequences, a one-byte
//! presence tag on optionals, no alignment or padding anywhere. The on-chain
//! program reads instruction data with exactly these rules, so nothing here
//! may change without a coordinated program deploy.

use solana_sdk::pubkey::Pubkey;

use crate::error::{ProtocolError, Result};

// ---------- Writer ----------

/// Growable output buffer with an implicit cursor at the end.
///
/// Numeric writes cannot fail; the fallible methods are the ones that emit a
/// u32 prefix that a pathological input could overflow.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_pubkey(&mut self, key: &Pubkey) {
        self.buf.extend_from_slice(key.as_ref());
    }

    /// u32 byte length followed by the UTF-8 bytes.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        let len = u32::try_from(s.len()).map_err(|_| ProtocolError::RangeViolation {
            field: "string length",
            value: s.len() as u64,
            limit: u32::MAX as u64,
        })?;
        self.write_u32(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// u32 element count followed by each item in order.
    pub fn write_seq<T>(
        &mut self,
        items: &[T],
        mut item: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        let count = u32::try_from(items.len()).map_err(|_| ProtocolError::RangeViolation {
            field: "sequence length",
            value: items.len() as u64,
            limit: u32::MAX as u64,
        })?;
        self.write_u32(count);
        for it in items {
            item(self, it)?;
        }
        Ok(())
    }

    /// Presence tag (0 absent, 1 present) followed by the payload if any.
    pub fn write_option<T>(
        &mut self,
        value: Option<&T>,
        item: impl FnOnce(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        match value {
            None => {
                self.write_u8(0);
                Ok(())
            }
            Some(v) => {
                self.write_u8(1);
                item(self, v)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ---------- Reader ----------

/// Borrowed slice plus a cursor. Every read is bounds-checked; on failure the
/// cursor position is unspecified and the reader should be dropped.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Moves the cursor to an absolute offset. Used by the Market decoder to
    /// rewind after probing the layout; `pos` past the end is an underrun.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(ProtocolError::BufferUnderrun {
                offset: pos,
                needed: 0,
                len: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(ProtocolError::BufferUnderrun {
                offset: self.pos,
                needed: n,
                len: self.buf.len(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    /// Strict 0/1, matching how the program's borsh layer rejects other
    /// values.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(ProtocolError::UnknownTag { kind: "bool", tag }),
        }
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey> {
        let bytes: [u8; 32] = self.take(32)?.try_into().unwrap();
        Ok(Pubkey::new_from_array(bytes))
    }

    pub fn read_str(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8 {
            field: "string",
        })
    }

    pub fn read_seq<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        // every element occupies at least one byte, so a count larger than
        // the bytes left is always corrupt
        if count > self.remaining() {
            return Err(ProtocolError::BufferUnderrun {
                offset: self.pos,
                needed: count,
                len: self.buf.len(),
            });
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(item(self)?);
        }
        Ok(out)
    }

    pub fn read_option<T>(
        &mut self,
        item: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(item(self)?)),
            tag => Err(ProtocolError::UnknownTag {
                kind: "presence",
                tag,
            }),
        }
    }
}
