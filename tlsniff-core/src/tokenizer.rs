//! Bounds-checked binary reader.
//!
//! A [`Tokenizer`] walks a byte slice with a moving offset. Every read either
//! succeeds and advances, or fails without moving the offset.
//!
//! Whether running out of bytes is an [`Underrun`](ParseError::Underrun) or
//! [`Malformed`](ParseError::Malformed) depends on how the tokenizer was built:
//!
//! - [`Tokenizer::streaming`] wraps the accumulation buffer. More bytes may still
//!   arrive, so a short read is an underrun.
//! - [`Tokenizer::new`] wraps a structure whose length is already known (a record
//!   payload, a message body, a length-prefixed vector). A short read there means a
//!   nested length field lied about its size.
//!
//! ```rust
//! use tlsniff_core::tokenizer::Tokenizer;
//! use tlsniff_core::error::ParseError;
//!
//! let mut tk = Tokenizer::streaming(&[0x00, 0x03, 0xAA]);
//! let cp = tk.checkpoint();
//! assert_eq!(tk.read_u16_prefixed("name"), Err(ParseError::Underrun));
//! tk.rollback(cp);
//! assert_eq!(tk.offset(), 0);
//! ```

use crate::error::ParseError;
use bytes::Buf;

/// Parse result for tokenizer reads.
pub type ParseResult<T> = Result<T, ParseError>;

/// Width of a big-endian length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// 1-byte length
    U8,
    /// 2-byte length
    U16,
    /// 3-byte length
    U24,
}

impl LengthPrefix {
    /// Number of bytes the prefix occupies.
    pub const fn width(self) -> usize {
        match self {
            LengthPrefix::U8 => 1,
            LengthPrefix::U16 => 2,
            LengthPrefix::U24 => 3,
        }
    }
}

/// Saved tokenizer position, see [`Tokenizer::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Bounds-checked big-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    data: &'a [u8],
    offset: usize,
    expect_more: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over a complete structure.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            expect_more: false,
        }
    }

    /// Create a tokenizer over a buffer that may grow later.
    pub fn streaming(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            expect_more: true,
        }
    }

    /// Bytes read so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check whether every byte has been read.
    pub fn at_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Save the current position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.offset)
    }

    /// Return to a saved position, discarding every read made since.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.0 <= self.data.len());
        self.offset = checkpoint.0;
    }

    fn need(&self, n: usize, what: &str) -> ParseResult<()> {
        if self.remaining() >= n {
            Ok(())
        } else if self.expect_more {
            Err(ParseError::Underrun)
        } else {
            Err(ParseError::Malformed(format!(
                "{}: need {} bytes, {} remain",
                what,
                n,
                self.remaining()
            )))
        }
    }

    fn cursor(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    /// Read an unsigned 8-bit integer.
    pub fn read_u8(&mut self, what: &str) -> ParseResult<u8> {
        self.need(1, what)?;
        let value = self.cursor().get_u8();
        self.offset += 1;
        Ok(value)
    }

    /// Read a big-endian unsigned 16-bit integer.
    pub fn read_u16(&mut self, what: &str) -> ParseResult<u16> {
        self.need(2, what)?;
        let value = self.cursor().get_u16();
        self.offset += 2;
        Ok(value)
    }

    /// Read a big-endian unsigned 24-bit integer.
    pub fn read_u24(&mut self, what: &str) -> ParseResult<u32> {
        self.need(3, what)?;
        let value = self.cursor().get_uint(3) as u32;
        self.offset += 3;
        Ok(value)
    }

    /// Read a big-endian unsigned 32-bit integer.
    pub fn read_u32(&mut self, what: &str) -> ParseResult<u32> {
        self.need(4, what)?;
        let value = self.cursor().get_u32();
        self.offset += 4;
        Ok(value)
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize, what: &str) -> ParseResult<&'a [u8]> {
        self.need(n, what)?;
        let area = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(area)
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self, what: &str) -> ParseResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N, what)?);
        Ok(out)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize, what: &str) -> ParseResult<()> {
        self.read_bytes(n, what).map(|_| ())
    }

    /// Read a block preceded by a big-endian length of the given width.
    ///
    /// Either the prefix and the whole block are consumed, or nothing is.
    pub fn read_prefixed(&mut self, prefix: LengthPrefix, what: &str) -> ParseResult<&'a [u8]> {
        let start = self.checkpoint();
        let len = match prefix {
            LengthPrefix::U8 => self.read_u8(what)? as usize,
            LengthPrefix::U16 => self.read_u16(what)? as usize,
            LengthPrefix::U24 => self.read_u24(what)? as usize,
        };
        match self.read_bytes(len, what) {
            Ok(block) => Ok(block),
            Err(e) => {
                self.rollback(start);
                Err(e)
            },
        }
    }

    /// Read a block with a 1-byte length prefix.
    pub fn read_u8_prefixed(&mut self, what: &str) -> ParseResult<&'a [u8]> {
        self.read_prefixed(LengthPrefix::U8, what)
    }

    /// Read a block with a 2-byte length prefix.
    pub fn read_u16_prefixed(&mut self, what: &str) -> ParseResult<&'a [u8]> {
        self.read_prefixed(LengthPrefix::U16, what)
    }

    /// Read a block with a 3-byte length prefix.
    pub fn read_u24_prefixed(&mut self, what: &str) -> ParseResult<&'a [u8]> {
        self.read_prefixed(LengthPrefix::U24, what)
    }

    /// Consume everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = self.cursor();
        self.offset = self.data.len();
        rest
    }

    /// Fail with [`ParseError::Malformed`] if any bytes are left over.
    pub fn expect_end(&self, what: &str) -> ParseResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(ParseError::Malformed(format!(
                "{}: {} trailing bytes",
                what,
                self.remaining()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A];
        let mut tk = Tokenizer::new(&data);
        assert_eq!(tk.read_u8("a").unwrap(), 0x01);
        assert_eq!(tk.read_u16("b").unwrap(), 0x0203);
        assert_eq!(tk.read_u24("c").unwrap(), 0x040506);
        assert_eq!(tk.read_u32("d").unwrap(), 0x0708090A);
        assert!(tk.at_end());
    }

    #[test]
    fn test_shortage_depends_on_mode() {
        let data = [0x01];
        let mut bounded = Tokenizer::new(&data);
        assert!(matches!(
            bounded.read_u16("version"),
            Err(ParseError::Malformed(_))
        ));
        assert_eq!(bounded.offset(), 0);

        let mut streaming = Tokenizer::streaming(&data);
        assert_eq!(streaming.read_u16("version"), Err(ParseError::Underrun));
        assert_eq!(streaming.offset(), 0);
    }

    #[test]
    fn test_prefixed_reads() {
        let data = [0x02, 0xAA, 0xBB, 0x00, 0x01, 0xCC, 0x00, 0x00, 0x01, 0xDD];
        let mut tk = Tokenizer::new(&data);
        assert_eq!(tk.read_u8_prefixed("one").unwrap(), &[0xAA, 0xBB]);
        assert_eq!(tk.read_u16_prefixed("two").unwrap(), &[0xCC]);
        assert_eq!(tk.read_u24_prefixed("three").unwrap(), &[0xDD]);
        assert!(tk.expect_end("all").is_ok());
    }

    #[test]
    fn test_prefixed_read_is_atomic() {
        // Declares 5 bytes, has 2
        let data = [0x00, 0x05, 0xAA, 0xBB];
        let mut tk = Tokenizer::new(&data);
        let err = tk.read_u16_prefixed("extensions").unwrap_err();
        assert!(matches!(err, ParseError::Malformed(ref m) if m.starts_with("extensions")));
        assert_eq!(tk.offset(), 0);

        let mut tk = Tokenizer::streaming(&data);
        assert_eq!(tk.read_u16_prefixed("extensions"), Err(ParseError::Underrun));
        assert_eq!(tk.offset(), 0);
    }

    #[test]
    fn test_checkpoint_rollback() {
        let data = [0x16, 0x03, 0x01, 0x00];
        let mut tk = Tokenizer::streaming(&data);
        let cp = tk.checkpoint();
        tk.read_u8("type").unwrap();
        tk.read_u16("version").unwrap();
        assert_eq!(tk.read_u16("length"), Err(ParseError::Underrun));
        tk.rollback(cp);
        assert_eq!(tk.offset(), 0);
        assert_eq!(tk.remaining(), 4);
    }

    #[test]
    fn test_array_rest_and_trailing() {
        let data = [1, 2, 3, 4, 5];
        let mut tk = Tokenizer::new(&data);
        let head: [u8; 2] = tk.read_array("head").unwrap();
        assert_eq!(head, [1, 2]);
        assert!(tk.expect_end("body").is_err());
        tk.skip(1, "pad").unwrap();
        assert_eq!(tk.rest(), &[4, 5]);
        assert!(tk.at_end());
    }
}
