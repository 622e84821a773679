use crate::error::{Error, Result};
use bytes::{Buf, BufMut};
use std::convert::TryFrom;

/// Byte order of a multi-byte field. Always chosen by the codec, never taken
/// from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// An owned byte buffer with a read position.
///
/// Reads are bounds checked and fail with [`Error::TruncatedInput`] without
/// touching the buffer. Writes always append. A cursor lives for exactly one
/// decode or encode call.
#[derive(Debug, Clone)]
pub struct BinaryCursor {
    buf: Vec<u8>,
    pos: usize,
    order: ByteOrder,
}

impl BinaryCursor {
    /// Cursor over `buf` with the read position at the start. `order` only
    /// governs the length prefix of strings; numeric reads name their order.
    pub fn new(buf: Vec<u8>, order: ByteOrder) -> BinaryCursor {
        BinaryCursor { buf, pos: 0, order }
    }

    /// Empty cursor for writing.
    pub fn empty(order: ByteOrder) -> BinaryCursor {
        BinaryCursor::new(Vec::new(), order)
    }

    pub fn with_capacity(capacity: usize, order: ByteOrder) -> BinaryCursor {
        BinaryCursor::new(Vec::with_capacity(capacity), order)
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    fn check(&self, n: usize) -> Result<()> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::TruncatedInput {
                requested: n,
                remaining,
            });
        }
        Ok(())
    }

    pub fn peek_exact(&self, n: usize) -> Result<&[u8]> {
        self.check(n)?;
        Ok(&self.buf[self.pos..self.pos + n])
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&[u8]> {
        self.check(n)?;
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Reads exactly `N` bytes into an array, e.g. a chunk id.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact(1)?.get_u8())
    }

    pub fn read_u16(&mut self, order: ByteOrder) -> Result<u16> {
        let mut b = self.read_exact(2)?;
        Ok(match order {
            ByteOrder::Big => b.get_u16(),
            ByteOrder::Little => b.get_u16_le(),
        })
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32> {
        let mut b = self.read_exact(4)?;
        Ok(match order {
            ByteOrder::Big => b.get_u32(),
            ByteOrder::Little => b.get_u32_le(),
        })
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16, order: ByteOrder) {
        match order {
            ByteOrder::Big => self.buf.put_u16(value),
            ByteOrder::Little => self.buf.put_u16_le(value),
        }
    }

    pub fn write_u32(&mut self, value: u32, order: ByteOrder) {
        match order {
            ByteOrder::Big => self.buf.put_u32(value),
            ByteOrder::Little => self.buf.put_u32_le(value),
        }
    }

    /// A u32 length in the cursor's byte order, then that many raw bytes.
    pub fn read_length_prefixed_string(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32(self.order)? as usize;
        Ok(self.read_exact(len)?.to_vec())
    }

    /// Fails without writing anything if `bytes` is too long for the prefix.
    pub fn write_length_prefixed_string(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| {
            Error::InvalidContainer(format!(
                "{} byte string does not fit a u32 length prefix",
                bytes.len()
            ))
        })?;
        self.write_u32(len, self.order);
        self.write_bytes(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_both_byte_orders() {
        let mut c = BinaryCursor::new(vec![0x12, 0x34, 0x12, 0x34, 0, 1, 0, 0], ByteOrder::Big);
        assert_eq!(c.read_u16(ByteOrder::Big).unwrap(), 0x1234);
        assert_eq!(c.read_u16(ByteOrder::Little).unwrap(), 0x3412);
        assert_eq!(c.read_u32(ByteOrder::Big).unwrap(), 0x0001_0000);
        assert!(c.is_exhausted());
    }

    #[test]
    fn writes_both_byte_orders() {
        let mut c = BinaryCursor::empty(ByteOrder::Little);
        c.write_u32(0x0001_0000, ByteOrder::Big);
        c.write_u32(0x0001_0000, ByteOrder::Little);
        c.write_u16(0xabcd, ByteOrder::Little);
        c.write_u8(7);
        assert_eq!(
            c.into_inner(),
            vec![0, 1, 0, 0, 0, 0, 1, 0, 0xcd, 0xab, 7]
        );
    }

    #[test]
    fn peek_does_not_advance() {
        let mut c = BinaryCursor::new(b"abcd".to_vec(), ByteOrder::Big);
        assert_eq!(c.peek_exact(2).unwrap(), b"ab");
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_exact(3).unwrap(), b"abc");
        assert_eq!(c.remaining(), 1);
    }

    #[test]
    fn over_read_reports_request_and_remaining() {
        let mut c = BinaryCursor::new(vec![1, 2, 3], ByteOrder::Little);
        c.skip(1).unwrap();
        match c.read_u32(ByteOrder::Little) {
            Err(Error::TruncatedInput {
                requested,
                remaining,
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected TruncatedInput, got {:?}", other),
        }
        assert!(c.skip(3).is_err());
        assert!(c.peek_exact(3).is_err());
        assert_eq!(c.read_u16(ByteOrder::Little).unwrap(), 0x0302);
    }

    #[test]
    fn length_prefixed_string_uses_cursor_order() {
        let mut c = BinaryCursor::empty(ByteOrder::Big);
        c.write_length_prefixed_string(b"Loop 1").unwrap();
        let bytes = c.into_inner();
        assert_eq!(&bytes[..4], &[0, 0, 0, 6]);

        let mut c = BinaryCursor::new(bytes, ByteOrder::Big);
        assert_eq!(c.read_length_prefixed_string().unwrap(), b"Loop 1".to_vec());
        assert!(c.is_exhausted());
    }

    #[test]
    fn empty_string_is_only_a_prefix() {
        let mut c = BinaryCursor::empty(ByteOrder::Little);
        assert!(c.write_length_prefixed_string(b"").is_ok());
        assert_eq!(c.into_inner(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn length_prefix_past_end_is_truncated() {
        let mut c = BinaryCursor::new(vec![9, 0, 0, 0, b'x'], ByteOrder::Little);
        assert!(matches!(
            c.read_length_prefixed_string(),
            Err(Error::TruncatedInput {
                requested: 9,
                remaining: 1
            })
        ));
    }
}
