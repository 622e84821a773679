use crate::cursor::{BinaryCursor, ByteOrder};
use crate::error::{Error, Result};
use crate::ids::{self, ChunkID};
use log::{debug, trace};

/// Size of a chunk header on the wire: 4 byte id + 4 byte size.
pub const HEADER_LEN: usize = 8;

// The first 8 bytes of a chunk are chunk ID and chunk size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkID,
    /// Byte count of the body. Claimed by the data, so never trusted as is.
    pub size: u32,
}

impl ChunkHeader {
    pub fn read(cursor: &mut BinaryCursor, order: ByteOrder) -> Result<ChunkHeader> {
        let id = cursor.read_array::<4>()?;
        let size = cursor.read_u32(order)?;
        Ok(ChunkHeader { id, size })
    }

    pub fn write(&self, cursor: &mut BinaryCursor, order: ByteOrder) {
        cursor.write_bytes(&self.id);
        cursor.write_u32(self.size, order);
    }
}

/// Reads a 4 byte id and fails with [`Error::InvalidMagic`] unless it is
/// `expected`.
pub fn expect_id(cursor: &mut BinaryCursor, expected: &ChunkID) -> Result<()> {
    let found = cursor.read_array::<4>()?;
    if &found != expected {
        return Err(Error::InvalidMagic {
            expected: *expected,
            found,
        });
    }
    Ok(())
}

/// What happens to a chunk nobody claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownChunks {
    /// Fail with [`Error::UnknownChunk`].
    Reject,
    /// Skip the body by its declared size.
    Skip,
}

/// Whether a visitor handled a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Handled,
    Unknown,
}

/// Per-format chunk handlers driven by [`ChunkWalker`].
pub trait ChunkVisitor {
    /// Number of body bytes the handler for `header` will consume, given the
    /// bytes left in the cursor. Defaults to the declared size.
    fn body_len(&mut self, header: &ChunkHeader, _remaining: usize) -> u32 {
        header.size
    }

    /// Whether everything mandatory has been seen, so a tail too short for
    /// a chunk header may be left unwalked.
    fn is_complete(&self) -> bool {
        true
    }

    /// Consume exactly `body_len` bytes for a recognised chunk, or consume
    /// nothing and return [`Visit::Unknown`].
    fn visit(
        &mut self,
        header: &ChunkHeader,
        body_len: u32,
        cursor: &mut BinaryCursor,
    ) -> Result<Visit>;
}

/// Walks the chunks following a container's outer header until the cursor
/// is exhausted, checking after each handler that it consumed exactly its
/// chunk body.
pub struct ChunkWalker {
    order: ByteOrder,
    unknown: UnknownChunks,
    tolerate_short_tail: bool,
}

impl ChunkWalker {
    pub fn new(order: ByteOrder, unknown: UnknownChunks) -> ChunkWalker {
        ChunkWalker {
            order,
            unknown,
            tolerate_short_tail: false,
        }
    }

    /// Stop quietly when fewer bytes than a chunk header are left and the
    /// visitor reports itself complete, instead of failing with
    /// [`Error::TruncatedInput`].
    pub fn tolerate_short_tail(mut self, tolerate: bool) -> ChunkWalker {
        self.tolerate_short_tail = tolerate;
        self
    }

    /// Returns the number of unwalked bytes left at the end, which is
    /// always zero unless `tolerate_short_tail` is set.
    pub fn walk<V: ChunkVisitor>(
        &self,
        cursor: &mut BinaryCursor,
        visitor: &mut V,
    ) -> Result<usize> {
        while !cursor.is_exhausted() {
            if self.tolerate_short_tail
                && cursor.remaining() < HEADER_LEN
                && visitor.is_complete()
            {
                debug!("{} byte(s) left, too short for a chunk", cursor.remaining());
                return Ok(cursor.remaining());
            }

            let header = ChunkHeader::read(cursor, self.order)?;
            trace!(
                "chunk `{}` size {} at offset {}",
                ids::display(&header.id),
                header.size,
                cursor.position() - HEADER_LEN
            );

            let body_len = visitor.body_len(&header, cursor.remaining());
            let start = cursor.position();
            match visitor.visit(&header, body_len, cursor)? {
                Visit::Handled => {
                    let consumed = cursor.position() - start;
                    if consumed != body_len as usize {
                        return Err(Error::ChunkSizeMismatch {
                            id: header.id,
                            declared: body_len,
                            consumed,
                        });
                    }
                }
                Visit::Unknown => match self.unknown {
                    UnknownChunks::Reject => return Err(Error::UnknownChunk(header.id)),
                    UnknownChunks::Skip => {
                        debug!(
                            "skipping unknown chunk `{}` ({} bytes)",
                            ids::display(&header.id),
                            header.size
                        );
                        cursor.skip(header.size as usize)?;
                    }
                },
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const BODY: &ChunkID = b"BODY";

    /// Claims `BODY` chunks and consumes `body_len + skew` bytes of each.
    struct Recorder {
        skew: i64,
        seen: Vec<(ChunkID, u32)>,
    }

    impl ChunkVisitor for Recorder {
        fn visit(
            &mut self,
            header: &ChunkHeader,
            body_len: u32,
            cursor: &mut BinaryCursor,
        ) -> Result<Visit> {
            if &header.id != BODY {
                return Ok(Visit::Unknown);
            }
            cursor.skip((i64::from(body_len) + self.skew) as usize)?;
            self.seen.push((header.id, body_len));
            Ok(Visit::Handled)
        }
    }

    fn chunk(id: &ChunkID, body: &[u8]) -> Vec<u8> {
        let mut c = BinaryCursor::empty(ByteOrder::Big);
        ChunkHeader {
            id: *id,
            size: body.len() as u32,
        }
        .write(&mut c, ByteOrder::Big);
        c.write_bytes(body);
        c.into_inner()
    }

    fn walk(bytes: Vec<u8>, unknown: UnknownChunks, skew: i64) -> (Result<usize>, Recorder) {
        let mut cursor = BinaryCursor::new(bytes, ByteOrder::Big);
        let mut rec = Recorder { skew, seen: vec![] };
        let res = ChunkWalker::new(ByteOrder::Big, unknown).walk(&mut cursor, &mut rec);
        (res, rec)
    }

    #[test]
    fn visits_every_chunk_in_order() {
        let mut bytes = chunk(BODY, &[1, 2, 3]);
        bytes.extend(chunk(BODY, &[]));
        let (res, rec) = walk(bytes, UnknownChunks::Reject, 0);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(rec.seen, vec![(*BODY, 3), (*BODY, 0)]);
    }

    #[test]
    fn under_read_is_a_size_mismatch() {
        let (res, _) = walk(chunk(BODY, &[0; 4]), UnknownChunks::Reject, -2);
        match res {
            Err(Error::ChunkSizeMismatch {
                id,
                declared,
                consumed,
            }) => {
                assert_eq!(&id, BODY);
                assert_eq!(declared, 4);
                assert_eq!(consumed, 2);
            }
            other => panic!("expected ChunkSizeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn over_read_is_a_size_mismatch() {
        let mut bytes = chunk(BODY, &[0; 2]);
        bytes.extend(chunk(BODY, &[0; 2]));
        let (res, _) = walk(bytes, UnknownChunks::Reject, 1);
        assert!(matches!(
            res,
            Err(Error::ChunkSizeMismatch {
                declared: 2,
                consumed: 3,
                ..
            })
        ));
    }

    #[test]
    fn unknown_policy() {
        let mut bytes = chunk(b"JUNK", &[9; 5]);
        bytes.extend(chunk(BODY, &[0]));

        let (res, _) = walk(bytes.clone(), UnknownChunks::Reject, 0);
        assert!(matches!(res, Err(Error::UnknownChunk(id)) if &id == b"JUNK"));

        let (res, rec) = walk(bytes, UnknownChunks::Skip, 0);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(rec.seen, vec![(*BODY, 1)]);
    }

    #[test]
    fn skipping_past_the_end_is_truncated() {
        let mut bytes = chunk(b"JUNK", &[9; 5]);
        bytes.truncate(10);
        let (res, _) = walk(bytes, UnknownChunks::Skip, 0);
        assert!(matches!(
            res,
            Err(Error::TruncatedInput {
                requested: 5,
                remaining: 2
            })
        ));
    }

    #[test]
    fn short_tail() {
        let mut bytes = chunk(BODY, &[1]);
        bytes.extend(&[0, 0, 0]);

        let (res, _) = walk(bytes.clone(), UnknownChunks::Reject, 0);
        assert!(matches!(res, Err(Error::TruncatedInput { .. })));

        let mut cursor = BinaryCursor::new(bytes, ByteOrder::Big);
        let mut rec = Recorder { skew: 0, seen: vec![] };
        let left = ChunkWalker::new(ByteOrder::Big, UnknownChunks::Reject)
            .tolerate_short_tail(true)
            .walk(&mut cursor, &mut rec)
            .unwrap();
        assert_eq!(left, 3);
    }

    #[test]
    fn short_tail_needs_a_complete_visitor() {
        struct Pending;

        impl ChunkVisitor for Pending {
            fn is_complete(&self) -> bool {
                false
            }

            fn visit(&mut self, _: &ChunkHeader, _: u32, _: &mut BinaryCursor) -> Result<Visit> {
                Ok(Visit::Unknown)
            }
        }

        let mut cursor = BinaryCursor::new(vec![b'f', b'm', b't'], ByteOrder::Big);
        let res = ChunkWalker::new(ByteOrder::Big, UnknownChunks::Skip)
            .tolerate_short_tail(true)
            .walk(&mut cursor, &mut Pending);
        assert!(matches!(
            res,
            Err(Error::TruncatedInput {
                requested: 4,
                remaining: 3
            })
        ));
    }
}

/// Wraps a visitor and records how many body bytes each handled chunk took.
#[cfg(test)]
pub(crate) struct Spans<V> {
    pub inner: V,
    /// id, declared body length, bytes the handler consumed
    pub seen: Vec<(ChunkID, u32, usize)>,
}

#[cfg(test)]
impl<V: ChunkVisitor> Spans<V> {
    pub fn new(inner: V) -> Spans<V> {
        Spans { inner, seen: vec![] }
    }
}

#[cfg(test)]
impl<V: ChunkVisitor> ChunkVisitor for Spans<V> {
    fn body_len(&mut self, header: &ChunkHeader, remaining: usize) -> u32 {
        self.inner.body_len(header, remaining)
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn visit(
        &mut self,
        header: &ChunkHeader,
        body_len: u32,
        cursor: &mut BinaryCursor,
    ) -> Result<Visit> {
        let start = cursor.position();
        let visit = self.inner.visit(header, body_len, cursor)?;
        if visit == Visit::Handled {
            self.seen
                .push((header.id, header.size, cursor.position() - start));
        }
        Ok(visit)
    }
}
