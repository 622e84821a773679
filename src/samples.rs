use crate::cursor::{BinaryCursor, ByteOrder};
use crate::error::{Error, Result};
use std::convert::TryFrom;

/// Storage width of one PCM sample.
///
/// Only the byte-aligned widths 8, 16 and 32 are supported. 24-bit audio is
/// rejected in both directions rather than read as silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleWidth {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl SampleWidth {
    pub fn bits(self) -> u16 {
        match self {
            SampleWidth::Eight => 8,
            SampleWidth::Sixteen => 16,
            SampleWidth::ThirtyTwo => 32,
        }
    }

    /// `ceil(bits / 8)`
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::Eight => 1,
            SampleWidth::Sixteen => 2,
            SampleWidth::ThirtyTwo => 4,
        }
    }

    /// Mask selecting the bits a sample of this width may use.
    pub fn mask(self) -> u32 {
        match self {
            SampleWidth::Eight => 0xff,
            SampleWidth::Sixteen => 0xffff,
            SampleWidth::ThirtyTwo => 0xffff_ffff,
        }
    }
}

impl TryFrom<u16> for SampleWidth {
    type Error = Error;

    fn try_from(bit_depth: u16) -> Result<Self> {
        match bit_depth {
            8 => Ok(SampleWidth::Eight),
            16 => Ok(SampleWidth::Sixteen),
            32 => Ok(SampleWidth::ThirtyTwo),
            b => Err(Error::UnsupportedBitDepth(b)),
        }
    }
}

/// An unsigned integer a sample is stored as, zero-extended into the `u32`
/// carrier on read and truncated back on write.
pub trait SampleType: Sized + Into<u32> {
    fn read(cursor: &mut BinaryCursor, order: ByteOrder) -> Result<Self>;

    fn truncate(carrier: u32) -> Self;

    fn write(self, cursor: &mut BinaryCursor, order: ByteOrder);
}

impl SampleType for u8 {
    fn read(cursor: &mut BinaryCursor, _order: ByteOrder) -> Result<Self> {
        cursor.read_u8()
    }

    fn truncate(carrier: u32) -> Self {
        carrier as u8
    }

    fn write(self, cursor: &mut BinaryCursor, _order: ByteOrder) {
        cursor.write_u8(self)
    }
}

impl SampleType for u16 {
    fn read(cursor: &mut BinaryCursor, order: ByteOrder) -> Result<Self> {
        cursor.read_u16(order)
    }

    fn truncate(carrier: u32) -> Self {
        carrier as u16
    }

    fn write(self, cursor: &mut BinaryCursor, order: ByteOrder) {
        cursor.write_u16(self, order)
    }
}

impl SampleType for u32 {
    fn read(cursor: &mut BinaryCursor, order: ByteOrder) -> Result<Self> {
        cursor.read_u32(order)
    }

    fn truncate(carrier: u32) -> Self {
        carrier
    }

    fn write(self, cursor: &mut BinaryCursor, order: ByteOrder) {
        cursor.write_u32(self, order)
    }
}

pub fn read_sample(
    cursor: &mut BinaryCursor,
    width: SampleWidth,
    order: ByteOrder,
) -> Result<u32> {
    Ok(match width {
        SampleWidth::Eight => u8::read(cursor, order)?.into(),
        SampleWidth::Sixteen => u16::read(cursor, order)?.into(),
        SampleWidth::ThirtyTwo => u32::read(cursor, order)?,
    })
}

/// Writes the low `width` bits of `value`; higher bits are dropped.
pub fn write_sample(
    cursor: &mut BinaryCursor,
    value: u32,
    width: SampleWidth,
    order: ByteOrder,
) {
    match width {
        SampleWidth::Eight => u8::truncate(value).write(cursor, order),
        SampleWidth::Sixteen => u16::truncate(value).write(cursor, order),
        SampleWidth::ThirtyTwo => u32::truncate(value).write(cursor, order),
    }
}

// Byte length of `count` samples, saturating so an absurd count fails the
// bounds check instead of wrapping.
fn span(count: usize, width: SampleWidth) -> usize {
    count.saturating_mul(width.bytes())
}

/// Reads one interleaved frame, appending sample `c` to `channels[c]`.
pub fn read_frame(
    cursor: &mut BinaryCursor,
    channels: &mut [Vec<u32>],
    width: SampleWidth,
    order: ByteOrder,
) -> Result<()> {
    cursor.peek_exact(span(channels.len(), width))?;
    for channel in channels.iter_mut() {
        channel.push(read_sample(cursor, width, order)?);
    }
    Ok(())
}

/// Writes frame `index` of every channel, interleaved.
pub fn write_frame(
    cursor: &mut BinaryCursor,
    channels: &[Vec<u32>],
    index: usize,
    width: SampleWidth,
    order: ByteOrder,
) {
    for channel in channels {
        write_sample(cursor, channel[index], width, order);
    }
}

/// Reads `count` consecutive samples of a single channel.
pub fn read_run(
    cursor: &mut BinaryCursor,
    count: usize,
    width: SampleWidth,
    order: ByteOrder,
) -> Result<Vec<u32>> {
    // bounds first, so a bogus count can't drive the allocation
    cursor.peek_exact(span(count, width))?;
    let mut run = Vec::with_capacity(count);
    for _ in 0..count {
        run.push(read_sample(cursor, width, order)?);
    }
    Ok(run)
}
