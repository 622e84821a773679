//! AIFF: big-endian IFF chunks inside a `FORM` / `AIFF` container.
//!
//! Only `NAME`, `COMM` and `SSND` are understood. Anything else inside the
//! form is rejected rather than skipped. Samples are stored one channel after
//! another, not interleaved.

use crate::chunks::{
    expect_id, ChunkHeader, ChunkVisitor, ChunkWalker, UnknownChunks, Visit, HEADER_LEN,
};
use crate::container::{AudioContainer, Decoded};
use crate::cursor::{BinaryCursor, ByteOrder};
use crate::error::{Error, Result};
use crate::extended::{self, Extended};
use crate::ids;
use crate::samples::{self, SampleWidth};
use log::{debug, trace, warn};
use std::convert::TryFrom;

const ORDER: ByteOrder = ByteOrder::Big;

/// channels u16 + frames u32 + sample size u16 + 80 bit rate
pub const COMMON_LEN: u32 = 18;
/// offset u32 + block size u32
const SOUND_HEADER_LEN: u32 = 8;

#[derive(Debug, Clone, Copy)]
struct CommonChunk {
    num_channels: u16,
    num_sample_frames: u32,
    width: SampleWidth,
    sample_rate: u32,
    /// Only set when the raw rate isn't the plain encoding of `sample_rate`.
    extended_rate: Option<Extended>,
}

impl CommonChunk {
    fn build(cursor: &mut BinaryCursor) -> Result<CommonChunk> {
        let num_channels = cursor.read_u16(ORDER)?;
        let num_sample_frames = cursor.read_u32(ORDER)?;
        let sample_size = cursor.read_u16(ORDER)?;
        let rate_raw: Extended = cursor.read_array()?;
        debug!(
            "COMM channels {} frames {} sample size {} rate {:02x?}",
            num_channels, num_sample_frames, sample_size, rate_raw
        );

        if num_channels == 0 {
            return Err(Error::InvalidField {
                field: "channel count",
                value: 0,
            });
        }
        let width = SampleWidth::try_from(sample_size)?;
        let sample_rate = extended::to_u32(&rate_raw);
        let extended_rate = if extended::is_canonical(&rate_raw) {
            None
        } else {
            warn!(
                "sample rate {:02x?} is not a whole u32, using {} Hz",
                rate_raw, sample_rate
            );
            Some(rate_raw)
        };

        Ok(CommonChunk {
            num_channels,
            num_sample_frames,
            width,
            sample_rate,
            extended_rate,
        })
    }

    /// Bytes the sound data chunk needs for this layout, offset and block
    /// size included.
    fn sound_len(&self) -> u64 {
        u64::from(SOUND_HEADER_LEN)
            + u64::from(self.num_channels)
                * u64::from(self.num_sample_frames)
                * self.width.bytes() as u64
    }
}

#[derive(Default)]
struct FormChunk {
    name: Option<String>,
    common: Option<CommonChunk>,
    sound: Option<Vec<Vec<u32>>>,
}

impl FormChunk {
    fn read_sound(&mut self, body_len: u32, cursor: &mut BinaryCursor) -> Result<()> {
        let common = self.common.ok_or(Error::MissingPrerequisiteChunk {
            chunk: *ids::SOUND,
            requires: *ids::COMMON,
        })?;
        if self.sound.is_some() {
            return Err(Error::DuplicateChunk(*ids::SOUND));
        }

        let needed = common.sound_len();
        if needed > u64::from(body_len) {
            return Err(Error::ChunkSizeMismatch {
                id: *ids::SOUND,
                declared: body_len,
                consumed: needed as usize,
            });
        }

        let offset = cursor.read_u32(ORDER)?;
        let block_size = cursor.read_u32(ORDER)?;
        debug!("SSND offset {} block size {}", offset, block_size);

        let frames = common.num_sample_frames as usize;
        let mut channels = Vec::with_capacity(usize::from(common.num_channels));
        for _ in 0..common.num_channels {
            channels.push(samples::read_run(cursor, frames, common.width, ORDER)?);
        }
        self.sound = Some(channels);
        Ok(())
    }
}

impl ChunkVisitor for FormChunk {
    fn visit(
        &mut self,
        header: &ChunkHeader,
        body_len: u32,
        cursor: &mut BinaryCursor,
    ) -> Result<Visit> {
        match &header.id {
            // the chunk size doubles as the name's length prefix
            ids::NAME => {
                let text = cursor.read_exact(body_len as usize)?;
                let name = String::from_utf8_lossy(text).into_owned();
                debug!("NAME {:?}", name);
                self.name = Some(name);
            }
            ids::COMMON => {
                if self.common.is_some() {
                    return Err(Error::DuplicateChunk(header.id));
                }
                self.common = Some(CommonChunk::build(cursor)?);
            }
            ids::SOUND => self.read_sound(body_len, cursor)?,
            _ => return Ok(Visit::Unknown),
        }
        Ok(Visit::Handled)
    }
}

/// Decodes a whole AIFF file.
pub fn decode(bytes: impl Into<Vec<u8>>) -> Result<Decoded> {
    let mut cursor = BinaryCursor::new(bytes.into(), ORDER);

    expect_id(&mut cursor, ids::FORM)?;
    let form_size = cursor.read_u32(ORDER)?;
    expect_id(&mut cursor, ids::AIFF)?;
    trace!("FORM size {} buffer {}", form_size, cursor.len());
    if form_size as usize != cursor.len() - HEADER_LEN {
        warn!(
            "FORM declares {} bytes, buffer holds {} after the header",
            form_size,
            cursor.len() - HEADER_LEN
        );
    }

    let mut form = FormChunk::default();
    ChunkWalker::new(ORDER, UnknownChunks::Reject).walk(&mut cursor, &mut form)?;

    let common = form.common.ok_or(Error::MissingChunk(*ids::COMMON))?;
    let channels = form.sound.ok_or(Error::MissingChunk(*ids::SOUND))?;

    Ok(Decoded {
        container: AudioContainer {
            sample_rate: common.sample_rate,
            bit_depth: common.width.bits(),
            name: form.name,
            extended_rate: common.extended_rate,
            channels,
        },
        diagnostics: vec![],
    })
}

/// Encodes `container` as `FORM` / `COMM` / `NAME` / `SSND`.
pub fn encode(container: &AudioContainer) -> Result<Vec<u8>> {
    let width = container.validate()?;

    let name = container.name.as_ref().map(|n| n.as_bytes());
    let name_len = name.map_or(0, |n| HEADER_LEN as u64 + n.len() as u64);
    // form type + COMM + NAME + SSND headers and fixed fields
    let overhead = 4
        + HEADER_LEN as u64
        + u64::from(COMMON_LEN)
        + name_len
        + HEADER_LEN as u64
        + u64::from(SOUND_HEADER_LEN);
    let data_len = container.sample_bytes(width, overhead)?;
    let sound_len = SOUND_HEADER_LEN + data_len;
    let form_len = overhead as u32 + data_len;

    let mut cursor = BinaryCursor::with_capacity(form_len as usize + HEADER_LEN, ORDER);

    ChunkHeader {
        id: *ids::FORM,
        size: form_len,
    }
    .write(&mut cursor, ORDER);
    cursor.write_bytes(ids::AIFF);

    ChunkHeader {
        id: *ids::COMMON,
        size: COMMON_LEN,
    }
    .write(&mut cursor, ORDER);
    cursor.write_u16(container.channel_count() as u16, ORDER);
    cursor.write_u32(container.frame_count() as u32, ORDER);
    cursor.write_u16(width.bits(), ORDER);
    let rate = match container.extended_rate {
        Some(raw) if extended::to_u32(&raw) == container.sample_rate => raw,
        _ => extended::from_u32(container.sample_rate),
    };
    cursor.write_bytes(&rate);

    if let Some(name) = name {
        cursor.write_bytes(ids::NAME);
        cursor.write_length_prefixed_string(name)?;
    }

    ChunkHeader {
        id: *ids::SOUND,
        size: sound_len,
    }
    .write(&mut cursor, ORDER);
    cursor.write_u32(0, ORDER); // offset
    cursor.write_u32(0, ORDER); // block size
    for channel in &container.channels {
        for &sample in channel {
            samples::write_sample(&mut cursor, sample, width, ORDER);
        }
    }

    debug!(
        "encoded AIFF: {} channel(s) x {} frame(s), {} bytes",
        container.channel_count(),
        container.frame_count(),
        cursor.len()
    );
    Ok(cursor.into_inner())
}
