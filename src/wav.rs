//! WAV: little-endian RIFF chunks inside a `RIFF` / `WAVE` container.
//!
//! Unlike AIFF, chunks this codec doesn't know are skipped, a `data` chunk
//! that overstates its size is clamped, and stray bytes at the end are
//! discarded. Each of those is reported as a [`Diagnostic`].

use crate::chunks::{
    expect_id, ChunkHeader, ChunkVisitor, ChunkWalker, UnknownChunks, Visit, HEADER_LEN,
};
use crate::container::{AudioContainer, Decoded, Diagnostic};
use crate::cursor::{BinaryCursor, ByteOrder};
use crate::error::{Error, Result};
use crate::ids;
use crate::samples::{self, SampleWidth};
use log::{debug, trace, warn};
use std::convert::TryFrom;

const ORDER: ByteOrder = ByteOrder::Little;

pub const FORMAT_PCM: u16 = 1;
/// Length of the PCM format record; longer `fmt ` bodies carry extensions.
pub const FORMAT_LEN: u32 = 16;

#[derive(Debug, Clone, Copy)]
struct FormatChunk {
    num_channels: u16,
    sample_rate: u32,
    block_align: u16,
    width: SampleWidth,
}

impl FormatChunk {
    fn build(body_len: u32, cursor: &mut BinaryCursor) -> Result<FormatChunk> {
        if body_len < FORMAT_LEN {
            return Err(Error::ChunkSizeMismatch {
                id: *ids::FORMAT,
                declared: body_len,
                consumed: FORMAT_LEN as usize,
            });
        }

        let audio_format = cursor.read_u16(ORDER)?;
        let num_channels = cursor.read_u16(ORDER)?;
        let sample_rate = cursor.read_u32(ORDER)?;
        let byte_rate = cursor.read_u32(ORDER)?;
        let block_align = cursor.read_u16(ORDER)?;
        let bit_depth = cursor.read_u16(ORDER)?;
        debug!(
            "fmt format {} channels {} rate {} byte rate {} block align {} bits {}",
            audio_format, num_channels, sample_rate, byte_rate, block_align, bit_depth
        );

        if body_len > FORMAT_LEN {
            debug!("skipping {} byte(s) of fmt extension", body_len - FORMAT_LEN);
            cursor.skip((body_len - FORMAT_LEN) as usize)?;
        }

        if audio_format != FORMAT_PCM {
            return Err(Error::UnsupportedEncoding(audio_format));
        }
        if num_channels == 0 {
            return Err(Error::InvalidField {
                field: "channel count",
                value: 0,
            });
        }
        let width = SampleWidth::try_from(bit_depth)?;
        if usize::from(block_align) != usize::from(num_channels) * width.bytes() {
            return Err(Error::InvalidField {
                field: "block align",
                value: u32::from(block_align),
            });
        }
        if u64::from(byte_rate) != u64::from(sample_rate) * u64::from(block_align) {
            debug!("byte rate {} disagrees with the format, ignored", byte_rate);
        }

        Ok(FormatChunk {
            num_channels,
            sample_rate,
            block_align,
            width,
        })
    }
}

#[derive(Default)]
struct WaveChunks {
    format: Option<FormatChunk>,
    data: Option<Vec<Vec<u32>>>,
    diagnostics: Vec<Diagnostic>,
}

impl WaveChunks {
    fn read_data(&mut self, body_len: u32, cursor: &mut BinaryCursor) -> Result<()> {
        let format = self.format.ok_or(Error::MissingPrerequisiteChunk {
            chunk: *ids::DATA,
            requires: *ids::FORMAT,
        })?;
        if self.data.is_some() {
            return Err(Error::DuplicateChunk(*ids::DATA));
        }

        let block_align = u32::from(format.block_align);
        let frames = (body_len / block_align) as usize;
        let mut channels: Vec<Vec<u32>> = (0..format.num_channels)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for _ in 0..frames {
            samples::read_frame(cursor, &mut channels, format.width, ORDER)?;
        }

        let partial = body_len % block_align;
        if partial > 0 {
            debug!("dropping {} byte(s) of incomplete frame", partial);
            cursor.skip(partial as usize)?;
        }
        trace!("data {} frame(s)", frames);

        self.data = Some(channels);
        Ok(())
    }
}

impl ChunkVisitor for WaveChunks {
    fn body_len(&mut self, header: &ChunkHeader, remaining: usize) -> u32 {
        if &header.id == ids::DATA && header.size as usize > remaining {
            warn!(
                "data chunk declares {} bytes, only {} left; clamping",
                header.size, remaining
            );
            self.diagnostics.push(Diagnostic::TruncatedData {
                declared: header.size,
                available: remaining as u32,
            });
            return remaining as u32;
        }
        header.size
    }

    fn is_complete(&self) -> bool {
        self.format.is_some() && self.data.is_some()
    }

    fn visit(
        &mut self,
        header: &ChunkHeader,
        body_len: u32,
        cursor: &mut BinaryCursor,
    ) -> Result<Visit> {
        match &header.id {
            ids::FORMAT => {
                if self.format.is_some() {
                    return Err(Error::DuplicateChunk(header.id));
                }
                self.format = Some(FormatChunk::build(body_len, cursor)?);
            }
            ids::DATA => self.read_data(body_len, cursor)?,
            _ => return Ok(Visit::Unknown),
        }
        Ok(Visit::Handled)
    }
}

/// Decodes a whole WAV file.
pub fn decode(bytes: impl Into<Vec<u8>>) -> Result<Decoded> {
    let mut cursor = BinaryCursor::new(bytes.into(), ORDER);

    expect_id(&mut cursor, ids::RIFF)?;
    let riff_size = cursor.read_u32(ORDER)?;
    expect_id(&mut cursor, ids::WAVE)?;
    trace!("RIFF size {} buffer {}", riff_size, cursor.len());
    if riff_size as usize != cursor.len() - HEADER_LEN {
        debug!(
            "RIFF declares {} bytes, buffer holds {} after the header",
            riff_size,
            cursor.len() - HEADER_LEN
        );
    }

    let mut chunks = WaveChunks::default();
    let leftover = ChunkWalker::new(ORDER, UnknownChunks::Skip)
        .tolerate_short_tail(true)
        .walk(&mut cursor, &mut chunks)?;
    if leftover > 0 {
        warn!("discarding {} trailing byte(s)", leftover);
        cursor.skip(leftover)?;
        chunks.diagnostics.push(Diagnostic::TrailingData { bytes: leftover });
    }

    let format = chunks.format.ok_or(Error::MissingChunk(*ids::FORMAT))?;
    let channels = chunks.data.ok_or(Error::MissingChunk(*ids::DATA))?;

    Ok(Decoded {
        container: AudioContainer {
            sample_rate: format.sample_rate,
            bit_depth: format.width.bits(),
            name: None,
            extended_rate: None,
            channels,
        },
        diagnostics: chunks.diagnostics,
    })
}

/// Encodes `container` as `RIFF` / `fmt ` / `data`. The name, if any, is
/// not written.
pub fn encode(container: &AudioContainer) -> Result<Vec<u8>> {
    let width = container.validate()?;

    // WAVE + fmt header and body + data header
    let overhead = 4 + HEADER_LEN as u32 + FORMAT_LEN + HEADER_LEN as u32;
    let data_len = container.sample_bytes(width, u64::from(overhead))?;

    let block_align = u16::try_from(container.channel_count() * width.bytes()).map_err(|_| {
        Error::InvalidContainer(format!(
            "{} channels overflow the block align field",
            container.channel_count()
        ))
    })?;
    let byte_rate = u32::try_from(u64::from(container.sample_rate) * u64::from(block_align))
        .map_err(|_| {
            Error::InvalidContainer(format!(
                "sample rate {} overflows the byte rate field",
                container.sample_rate
            ))
        })?;
    if container.name.is_some() {
        debug!("WAV has no name chunk, dropping the name");
    }

    let mut cursor = BinaryCursor::with_capacity((overhead + data_len) as usize + HEADER_LEN, ORDER);

    ChunkHeader {
        id: *ids::RIFF,
        size: overhead + data_len,
    }
    .write(&mut cursor, ORDER);
    cursor.write_bytes(ids::WAVE);

    ChunkHeader {
        id: *ids::FORMAT,
        size: FORMAT_LEN,
    }
    .write(&mut cursor, ORDER);
    cursor.write_u16(FORMAT_PCM, ORDER);
    cursor.write_u16(container.channel_count() as u16, ORDER);
    cursor.write_u32(container.sample_rate, ORDER);
    cursor.write_u32(byte_rate, ORDER);
    cursor.write_u16(block_align, ORDER);
    cursor.write_u16(width.bits(), ORDER);

    ChunkHeader {
        id: *ids::DATA,
        size: data_len,
    }
    .write(&mut cursor, ORDER);
    for i in 0..container.frame_count() {
        samples::write_frame(&mut cursor, &container.channels, i, width, ORDER);
    }

    debug!(
        "encoded WAV: {} channel(s) x {} frame(s), {} bytes",
        container.channel_count(),
        container.frame_count(),
        cursor.len()
    );
    Ok(cursor.into_inner())
}
