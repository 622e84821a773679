use crate::ids::{display, ChunkID};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a decode or an encode.
///
/// Recoverable anomalies (clamped or trailing data) are not errors; they are
/// reported as [`Diagnostic`](crate::Diagnostic)s next to the decoded
/// container.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid magic: expected `{}`, found `{}`", display(.expected), display(.found))]
    InvalidMagic { expected: ChunkID, found: ChunkID },

    #[error("unknown chunk `{}`", display(.0))]
    UnknownChunk(ChunkID),

    #[error("chunk `{}` requires a preceding `{}` chunk", display(.chunk), display(.requires))]
    MissingPrerequisiteChunk { chunk: ChunkID, requires: ChunkID },

    #[error("required chunk `{}` is missing", display(.0))]
    MissingChunk(ChunkID),

    #[error("chunk `{}` appears more than once", display(.0))]
    DuplicateChunk(ChunkID),

    #[error(
        "chunk `{}` declares {declared} byte(s) but its handler consumed {consumed}",
        display(.id)
    )]
    ChunkSizeMismatch {
        id: ChunkID,
        declared: u32,
        consumed: usize,
    },

    #[error("truncated input: need {requested} byte(s), {remaining} remaining")]
    TruncatedInput { requested: usize, remaining: usize },

    #[error("unsupported encoding: audio format {0} (only PCM = 1)")]
    UnsupportedEncoding(u16),

    #[error("unsupported bit depth {0} (supported: 8, 16, 32)")]
    UnsupportedBitDepth(u16),

    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: u32 },

    #[error("cannot encode container: {0}")]
    InvalidContainer(String),

    #[error("unrecognised container format")]
    UnknownFormat,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
