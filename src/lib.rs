//! Decoding and encoding of uncompressed PCM audio in AIFF and WAV
//! containers, entirely in memory.
//!
//! ```no_run
//! use audiochunk::Format;
//!
//! let bytes = audiochunk::fs::read_file("loop.aif")?;
//! let decoded = audiochunk::decode(bytes)?;
//! for d in &decoded.diagnostics {
//!     eprintln!("{}", d);
//! }
//! let out = Format::Wav.encode(&decoded.container)?;
//! audiochunk::fs::write_file("loop.wav", &out)?;
//! # Ok::<(), audiochunk::Error>(())
//! ```
extern crate bytes;
extern crate log;

pub mod aiff;
pub mod chunks;
mod container;
pub mod cursor;
mod error;
pub mod extended;
mod format;
pub mod fs;
pub mod ids;
pub mod samples;
pub mod wav;

pub use container::{AudioContainer, Decoded, Diagnostic};
pub use cursor::{BinaryCursor, ByteOrder};
pub use error::{Error, Result};
pub use format::{decode, Format};
pub use samples::SampleWidth;
