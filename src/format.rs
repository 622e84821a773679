use crate::container::{AudioContainer, Decoded};
use crate::error::{Error, Result};
use crate::{aiff, ids, wav};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The container families this crate reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Aiff,
    Wav,
}

impl Format {
    /// Identifies a buffer by its outer header. Needs the first 12 bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Format> {
        if bytes.len() < 12 {
            return None;
        }
        match (&bytes[0..4], &bytes[8..12]) {
            (magic, kind) if magic == ids::FORM && kind == ids::AIFF => Some(Format::Aiff),
            (magic, kind) if magic == ids::RIFF && kind == ids::WAVE => Some(Format::Wav),
            _ => None,
        }
    }

    /// Picks a format from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn decode(self, bytes: impl Into<Vec<u8>>) -> Result<Decoded> {
        match self {
            Format::Aiff => aiff::decode(bytes),
            Format::Wav => wav::decode(bytes),
        }
    }

    pub fn encode(self, container: &AudioContainer) -> Result<Vec<u8>> {
        match self {
            Format::Aiff => aiff::encode(container),
            Format::Wav => wav::encode(container),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Format> {
        match s.to_ascii_lowercase().as_str() {
            "aif" | "aiff" => Ok(Format::Aiff),
            "wav" | "wave" => Ok(Format::Wav),
            _ => Err(Error::UnknownFormat),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Aiff => "AIFF",
            Format::Wav => "WAV",
        })
    }
}

/// Decodes either format, chosen by sniffing the outer header.
pub fn decode(bytes: impl Into<Vec<u8>>) -> Result<Decoded> {
    let bytes = bytes.into();
    let format = Format::sniff(&bytes).ok_or(Error::UnknownFormat)?;
    log::debug!("sniffed {} ({} bytes)", format, bytes.len());
    format.decode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sniffs_magic() {
        assert_eq!(Format::sniff(b"FORM\0\0\0\x04AIFF"), Some(Format::Aiff));
        assert_eq!(Format::sniff(b"RIFF\0\0\0\x04WAVE"), Some(Format::Wav));
        assert_eq!(Format::sniff(b"FORM\0\0\0\x04AIFC"), None);
        assert_eq!(Format::sniff(b"RIFF"), None);
    }

    #[test]
    fn extensions() {
        assert_eq!(Format::from_path("a/b/loop.AIF"), Some(Format::Aiff));
        assert_eq!(Format::from_path("loop.aiff"), Some(Format::Aiff));
        assert_eq!(Format::from_path("loop.wav"), Some(Format::Wav));
        assert_eq!(Format::from_path("loop.flac"), None);
        assert_eq!(Format::from_path("loop"), None);
    }

    #[test]
    fn decode_dispatches() {
        let c = AudioContainer::new(22_050, 8, vec![vec![1, 2, 3]]);
        for &format in &[Format::Aiff, Format::Wav] {
            let bytes = format.encode(&c).unwrap();
            assert_eq!(Format::sniff(&bytes), Some(format));
            assert_eq!(decode(bytes).unwrap().container, c);
        }
        assert!(matches!(decode(&b"OggS"[..]), Err(Error::UnknownFormat)));
    }
}
