use crate::error::{Error, Result};
use crate::extended::Extended;
use crate::samples::SampleWidth;
use std::convert::TryFrom;
use std::fmt;

/// Format-independent PCM audio: what a decode produces and an encode
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioContainer {
    /// Frames per second.
    pub sample_rate: u32,
    /// Significant bits per sample.
    pub bit_depth: u16,
    /// AIFF `NAME` chunk. WAV has nowhere to put it.
    pub name: Option<String>,
    /// The AIFF `COMM` rate bytes, kept when they say more than
    /// `sample_rate` does (a fraction, or a value out of `u32` range). AIFF
    /// encode writes them back as long as they still map to `sample_rate`.
    pub extended_rate: Option<Extended>,
    /// One run of samples per channel. Samples use only the low `bit_depth`
    /// bits, stored as raw bit patterns.
    pub channels: Vec<Vec<u32>>,
}

impl AudioContainer {
    pub fn new(sample_rate: u32, bit_depth: u16, channels: Vec<Vec<u32>>) -> AudioContainer {
        AudioContainer {
            sample_rate,
            bit_depth,
            name: None,
            extended_rate: None,
            channels,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> AudioContainer {
        self.name = Some(name.into());
        self
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel, taken from the first channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Checks everything an encoder relies on, before it writes a byte.
    pub(crate) fn validate(&self) -> Result<SampleWidth> {
        let width = SampleWidth::try_from(self.bit_depth)?;
        if self.channels.is_empty() {
            return Err(Error::InvalidContainer("no channels".into()));
        }
        if self.channels.len() > usize::from(u16::MAX) {
            return Err(Error::InvalidContainer(format!(
                "{} channels, at most {} fit the header",
                self.channels.len(),
                u16::MAX
            )));
        }
        let frames = self.frame_count();
        if let Some((i, ch)) = self
            .channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frames)
        {
            return Err(Error::InvalidContainer(format!(
                "channel {} has {} frames, channel 0 has {}",
                i,
                ch.len(),
                frames
            )));
        }
        Ok(width)
    }

    /// Byte length of all samples, if it fits a 32-bit chunk size along
    /// with `overhead` bytes of headers.
    pub(crate) fn sample_bytes(&self, width: SampleWidth, overhead: u64) -> Result<u32> {
        let bytes = self.channels.len() as u64 * self.frame_count() as u64 * width.bytes() as u64;
        if bytes + overhead > u64::from(u32::MAX) {
            return Err(Error::InvalidContainer(format!(
                "{} bytes of samples overflow a 32-bit chunk size",
                bytes
            )));
        }
        Ok(bytes as u32)
    }
}

/// A recoverable anomaly met while decoding. The decode still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The sample data chunk claimed more bytes than the buffer holds and
    /// was clamped to what is there.
    TruncatedData { declared: u32, available: u32 },
    /// Bytes left over after the last complete chunk, discarded.
    TrailingData { bytes: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TruncatedData {
                declared,
                available,
            } => write!(
                f,
                "data chunk declares {} bytes but only {} are present",
                declared, available
            ),
            Diagnostic::TrailingData { bytes } => {
                write!(f, "{} trailing byte(s) discarded", bytes)
            }
        }
    }
}

/// A decoded container together with the anomalies that were tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub container: AudioContainer,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decoded {
    pub fn into_container(self) -> AudioContainer {
        self.container
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts() {
        let c = AudioContainer::new(8000, 16, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(c.channel_count(), 2);
        assert_eq!(c.frame_count(), 3);
        assert_eq!(AudioContainer::default().frame_count(), 0);
    }

    #[test]
    fn validate_rejects_what_cannot_be_encoded() {
        let empty = AudioContainer::new(8000, 16, vec![]);
        assert!(matches!(empty.validate(), Err(Error::InvalidContainer(_))));

        let ragged = AudioContainer::new(8000, 16, vec![vec![1, 2], vec![3]]);
        assert!(matches!(ragged.validate(), Err(Error::InvalidContainer(_))));

        let deep = AudioContainer::new(8000, 24, vec![vec![1]]);
        assert!(matches!(deep.validate(), Err(Error::UnsupportedBitDepth(24))));

        let ok = AudioContainer::new(8000, 8, vec![vec![1], vec![2]]);
        assert_eq!(ok.validate().unwrap(), SampleWidth::Eight);
    }

    #[test]
    fn sample_bytes_fit_u32() {
        let c = AudioContainer::new(8000, 32, vec![vec![0; 10]; 3]);
        assert_eq!(c.sample_bytes(SampleWidth::ThirtyTwo, 44).unwrap(), 120);
        assert!(c
            .sample_bytes(SampleWidth::ThirtyTwo, u64::from(u32::MAX))
            .is_err());
    }
}
