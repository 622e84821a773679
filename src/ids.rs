use std::fmt;

pub type ChunkID = [u8; 4];

// IFF / AIFF
pub const FORM: &ChunkID = b"FORM";
pub const AIFF: &ChunkID = b"AIFF";
pub const COMMON: &ChunkID = b"COMM";
pub const SOUND: &ChunkID = b"SSND";
pub const NAME: &ChunkID = b"NAME";

// RIFF / WAVE
pub const RIFF: &ChunkID = b"RIFF";
pub const WAVE: &ChunkID = b"WAVE";
pub const FORMAT: &ChunkID = b"fmt ";
pub const DATA: &ChunkID = b"data";

/// Displays a chunk id as ASCII, escaping anything that isn't printable.
///
/// Ids are raw bytes on the wire, so a corrupt file can put anything here.
pub struct DisplayId<'a>(pub &'a ChunkID);

impl fmt::Display for DisplayId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0.iter() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

pub fn display(id: &ChunkID) -> DisplayId<'_> {
    DisplayId(id)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn printable_ids_show_verbatim() {
        assert_eq!(display(FORMAT).to_string(), "fmt ");
        assert_eq!(display(SOUND).to_string(), "SSND");
    }

    #[test]
    fn binary_ids_are_escaped() {
        assert_eq!(display(&[0x00, b'A', 0xff, b'z']).to_string(), "\\x00A\\xffz");
    }
}
