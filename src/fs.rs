//! File access. The codecs only ever see byte buffers; this is the one
//! place that opens files.

use crate::error::Result;
use log::debug;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut buf = vec![];
    File::open(path)?.read_to_end(&mut buf)?;
    debug!("read {} bytes from {}", buf.len(), path.display());
    Ok(buf)
}

pub fn write_file(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    f.flush()?;
    debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_file(&path, b"RIFF").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"RIFF".to_vec());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_file(dir.path().join("nope.aif")),
            Err(Error::Io(_))
        ));
    }
}
