mod local;

pub use local::{ArchiveFile, OpenMode};

use std::io;

/// Trait for random access reading from a data source
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Read exactly `buf.len()` bytes at the specified offset.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the source ends before
    /// the buffer is filled.
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut read = 0;
        while read < buf.len() {
            let latest = self.read_at(offset + read as u64, &mut buf[read..])?;
            if latest == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "archive ended before the requested range could be read",
                ));
            }
            read += latest;
        }
        Ok(())
    }
}

/// In-memory archives (and the unit tests) read straight from a byte slice.
impl ReadAt for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let offset = offset.min(self.len() as u64) as usize;
        let n = buf.len().min(self.len() - offset);
        buf[..n].copy_from_slice(&self[offset..offset + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}
