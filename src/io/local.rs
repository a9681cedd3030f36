use super::ReadAt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// How an [`ArchiveFile`] was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing archive, reading only.
    ReadOnly,
    /// Existing archive, reading and in-place updates.
    ReadWrite,
    /// Fresh (truncated) archive prepared for writing.
    CreateNew,
}

/// Local pak file with random access support
#[derive(Debug)]
pub struct ArchiveFile {
    file: File,
    size: u64,
}

impl ArchiveFile {
    /// Open `path` in the given mode and capture its current size.
    pub fn open(path: &Path, mode: OpenMode) -> io::Result<Self> {
        let file = match mode {
            OpenMode::ReadOnly => OpenOptions::new().read(true).open(path)?,
            OpenMode::ReadWrite => OpenOptions::new().read(true).write(true).open(path)?,
            OpenMode::CreateNew => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        };
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ReadAt for ArchiveFile {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file.read_at(buf, offset)
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            file.read(buf)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}
