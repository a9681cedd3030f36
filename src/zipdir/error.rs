use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZipDirError>;

/// Errors surfaced while opening a pak archive and building its directory
/// index. No partially built cache ever escapes alongside one of these.
#[derive(Debug, Error)]
pub enum ZipDirError {
    #[error("archive I/O failed: {0}")]
    IoFailed(#[from] std::io::Error),
    #[error(
        "cannot find the central directory record; this is either not a pak file, \
         or a pak file without a central directory"
    )]
    NoCdr,
    #[error("archive data is corrupt: {0}; please try to repair the file")]
    DataCorrupt(&'static str),
    #[error("cannot read the archive: {0}")]
    Unsupported(&'static str),
    #[error("central directory record is corrupt, truncated or missing: {0}")]
    CdrCorrupt(&'static str),
    #[error("not enough memory to cache the central directory record")]
    NoMemory,
    #[error("archive content is corrupted: {0}")]
    CorruptedData(&'static str),
    #[error("file descriptor validation failed: {0}; the archive may be damaged")]
    ValidationFailed(&'static str),
    #[error("decompressor reported an out-of-memory error")]
    ZlibOom,
    #[error("decompressor reported a corrupted compressed stream")]
    ZlibCorrupted,
    #[error("decompressor reported an unexpected failure")]
    ZlibFailed,
    #[error("uncompressed stream CRC32 check failed (expected {expected:#010x}, got {actual:#010x})")]
    Crc32Check { expected: u32, actual: u32 },
    #[error("internal error: the program flow may not have possibly led here")]
    Unexpected,
}
