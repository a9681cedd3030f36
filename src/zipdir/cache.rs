use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::io::ArchiveFile;

use super::structures::{ExtendedHeader, HeaderEncryption, HeaderSignature, SignatureHeader};
use super::tree::{DirectoryTree, FileEntry};

/// State flags carried by an opened [`Cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheFlags(u32);

impl CacheFlags {
    /// The on-disk central directory does not reflect the cache yet.
    pub const CDR_DIRTY: CacheFlags = CacheFlags(1 << 0);
    /// The archive was opened for reading only.
    pub const READ_ONLY: CacheFlags = CacheFlags(1 << 1);
    /// The archive must not be compacted on close.
    pub const DONT_COMPACT: CacheFlags = CacheFlags(1 << 2);

    pub fn contains(self, other: CacheFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) fn set(&mut self, other: CacheFlags) {
        self.0 |= other.0;
    }
}

/// Normalize a lookup path the way archive names are stored: ASCII
/// lowercase with `/` as the only separator.
pub fn normalize_path(path: &str) -> String {
    path.chars()
        .map(|c| if c == '\\' { '/' } else { c.to_ascii_lowercase() })
        .collect()
}

/// The factory's product: the opened archive file together with its parsed
/// directory index.
///
/// The cache owns the name pool (the central directory buffer) and the tree
/// that indexes into it, so entry names stay valid exactly as long as the
/// cache lives. Consumers use the recorded data offsets to read entry
/// payloads from the file.
#[derive(Debug)]
pub struct Cache {
    pub(crate) file: ArchiveFile,
    pub(crate) path: Option<PathBuf>,
    pub(crate) flags: CacheFlags,
    pub(crate) cdr_offset: u32,
    pub(crate) name_pool: Vec<u8>,
    pub(crate) tree: DirectoryTree,
    /// Populated instead of the tree under `FILENAMES_AS_CRC32`.
    pub(crate) crc_map: HashMap<u32, FileEntry>,
    pub(crate) encryption: HeaderEncryption,
    pub(crate) signing: HeaderSignature,
    pub(crate) extended_header: Option<ExtendedHeader>,
    pub(crate) signature_header: Option<SignatureHeader>,
}

impl Cache {
    /// Look up an entry by archive path. The path is normalized first, so
    /// any case and separator spelling finds the same entry.
    pub fn find_entry(&self, path: &str) -> Option<&FileEntry> {
        let normalized = normalize_path(path);
        if self.crc_map.is_empty() {
            self.tree.find(&self.name_pool, &normalized)
        } else {
            self.crc_map.get(&crc32fast::hash(normalized.as_bytes()))
        }
    }

    /// Look up an entry by the CRC32 of its normalized path. Only
    /// meaningful for caches built with `FILENAMES_AS_CRC32`.
    pub fn find_entry_by_name_crc32(&self, crc: u32) -> Option<&FileEntry> {
        self.crc_map.get(&crc)
    }

    /// Visit every entry with its full normalized path. Empty for caches
    /// built with `FILENAMES_AS_CRC32` (no names are retained there).
    pub fn walk<F: FnMut(&str, &FileEntry)>(&self, f: F) {
        self.tree.walk(&self.name_pool, f);
    }

    pub fn entry_count(&self) -> usize {
        if self.crc_map.is_empty() {
            self.tree.entry_count()
        } else {
            self.crc_map.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty() && self.crc_map.is_empty()
    }

    /// The archive path, unless the factory was told not to memorize it.
    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn flags(&self) -> CacheFlags {
        self.flags
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(CacheFlags::READ_ONLY)
    }

    /// Offset of the central directory; new data may be appended here.
    pub fn cdr_offset(&self) -> u32 {
        self.cdr_offset
    }

    pub fn encryption(&self) -> HeaderEncryption {
        self.encryption
    }

    pub fn signing(&self) -> HeaderSignature {
        self.signing
    }

    pub fn extended_header(&self) -> Option<&ExtendedHeader> {
        self.extended_header.as_ref()
    }

    pub fn signature_header(&self) -> Option<&SignatureHeader> {
        self.signature_header.as_ref()
    }

    /// The underlying archive file, for consumers that read entry payloads.
    pub fn file(&self) -> &ArchiveFile {
        &self.file
    }
}
