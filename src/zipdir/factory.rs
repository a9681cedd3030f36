//! The cache factory: opens a pak file and builds its directory index.
//!
//! Pak archives are ZIP files read from the end:
//! 1. Scan backwards for the End of Central Directory (EOCD) record,
//!    tolerating a trailing comment of up to 64 KiB
//! 2. Decode the vendor trailer overlaying the comment area (encryption
//!    and signing declarations)
//! 3. Read the Central Directory into one buffer and walk it, normalizing
//!    entry names in place so the buffer doubles as the name pool
//! 4. Cross-check each entry against its Local File Header and derive the
//!    offset of its compressed payload
//!
//! The factory is a transient builder: it owns the file handle while it
//! works and hands everything to the returned [`Cache`] on success. On any
//! failure the handle is closed with the factory and no cache escapes.

use std::collections::HashMap;
use std::mem;
use std::path::Path;

use flate2::{Decompress, FlushDecompress, Status};
use log::{debug, warn};

use crate::io::{ArchiveFile, OpenMode, ReadAt};

use super::cache::{Cache, CacheFlags};
use super::error::{Result, ZipDirError};
use super::structures::{
    CdrFileHeader, CompressionMethod, EndOfCentralDirectory, ExtendedHeader, HeaderEncryption,
    HeaderSignature, LocalFileHeader, SignatureHeader, ENCRYPTION_HEADER_SIZE, EXTRA_NTFS,
    ntfs_last_modify,
};
use super::tree::{DirectoryTree, FileEntry, NameRef};

/// Window size of the blocks read from the end of the file while searching
/// for the end-of-central-directory record.
const CDR_SEARCH_WINDOW_SIZE: usize = 0x100;

/// Pak files are capped at 2 GiB.
const MAX_PAK_SIZE: u64 = 1 << 31;

/// How aggressively the factory validates entries while building the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum InitMethod {
    /// Cross-check every entry against its local file header.
    #[default]
    Default,
    /// Trust the central directory and skip the local header reads.
    Full,
    /// Like [`Full`](InitMethod::Full), and additionally decompress every
    /// entry and verify its CRC32.
    Validate,
}

/// Behavior flags for [`CacheFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    /// Open the archive for reading only.
    pub const READ_ONLY: Flags = Flags(1 << 0);
    /// Start a fresh archive without trying to read an existing one.
    pub const CREATE_NEW: Flags = Flags(1 << 1);
    /// Index entries by the CRC32 of their names instead of building the
    /// directory tree.
    pub const FILENAMES_AS_CRC32: Flags = Flags(1 << 2);
    /// The archive is reached through the embedder's virtual filesystem
    /// rather than directly. Recognized for compatibility; see DESIGN.md.
    pub const READ_INSIDE_PAK: Flags = Flags(1 << 3);
    /// Leave the cache's archive path empty.
    pub const DONT_MEMORIZE_ZIP_PATH: Flags = Flags(1 << 4);
    /// Mark the cache so the archive is not compacted on close.
    pub const DONT_COMPACT: Flags = Flags(1 << 5);

    pub fn empty() -> Flags {
        Flags(0)
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

/// One-shot builder that opens a pak file and produces a [`Cache`].
///
/// ## Example
///
/// ```no_run
/// use pakdir::zipdir::{CacheFactory, Flags, InitMethod};
///
/// # fn main() -> Result<(), pakdir::ZipDirError> {
/// let mut factory = CacheFactory::new(InitMethod::Default, Flags::READ_ONLY);
/// let cache = factory.open("assets.pak")?;
/// cache.walk(|path, entry| {
///     println!("{path}: {} bytes", entry.uncompressed_size);
/// });
/// # Ok(())
/// # }
/// ```
pub struct CacheFactory {
    init_method: InitMethod,
    flags: Flags,
    build_tree: bool,
    build_crc_map: bool,

    // per-open state, reset on entry to `open`
    eocd: Option<EndOfCentralDirectory>,
    eocd_pos: u64,
    encryption: HeaderEncryption,
    signing: HeaderSignature,
    extended_header: Option<ExtendedHeader>,
    signature_header: Option<SignatureHeader>,
    tree: DirectoryTree,
    crc_map: HashMap<u32, FileEntry>,
    name_pool: Vec<u8>,
}

impl CacheFactory {
    pub fn new(init_method: InitMethod, flags: Flags) -> Self {
        let build_crc_map = flags.contains(Flags::FILENAMES_AS_CRC32);
        Self {
            init_method,
            flags,
            build_tree: !build_crc_map,
            build_crc_map,
            eocd: None,
            eocd_pos: 0,
            encryption: HeaderEncryption::NotEncrypted,
            signing: HeaderSignature::NotSigned,
            extended_header: None,
            signature_header: None,
            tree: DirectoryTree::default(),
            crc_map: HashMap::new(),
            name_pool: Vec::new(),
        }
    }

    /// Open the pak file at `path` and build its directory cache.
    ///
    /// The open mode follows the factory flags: `READ_ONLY` requires an
    /// existing, readable archive; `CREATE_NEW` truncates and prepares an
    /// empty one; otherwise an existing archive is opened for update, and a
    /// missing or zero-byte file falls through to creation.
    ///
    /// # Errors
    ///
    /// Any [`ZipDirError`]; the file handle never leaks on failure.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Cache> {
        self.clear();
        let path = path.as_ref();

        if self.flags.contains(Flags::READ_ONLY) {
            let file = ArchiveFile::open(path, OpenMode::ReadOnly)?;
            self.read_cache(&file)?;
            let mut cache_flags = CacheFlags::default();
            cache_flags.set(CacheFlags::CDR_DIRTY);
            cache_flags.set(CacheFlags::READ_ONLY);
            return Ok(self.into_cache(file, path, cache_flags));
        }

        let existing = if self.flags.contains(Flags::CREATE_NEW) {
            None
        } else {
            ArchiveFile::open(path, OpenMode::ReadWrite).ok()
        };

        let mut cache_flags = CacheFlags::default();
        let file = match existing {
            Some(file) if file.size() > 0 => {
                self.read_cache(&file)?;
                file
            }
            // no archive yet, or a zero-byte one: start a fresh pak
            other => {
                drop(other);
                let file = ArchiveFile::open(path, OpenMode::CreateNew)?;
                cache_flags.set(CacheFlags::CDR_DIRTY);
                file
            }
        };

        Ok(self.into_cache(file, path, cache_flags))
    }

    /// Reads the whole directory out of `src` and prepares the index.
    fn read_cache<R: ReadAt + ?Sized>(&mut self, src: &R) -> Result<()> {
        let mut eocd = self.find_cdr_end(src)?;
        self.decode_trailer(src, &mut eocd)?;

        // multivolume archives are not supported
        if eocd.disk != 0 || eocd.cdr_start_disk != 0 || eocd.entries_on_disk != eocd.entries_total
        {
            warn!("multivolume archive detected");
            return Err(ZipDirError::Unsupported("multivolume archives"));
        }

        // if the central directory offset or size are out of range, the
        // record that declared them is probably corrupt
        if eocd.cdr_offset as u64 > self.eocd_pos
            || eocd.cdr_size as u64 > self.eocd_pos
            || eocd.cdr_offset as u64 + eocd.cdr_size as u64 > self.eocd_pos
        {
            return Err(ZipDirError::DataCorrupt(
                "the central directory offset or size are out of range",
            ));
        }

        self.build_file_entries(src, &eocd)?;

        // the cache may update files in place, so every entry needs to know
        // how much room it has before the next one
        if self.build_tree {
            self.tree.refresh_eof_offsets(eocd.cdr_offset);
        }

        self.eocd = Some(eocd);
        Ok(())
    }

    /// Transfer everything built so far into a [`Cache`], together with the
    /// file handle.
    fn into_cache(&mut self, file: ArchiveFile, path: &Path, mut flags: CacheFlags) -> Cache {
        if self.flags.contains(Flags::DONT_COMPACT) {
            flags.set(CacheFlags::DONT_COMPACT);
        }
        let path = (!self.flags.contains(Flags::DONT_MEMORIZE_ZIP_PATH))
            .then(|| path.to_path_buf());

        Cache {
            file,
            path,
            flags,
            cdr_offset: self.eocd.as_ref().map_or(0, |eocd| eocd.cdr_offset),
            name_pool: mem::take(&mut self.name_pool),
            tree: mem::take(&mut self.tree),
            crc_map: mem::take(&mut self.crc_map),
            encryption: self.encryption,
            signing: self.signing,
            extended_header: self.extended_header.take(),
            signature_header: self.signature_header.take(),
        }
    }

    fn clear(&mut self) {
        self.eocd = None;
        self.eocd_pos = 0;
        self.encryption = HeaderEncryption::NotEncrypted;
        self.signing = HeaderSignature::NotSigned;
        self.extended_header = None;
        self.signature_header = None;
        self.tree = DirectoryTree::default();
        self.crc_map.clear();
        self.name_pool = Vec::new();
    }

    /// Locate the end-of-central-directory record by scanning backwards
    /// from the end of the file.
    ///
    /// The scan reads windows of [`CDR_SEARCH_WINDOW_SIZE`] bytes, keeping
    /// an overlap of `EOCD size - 1` bytes so a record straddling a window
    /// boundary is still seen whole. A signature only counts when the
    /// record's comment length exactly covers the remaining file tail; a
    /// mismatch means the file was tampered with or truncated, and guessing
    /// offsets from such a record risks damaging the archive, so the scan
    /// stops there instead of continuing.
    ///
    /// # Returns
    ///
    /// The parsed record; its file offset is kept in `self.eocd_pos`.
    fn find_cdr_end<R: ReadAt + ?Sized>(&mut self, src: &R) -> Result<EndOfCentralDirectory> {
        const EOCD_SIZE: usize = EndOfCentralDirectory::SIZE;
        const OVERLAP: usize = EOCD_SIZE - 1;

        let file_size = src.size();
        if file_size > MAX_PAK_SIZE {
            warn!("the pak file is {file_size} bytes; archives over 2 GiB cannot be opened");
            return Err(ZipDirError::Unsupported("pak files larger than 2 GiB"));
        }
        if file_size < EOCD_SIZE as u64 {
            warn!(
                "the pak file is too small ({file_size} bytes) to contain \
                 an end-of-central-directory record"
            );
            return Err(ZipDirError::DataCorrupt(
                "the file is too small to contain an end-of-central-directory record",
            ));
        }

        // no valid record can start below this, given the 64 KiB comment cap
        let scan_floor = file_size.saturating_sub(EOCD_SIZE as u64 + 0xFFFF);

        let mut buffer = vec![0u8; CDR_SEARCH_WINDOW_SIZE + OVERLAP];
        // exclusive end of the region still to be read
        let mut old_pos = file_size;
        // highest candidate offset not yet tested
        let mut scan_pos = file_size - EOCD_SIZE as u64;

        loop {
            let new_pos = old_pos
                .saturating_sub(CDR_SEARCH_WINDOW_SIZE as u64)
                .max(scan_floor);
            if new_pos >= old_pos {
                return Err(ZipDirError::NoCdr);
            }

            // place the window so it abuts the overlap bytes carried over
            // from the previous iteration
            let read_len = (old_pos - new_pos) as usize;
            let window_start = CDR_SEARCH_WINDOW_SIZE - read_len;
            src.read_exact_at(new_pos, &mut buffer[window_start..window_start + read_len])?;

            for cand in (new_pos..=scan_pos).rev() {
                let idx = window_start + (cand - new_pos) as usize;
                if &buffer[idx..idx + 4] != EndOfCentralDirectory::SIGNATURE {
                    continue;
                }

                let comment_length =
                    u16::from_le_bytes([buffer[idx + 20], buffer[idx + 21]]) as u64;
                if comment_length != file_size - cand - EOCD_SIZE as u64 {
                    warn!(
                        "end-of-central-directory record at offset {cand} is followed \
                         by a comment of inconsistent length"
                    );
                    return Err(ZipDirError::DataCorrupt(
                        "the central directory record is followed by a comment of \
                         inconsistent length",
                    ));
                }

                debug!("found end-of-central-directory record at offset {cand}");
                self.eocd_pos = cand;
                // signature and length were just checked, so a parse failure
                // here cannot happen
                return EndOfCentralDirectory::from_bytes(&buffer[idx..idx + EOCD_SIZE])
                    .map_err(|_| ZipDirError::Unexpected);
            }

            // keep the window's leading bytes so a signature crossing the
            // boundary is caught on the next pass
            buffer.copy_within(window_start..window_start + OVERLAP, CDR_SEARCH_WINDOW_SIZE);
            scan_pos = new_pos.saturating_sub(1);
            old_pos = new_pos;
        }
    }

    /// Decode the vendor metadata that may follow the record: the legacy
    /// encryption hint in the disk number, then the extended header and its
    /// encryption/signing sub-headers overlaying the comment area.
    fn decode_trailer<R: ReadAt + ?Sized>(
        &mut self,
        src: &R,
        eocd: &mut EndOfCentralDirectory,
    ) -> Result<()> {
        // early pak encryption stored its technique in the top bits of the
        // disk number; newer techniques declare it in the extended header
        // so signed paks stay readable by stock ZIP tools
        let legacy = HeaderEncryption::from_legacy_bits(eocd.disk >> 14);
        if legacy != HeaderEncryption::NotEncrypted {
            self.encryption = legacy;
        }
        eocd.disk &= 0x3FFF;

        if (eocd.comment_length as usize) < ExtendedHeader::SIZE {
            return Ok(());
        }

        let trailer_pos =
            eocd.cdr_offset as u64 + eocd.cdr_size as u64 + EndOfCentralDirectory::SIZE as u64;
        let mut buf = [0u8; ExtendedHeader::SIZE];
        src.read_exact_at(trailer_pos, &mut buf)?;
        let extended = ExtendedHeader::from_bytes(&buf)?;

        if extended.encryption != 0 && self.encryption != HeaderEncryption::NotEncrypted {
            // declared both in the disk number and in the extended header
            warn!("conflicting encryption declarations in the archive trailer");
            return Err(ZipDirError::DataCorrupt(
                "unexpected encryption technique in header",
            ));
        }

        let mut expected = ExtendedHeader::SIZE;

        // the extended header supersedes the legacy hint when present
        self.encryption = match HeaderEncryption::from_u16(extended.encryption) {
            Some(HeaderEncryption::NotEncrypted) => HeaderEncryption::NotEncrypted,
            Some(HeaderEncryption::StreamcipherKeytable) => {
                expected += ENCRYPTION_HEADER_SIZE;
                HeaderEncryption::StreamcipherKeytable
            }
            _ => {
                return Err(ZipDirError::DataCorrupt(
                    "bad encryption technique in header",
                ));
            }
        };

        self.signing = match HeaderSignature::from_u16(extended.signing) {
            Some(HeaderSignature::NotSigned) => HeaderSignature::NotSigned,
            Some(HeaderSignature::CdrSigned) => {
                expected += SignatureHeader::SIZE;
                HeaderSignature::CdrSigned
            }
            None => {
                return Err(ZipDirError::DataCorrupt("bad signing technique in header"));
            }
        };

        if eocd.comment_length as usize != expected {
            return Err(ZipDirError::DataCorrupt(
                "the comment field is the wrong length",
            ));
        }

        if self.signing == HeaderSignature::CdrSigned {
            let mut sig_pos = trailer_pos + ExtendedHeader::SIZE as u64;
            if self.encryption == HeaderEncryption::StreamcipherKeytable {
                sig_pos += ENCRYPTION_HEADER_SIZE as u64;
            }
            let mut sig = [0u8; SignatureHeader::SIZE];
            src.read_exact_at(sig_pos, &mut sig)?;
            self.signature_header = Some(SignatureHeader::from_bytes(&sig)?);
        }

        self.extended_header = Some(extended);
        Ok(())
    }

    /// Read the central directory into the name-pool buffer and walk it,
    /// producing one [`FileEntry`] per file record.
    fn build_file_entries<R: ReadAt + ?Sized>(
        &mut self,
        src: &R,
        eocd: &EndOfCentralDirectory,
    ) -> Result<()> {
        if eocd.cdr_size == 0 {
            return Ok(());
        }
        let cdr_size = eocd.cdr_size as usize;

        // a little slack keeps the buffer serviceable as a name pool
        let mut pool: Vec<u8> = Vec::new();
        pool.try_reserve_exact(cdr_size + 16)
            .map_err(|_| ZipDirError::NoMemory)?;
        pool.resize(cdr_size + 16, 0);

        self.read_header_data(src, eocd.cdr_offset as u64, &mut pool[..cdr_size])?;

        let mut pos = 0usize;
        while pos + CdrFileHeader::SIZE <= cdr_size {
            let header = CdrFileHeader::from_bytes(&pool[pos..pos + CdrFileHeader::SIZE])?;

            if header.needs_version & 0xFF > 20 {
                return Err(ZipDirError::Unsupported(
                    "the archive needs a ZIP version above 2.0",
                ));
            }

            let end_of_record = pos + header.record_len();
            if end_of_record > cdr_size {
                return Err(ZipDirError::CdrCorrupt(
                    "a file record overlaps the end of the directory",
                ));
            }

            let name_start = pos + CdrFileHeader::SIZE;
            let name_len = header.name_length as usize;

            // walk the extra field; only the NTFS timestamp block matters
            let extra_start = name_start + name_len;
            let extra = &pool[extra_start..extra_start + header.extra_length as usize];
            let mut ntfs_modify_time = 0u64;
            let mut cur = 0usize;
            while cur + 4 <= extra.len() {
                let id = u16::from_le_bytes([extra[cur], extra[cur + 1]]);
                let size = u16::from_le_bytes([extra[cur + 2], extra[cur + 3]]) as usize;
                cur += 4;
                if cur + size > extra.len() {
                    break; // malformed field, ignore the rest of the area
                }
                if id == EXTRA_NTFS {
                    if let Some(time) = ntfs_last_modify(&extra[cur..cur + size]) {
                        ntfs_modify_time = time;
                    }
                }
                cur += size;
            }

            let is_directory =
                name_len > 0 && matches!(pool[name_start + name_len - 1], b'/' | b'\\');

            if name_len == 0 {
                warn!("skipping a central directory record with an empty file name");
            } else if !is_directory {
                // normalize the name in place; the buffer is the name pool
                for byte in &mut pool[name_start..name_start + name_len] {
                    if *byte == b'\\' {
                        *byte = b'/';
                    } else {
                        byte.make_ascii_lowercase();
                    }
                }
                self.add_file_entry(src, eocd, &pool, name_start, name_len, &header, ntfs_modify_time)?;
            }

            pos = end_of_record;
        }

        self.name_pool = pool;
        Ok(())
    }

    /// Read the raw central directory bytes. Decrypting or verifying them
    /// would happen here; this reader supports neither, so encrypted
    /// headers are rejected and a signed directory is accepted unverified.
    fn read_header_data<R: ReadAt + ?Sized>(
        &self,
        src: &R,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<()> {
        src.read_exact_at(offset, buf)?;

        if self.encryption != HeaderEncryption::NotEncrypted {
            warn!("the archive headers are encrypted with a technique this reader cannot decrypt");
            return Err(ZipDirError::Unsupported("encrypted archive headers"));
        }

        if self.signing == HeaderSignature::CdrSigned {
            warn!("central directory signature verification is not implemented; continuing without it");
        }

        Ok(())
    }

    /// Validate one file record and insert it into the index.
    fn add_file_entry<R: ReadAt + ?Sized>(
        &mut self,
        src: &R,
        eocd: &EndOfCentralDirectory,
        pool: &[u8],
        name_start: usize,
        name_len: usize,
        header: &CdrFileHeader,
        ntfs_modify_time: u64,
    ) -> Result<()> {
        if header.local_header_offset > eocd.cdr_offset {
            return Err(ZipDirError::CdrCorrupt(
                "a file descriptor points outside the archive boundaries",
            ));
        }

        let method = CompressionMethod::from_u16(header.method);
        if method.is_store_family() && header.compressed_size != header.uncompressed_size {
            return Err(ZipDirError::ValidationFailed(
                "a stored file declares a compressed size that does not match its \
                 uncompressed size",
            ));
        }

        let name = &pool[name_start..name_start + name_len];
        let (data_offset, eof_offset) = self.init_data_offset(src, header, name)?;

        if self.init_method >= InitMethod::Validate {
            self.validate_entry(src, header, data_offset)?;
        }

        let entry = FileEntry {
            method,
            crc32: header.crc32,
            compressed_size: header.compressed_size,
            uncompressed_size: header.uncompressed_size,
            local_header_offset: header.local_header_offset,
            data_offset,
            eof_offset,
            last_mod_time: header.last_mod_time,
            last_mod_date: header.last_mod_date,
            ntfs_modify_time,
            name_offset: name_start as u32,
        };

        if self.build_crc_map {
            self.crc_map.insert(crc32fast::hash(name), entry);
        } else {
            self.tree.add(pool, NameRef::new(name_start, name_len), entry);
        }

        Ok(())
    }

    /// Determine where the entry's compressed payload starts.
    ///
    /// With encrypted headers, or when the init method says to trust the
    /// directory, the offset follows from the CDR record alone (the pak
    /// tool guarantees no extra data in the local headers of encrypted
    /// archives). Otherwise the local file header is read and cross-checked
    /// against the directory record first.
    fn init_data_offset<R: ReadAt + ?Sized>(
        &self,
        src: &R,
        header: &CdrFileHeader,
        name: &[u8],
    ) -> Result<(u32, u32)> {
        let data_offset = if self.encryption != HeaderEncryption::NotEncrypted
            || self.init_method >= InitMethod::Full
        {
            header.local_header_offset as u64
                + LocalFileHeader::SIZE as u64
                + header.name_length as u64
        } else {
            let mut buf = vec![0u8; LocalFileHeader::SIZE + header.name_length as usize];
            src.read_exact_at(header.local_header_offset as u64, &mut buf)?;
            let local = LocalFileHeader::from_bytes(&buf[..LocalFileHeader::SIZE])?;

            if local.method != header.method
                || local.crc32 != header.crc32
                || local.compressed_size != header.compressed_size
                || local.uncompressed_size != header.uncompressed_size
                || local.name_length != header.name_length
            {
                return Err(ZipDirError::ValidationFailed(
                    "the local file header does not match the central directory record",
                ));
            }

            let local_name = &buf[LocalFileHeader::SIZE..];
            if !local_name
                .iter()
                .zip(name.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
            {
                return Err(ZipDirError::ValidationFailed(
                    "the local file name does not match the central directory record",
                ));
            }

            header.local_header_offset as u64
                + LocalFileHeader::SIZE as u64
                + local.name_length as u64
                + local.extra_length as u64
        };

        if data_offset >= self.eocd_pos {
            return Err(ZipDirError::ValidationFailed(
                "a file crosses the boundaries of the archive",
            ));
        }

        let eof_offset = data_offset + header.compressed_size as u64;
        Ok((data_offset as u32, eof_offset as u32))
    }

    /// Read the entry's payload, decompress it and check its CRC32 against
    /// the directory record. Diagnostic mode; see [`InitMethod::Validate`].
    fn validate_entry<R: ReadAt + ?Sized>(
        &self,
        src: &R,
        header: &CdrFileHeader,
        data_offset: u32,
    ) -> Result<()> {
        let compressed_len = header.compressed_size as usize;
        let uncompressed_len = header.uncompressed_size as usize;

        let mut compressed: Vec<u8> = Vec::new();
        compressed
            .try_reserve_exact(compressed_len)
            .map_err(|_| ZipDirError::ZlibOom)?;
        compressed.resize(compressed_len, 0);
        src.read_exact_at(data_offset as u64, &mut compressed)?;

        let uncompressed = match CompressionMethod::from_u16(header.method) {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflate => {
                let mut out: Vec<u8> = Vec::new();
                out.try_reserve_exact(uncompressed_len)
                    .map_err(|_| ZipDirError::ZlibOom)?;
                out.resize(uncompressed_len, 0);

                // pak entries use raw deflate, no zlib framing
                let mut inflater = Decompress::new(false);
                match inflater.decompress(&compressed, &mut out, FlushDecompress::Finish) {
                    Ok(Status::StreamEnd) => {}
                    Ok(Status::BufError) => return Err(ZipDirError::ZlibCorrupted),
                    Ok(Status::Ok) => return Err(ZipDirError::ZlibFailed),
                    Err(_) => return Err(ZipDirError::ZlibCorrupted),
                }
                if inflater.total_out() != uncompressed_len as u64 {
                    return Err(ZipDirError::CorruptedData(
                        "the uncompressed stream does not match the size stored in the \
                         archive headers",
                    ));
                }
                out
            }
            _ => {
                return Err(ZipDirError::Unsupported(
                    "only stored and deflated entries can be validated",
                ));
            }
        };

        let actual = crc32fast::hash(&uncompressed);
        if actual != header.crc32 {
            return Err(ZipDirError::Crc32Check {
                expected: header.crc32,
                actual,
            });
        }

        Ok(())
    }
}
