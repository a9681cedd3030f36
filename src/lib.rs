//! # pakdir
//!
//! A game asset pack (`.pak`) directory reader and in-memory index builder.
//!
//! Pak files are single-volume ZIP archives, optionally carrying vendor
//! metadata in the end-of-central-directory comment area (encryption and
//! signing declarations). This library opens a pak, locates and parses its
//! central directory, validates it against the per-entry local file headers
//! and builds a normalized directory tree for random-access reads. Reading
//! and decompressing entry payloads is the consumer's job; the index hands
//! out exact data offsets for it.
//!
//! ## Features
//!
//! - Backwards end-of-central-directory scan tolerating trailing comments
//! - Vendor trailer decoding (legacy disk-bit hint, extended header,
//!   signing and streamcipher key-table sub-headers)
//! - Per-entry cross-validation against local file headers
//! - Optional full validation: decompress every entry and check its CRC32
//! - Directory tree sharing one name pool with the central directory
//!   buffer, or a CRC32-keyed map for name-less lookups
//!
//! ## Example
//!
//! ```no_run
//! use pakdir::{CacheFactory, Flags, InitMethod};
//!
//! fn main() -> Result<(), pakdir::ZipDirError> {
//!     let mut factory = CacheFactory::new(InitMethod::Default, Flags::READ_ONLY);
//!     let cache = factory.open("assets.pak")?;
//!
//!     if let Some(entry) = cache.find_entry("Levels\\City\\Map.dat") {
//!         println!("payload at {:#x}, {} bytes", entry.data_offset, entry.compressed_size);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod zipdir;

pub use cli::Cli;
pub use io::{ArchiveFile, OpenMode, ReadAt};
pub use zipdir::{Cache, CacheFactory, FileEntry, Flags, InitMethod, ZipDirError};
