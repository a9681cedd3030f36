mod cache;
mod error;
mod factory;
mod structures;
mod tree;

pub use cache::{normalize_path, Cache, CacheFlags};
pub use error::{Result, ZipDirError};
pub use factory::{CacheFactory, Flags, InitMethod};
pub use structures::*;
pub use tree::{DirectoryTree, FileEntry, NameRef};
