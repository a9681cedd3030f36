use clap::Parser;

use crate::zipdir::{Flags, InitMethod};

#[derive(Parser, Debug)]
#[command(name = "pakdir")]
#[command(version)]
#[command(about = "Inspect and validate game asset pack (.pak) archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  pakdir assets.pak              show a summary of the archive\n  \
  pakdir -l assets.pak           list entry paths\n  \
  pakdir -v --validate game.pak  full listing, decompress and CRC-check everything")]
pub struct Cli {
    /// Pak file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List entries (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List entries verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Decompress every entry and verify its CRC32
    #[arg(long, conflicts_with = "full")]
    pub validate: bool,

    /// Trust the central directory, skip local header cross-checks
    #[arg(long)]
    pub full: bool,

    /// Index entries by name CRC32 instead of building the directory tree
    #[arg(long = "crc-names")]
    pub crc_names: bool,
}

impl Cli {
    pub fn init_method(&self) -> InitMethod {
        if self.validate {
            InitMethod::Validate
        } else if self.full {
            InitMethod::Full
        } else {
            InitMethod::Default
        }
    }

    pub fn flags(&self) -> Flags {
        let mut flags = Flags::READ_ONLY;
        if self.crc_names {
            flags = flags | Flags::FILENAMES_AS_CRC32;
        }
        flags
    }
}
