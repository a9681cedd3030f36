//! Main entry point for the pakdir CLI application.
//!
//! This binary inspects game asset pack (.pak) archives: it opens the
//! archive through the cache factory, then lists or summarizes the
//! resulting directory index.

use anyhow::{Context, Result};
use clap::Parser;

use pakdir::{Cache, CacheFactory, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut factory = CacheFactory::new(cli.init_method(), cli.flags());
    let cache = factory
        .open(&cli.file)
        .with_context(|| format!("cannot open {}", cli.file))?;

    if cli.list || cli.verbose {
        list_entries(&cache, cli.verbose);
    } else {
        print_summary(&cache, &cli.file);
    }

    Ok(())
}

/// List the entries of an opened cache.
///
/// Supports two output formats:
/// - Simple format (`-l`): just entry paths, one per line
/// - Verbose format (`-v`): table with sizes, compression ratio and
///   timestamps, followed by a totals line
fn list_entries(cache: &Cache, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    cache.walk(|path, entry| {
        if verbose {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, _second) = entry.mod_time();

            // deflate can expand incompressible payloads; show 0%, not a
            // negative saving
            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100u64.saturating_sub(
                        entry.compressed_size as u64 * 100 / entry.uncompressed_size as u64
                    )
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                path
            );
        } else {
            println!("{}", path);
        }

        total_uncompressed += entry.uncompressed_size as u64;
        total_compressed += entry.compressed_size as u64;
        file_count += 1;
    });

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100u64.saturating_sub(total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }
}

/// Print a one-screen summary of the archive.
fn print_summary(cache: &Cache, file: &str) {
    println!("{}:", file);
    println!("  entries:            {}", cache.entry_count());
    println!("  directory offset:   {:#x}", cache.cdr_offset());
    println!("  read only:          {}", cache.is_read_only());
    println!("  header encryption:  {:?}", cache.encryption());
    println!("  directory signing:  {:?}", cache.signing());
}
