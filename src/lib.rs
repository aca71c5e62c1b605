//! # applist
//!
//! Build-time utility that makes an application package archive self-describe
//! its contents: it enumerates every content entry of a zip-format package,
//! computes a SHA-256 digest per entry, and writes an `APP-LIST.xml` manifest
//! (name, size and digest per entry) back into the archive, replacing any
//! previous manifest.
//!
//! ## Key Modules
//!
//! - [`archive`]: opening the container, index enumeration and the final
//!   manifest insertion.
//! - [`hash`]: per-entry digests with an in-memory path for small entries and
//!   a temp-dir disk path for large ones.
//! - [`manifest`]: the typed `APP-LIST.xml` builder and its canonical XML
//!   formatter.
//! - [`config`]: the two runtime tunables (size threshold, verbosity).

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod manifest;

pub use error::ManifestError;

use std::path::Path;

use archive::PackageArchive;
use config::Config;
use manifest::{AppList, ManifestRecord, MANIFEST_ENTRY_NAME};

/// Runs the whole pipeline on one archive: enumerate, filter, hash, build the
/// manifest, and write it back.
///
/// The archive is mutated exactly once, after every entry has been hashed
/// successfully; any error before that point leaves the file untouched.
pub fn run(archive_path: &Path, config: &Config) -> Result<(), ManifestError> {
    let mut archive = PackageArchive::open(archive_path)?;
    if config.verbose {
        println!("File {} successfully opened", archive_path.display());
        println!("Entries: {}", archive.len());
        let comment = archive.comment();
        if !comment.is_empty() {
            println!("Comment: {}", comment);
        }
    }

    let mut app_list = AppList::new();
    for index in 0..archive.len() {
        let entry = archive.entry_meta(index)?;

        if entry.name == MANIFEST_ENTRY_NAME {
            if config.verbose {
                println!(
                    "File {} already contains {}. It will be replaced.",
                    archive_path.display(),
                    MANIFEST_ENTRY_NAME
                );
            }
            continue;
        }

        // Directory markers have no content to digest.
        if entry.is_dir() {
            continue;
        }

        let sha256 = hash::digest_entry(&mut archive, &entry, config)?;
        app_list.push(ManifestRecord { name: entry.name, size: entry.size, sha256 });
    }

    let xml = app_list.to_xml();
    if config.verbose {
        println!("Resulting {}:", MANIFEST_ENTRY_NAME);
        println!("{}", xml);
    }

    archive.write_manifest(&xml)
}
