//! # Package archive access
//!
//! Thin wrapper around the `zip` container: opening, index-order enumeration,
//! per-entry readers for the hashing paths, and the final manifest insertion.
//!
//! Insertion replaces any existing manifest entry by rewriting the archive
//! into a temp file next to the original (raw-copying every other entry, so
//! no recompression happens) and atomically renaming it over the original.
//! The rewrite only runs after the whole hashing pass has succeeded, so a
//! failed run never leaves a half-written manifest behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::read::ZipFile;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::ManifestError;
use crate::manifest::MANIFEST_ENTRY_NAME;

/// Read-only view of one slot of the archive index.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    /// Position in the archive index; used to reopen the entry for reading.
    pub index: usize,
    /// Entry path as stored in the archive.
    pub name: String,
    /// Uncompressed size as declared by the index. Not verified here; the
    /// hasher checks it against the bytes actually read.
    pub size: u64,
}

impl EntryMeta {
    /// Directory markers carry no content. Zip directory entries end with
    /// `/`; a trailing `\` is treated the same for archives produced by
    /// tools that stored backslash paths.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/') || self.name.ends_with('\\')
    }
}

/// An open package archive, exclusively owned for the program's lifetime.
pub struct PackageArchive {
    path: PathBuf,
    zip: ZipArchive<File>,
}

impl PackageArchive {
    /// Opens the archive at `path`. Any failure here is fatal for the tool:
    /// with no readable container there is nothing to process.
    pub fn open(path: &Path) -> Result<Self, ManifestError> {
        let file = File::open(path).map_err(|source| ManifestError::Io { source, path: path.to_path_buf() })?;
        let zip = ZipArchive::new(file).map_err(|source| ManifestError::Zip { source, archive: path.to_path_buf() })?;
        Ok(Self { path: path.to_path_buf(), zip })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of index slots, including directory markers.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// Archive-level comment, lossily decoded.
    pub fn comment(&self) -> String {
        String::from_utf8_lossy(self.zip.comment()).into_owned()
    }

    /// Returns the descriptor for index slot `index` without decompressing
    /// anything.
    pub fn entry_meta(&mut self, index: usize) -> Result<EntryMeta, ManifestError> {
        let entry = self
            .zip
            .by_index_raw(index)
            .map_err(|source| ManifestError::Zip { source, archive: self.path.clone() })?;
        Ok(EntryMeta {
            index,
            name: entry.name().to_string(),
            size: entry.size(),
        })
    }

    /// Opens a streaming reader over the entry's decompressed bytes.
    pub fn entry_reader(&mut self, entry: &EntryMeta) -> Result<ZipFile<'_>, ManifestError> {
        let archive = self.path.clone();
        self.zip.by_index(entry.index).map_err(|source| ManifestError::EntryStream {
            source,
            archive,
            entry: entry.name.clone(),
        })
    }

    /// Extracts a single entry below `dir`, creating intermediate directories
    /// as needed, and returns the path of the extracted file.
    pub fn extract_entry(&mut self, entry: &EntryMeta, dir: &Path) -> Result<PathBuf, ManifestError> {
        let archive = self.path.clone();
        let mut reader = self.zip.by_index(entry.index).map_err(|source| ManifestError::EntryStream {
            source,
            archive: archive.clone(),
            entry: entry.name.clone(),
        })?;

        let extract_err = |source: io::Error| ManifestError::Extract {
            source,
            archive: archive.clone(),
            entry: entry.name.clone(),
        };

        // mangled_name sanitizes absolute and parent-relative entry paths so
        // the extraction can never escape the staging directory.
        let dest = dir.join(reader.mangled_name());
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(extract_err)?;
        }
        let mut out = File::create(&dest).map_err(extract_err)?;
        io::copy(&mut reader, &mut out).map_err(extract_err)?;
        Ok(dest)
    }

    /// Writes `xml` into the archive as the `APP-LIST.xml` entry, replacing
    /// any existing entry of that name, and persists the result over the
    /// original file. Consumes the archive; this is the single mutation the
    /// tool performs.
    pub fn write_manifest(mut self, xml: &str) -> Result<(), ManifestError> {
        let staging_dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let staging = NamedTempFile::new_in(staging_dir)
            .map_err(|source| ManifestError::Io { source, path: staging_dir.to_path_buf() })?;

        let mut writer = ZipWriter::new(staging);
        for index in 0..self.zip.len() {
            let entry = self
                .zip
                .by_index_raw(index)
                .map_err(|source| ManifestError::Zip { source, archive: self.path.clone() })?;
            if entry.name() == MANIFEST_ENTRY_NAME {
                continue;
            }
            writer
                .raw_copy_file(entry)
                .map_err(|source| ManifestError::Zip { source, archive: self.path.clone() })?;
        }
        writer
            .start_file(MANIFEST_ENTRY_NAME, FileOptions::default())
            .map_err(|source| ManifestError::Zip { source, archive: self.path.clone() })?;
        writer.write_all(xml.as_bytes())?;
        let staging = writer
            .finish()
            .map_err(|source| ManifestError::Zip { source, archive: self.path.clone() })?;

        // Release the original handle before renaming over it.
        drop(self.zip);
        staging.persist(&self.path).map_err(|source| ManifestError::Persist { source })?;
        Ok(())
    }
}
