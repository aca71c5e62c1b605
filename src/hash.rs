//! Entry hashing with two interchangeable I/O strategies.
//!
//! Entries below the configured threshold are read straight from the archive
//! into memory; entries at or above it are extracted into a scoped temp
//! directory and hashed incrementally from disk, which bounds peak memory at
//! one buffer regardless of entry size. Both paths produce byte-identical
//! digests for identical content; the split is purely a performance choice.
//!
//! The temp directory lives in a [`tempfile::TempDir`], so it is removed
//! recursively when the guard drops, on the error paths as well as on
//! success.

use std::fs::File;
use std::io::Read;

use sha2::{Digest, Sha256};

use crate::archive::{EntryMeta, PackageArchive};
use crate::config::Config;
use crate::error::ManifestError;

/// Chunk size for draining an in-archive stream on the small path.
const STREAM_CHUNK: usize = 1024;

/// Buffer size for incremental hashing from disk on the large path.
const DISK_CHUNK: usize = 1 << 20;

/// Computes the lowercase hex SHA-256 digest of the entry's complete
/// decompressed content, choosing the I/O strategy by declared size.
pub fn digest_entry(
    archive: &mut PackageArchive,
    entry: &EntryMeta,
    config: &Config,
) -> Result<String, ManifestError> {
    if entry.size < config.in_mem_threshold {
        digest_in_memory(archive, entry)
    } else {
        digest_via_disk(archive, entry)
    }
}

/// Small path: drain the entry's stream into a buffer and hash it in one
/// shot. Failure to obtain the stream reader is fatal; the archive is most
/// likely corrupt and there is no point falling back to extraction.
fn digest_in_memory(archive: &mut PackageArchive, entry: &EntryMeta) -> Result<String, ManifestError> {
    let mut reader = archive.entry_reader(entry)?;
    let mut contents = Vec::with_capacity(entry.size as usize);
    let mut chunk = [0u8; STREAM_CHUNK];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        contents.extend_from_slice(&chunk[..n]);
    }
    drop(reader);

    check_declared_size(entry, contents.len() as u64)?;
    Ok(hex::encode(Sha256::digest(&contents)))
}

/// Large path: extract the entry into a fresh temp directory and hash the
/// extracted file incrementally, never holding more than one buffer of it in
/// memory. The directory and its contents are removed when `staging` drops,
/// whether or not hashing succeeded.
fn digest_via_disk(archive: &mut PackageArchive, entry: &EntryMeta) -> Result<String, ManifestError> {
    let staging = tempfile::tempdir()
        .map_err(|source| ManifestError::Io { source, path: std::env::temp_dir() })?;
    let extracted = archive.extract_entry(entry, staging.path())?;

    let mut file = File::open(&extracted)
        .map_err(|source| ManifestError::Io { source, path: extracted.clone() })?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DISK_CHUNK];
    let mut total: u64 = 0;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        total += n as u64;
    }

    check_declared_size(entry, total)?;
    Ok(hex::encode(hasher.finalize()))
}

/// The index's declared size is trusted for strategy selection only; the
/// bytes actually read must agree with it or the manifest would record a
/// digest for content of a different length than advertised.
fn check_declared_size(entry: &EntryMeta, actual: u64) -> Result<(), ManifestError> {
    if actual != entry.size {
        return Err(ManifestError::SizeMismatch {
            entry: entry.name.clone(),
            declared: entry.size,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IN_MEM_THRESHOLD;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn fixture_archive(entries: &[(&str, &[u8])]) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
        let file = NamedTempFile::new()?;
        let mut writer = ZipWriter::new(file.reopen()?);
        for (name, data) in entries {
            writer.start_file(*name, FileOptions::default())?;
            writer.write_all(data)?;
        }
        writer.finish()?;
        Ok(file)
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn reference_digest(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Both strategies agree with each other and with a direct digest for
    /// content one byte below the default threshold.
    #[test]
    fn test_paths_agree_below_threshold() -> Result<(), Box<dyn std::error::Error>> {
        let content = patterned(DEFAULT_IN_MEM_THRESHOLD as usize - 1);
        let fixture = fixture_archive(&[("boundary.bin", &content)])?;
        let mut archive = PackageArchive::open(fixture.path())?;
        let meta = archive.entry_meta(0)?;

        let small = digest_in_memory(&mut archive, &meta)?;
        let large = digest_via_disk(&mut archive, &meta)?;
        assert_eq!(small, large);
        assert_eq!(small, reference_digest(&content));
        Ok(())
    }

    /// Same agreement for content exactly at the threshold, where dispatch
    /// flips to the disk path.
    #[test]
    fn test_paths_agree_at_threshold() -> Result<(), Box<dyn std::error::Error>> {
        let content = patterned(DEFAULT_IN_MEM_THRESHOLD as usize);
        let fixture = fixture_archive(&[("boundary.bin", &content)])?;
        let mut archive = PackageArchive::open(fixture.path())?;
        let meta = archive.entry_meta(0)?;

        let small = digest_in_memory(&mut archive, &meta)?;
        let large = digest_via_disk(&mut archive, &meta)?;
        assert_eq!(small, large);
        assert_eq!(small, reference_digest(&content));

        // Dispatch takes the disk path at the boundary and must not change
        // the result.
        let config = Config::default();
        assert_eq!(digest_entry(&mut archive, &meta, &config)?, small);
        Ok(())
    }

    /// Known digest of a tiny entry via the dispatching entry point.
    #[test]
    fn test_known_digest_small_entry() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = fixture_archive(&[("readme.txt", b"hello world")])?;
        let mut archive = PackageArchive::open(fixture.path())?;
        let meta = archive.entry_meta(0)?;

        let digest = digest_entry(&mut archive, &meta, &Config::default())?;
        assert_eq!(digest, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
        Ok(())
    }

    /// A lowered threshold routes even tiny entries through the disk path,
    /// with an identical digest.
    #[test]
    fn test_threshold_is_configurable() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = fixture_archive(&[("readme.txt", b"hello world")])?;
        let mut archive = PackageArchive::open(fixture.path())?;
        let meta = archive.entry_meta(0)?;

        let config = Config { in_mem_threshold: 4, verbose: false };
        let digest = digest_entry(&mut archive, &meta, &config)?;
        assert_eq!(digest, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
        Ok(())
    }

    /// A declared size that disagrees with the bytes read is a distinct
    /// error, not a silent wrong manifest line.
    #[test]
    fn test_declared_size_mismatch_is_detected() -> Result<(), Box<dyn std::error::Error>> {
        let fixture = fixture_archive(&[("readme.txt", b"hello world")])?;
        let mut archive = PackageArchive::open(fixture.path())?;
        let mut meta = archive.entry_meta(0)?;
        meta.size = 4096;

        match digest_in_memory(&mut archive, &meta) {
            Err(ManifestError::SizeMismatch { declared, actual, .. }) => {
                assert_eq!(declared, 4096);
                assert_eq!(actual, 11);
                Ok(())
            }
            other => panic!("expected SizeMismatch, got {:?}", other.map(|_| ())),
        }
    }
}
