use std::path::PathBuf;

use zip::result::ZipError;

/// The primary error type for all operations in the `applist` crate.
///
/// Every failure is fatal for the tool: the manifest update is one indivisible
/// unit of work, so errors propagate to `main` and terminate the process with
/// a non-zero exit code. No variant is ever caught and recovered internally.
#[derive(Debug)]
pub enum ManifestError {
    /// An I/O error occurred, typically while reading or writing a file.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// The archive container could not be opened or read.
    Zip { source: ZipError, archive: PathBuf },

    /// A streaming reader could not be obtained for an entry (small path).
    EntryStream { source: ZipError, archive: PathBuf, entry: String },

    /// An entry could not be extracted to the staging directory (large path).
    Extract { source: std::io::Error, archive: PathBuf, entry: String },

    /// The number of bytes read for an entry disagrees with the size declared
    /// in the archive index.
    SizeMismatch { entry: String, declared: u64, actual: u64 },

    /// The rewritten archive could not replace the original file.
    Persist { source: tempfile::PersistError },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io { source, path } => write!(f, "I/O error on path '{}': {}", path.display(), source),
            ManifestError::Zip { source, archive } => write!(f, "Can not read archive '{}': {}", archive.display(), source),
            ManifestError::EntryStream { source, archive, entry } => {
                write!(f, "Can not get zip stream reader for {}#{}: {}", archive.display(), entry, source)
            }
            ManifestError::Extract { source, archive, entry } => {
                write!(f, "Can not extract {}#{}: {}", archive.display(), entry, source)
            }
            ManifestError::SizeMismatch { entry, declared, actual } => {
                write!(f, "Entry '{}' declares {} bytes but {} were read", entry, declared, actual)
            }
            ManifestError::Persist { source } => write!(f, "Can not persist updated archive: {}", source),
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ManifestError::Io { source, .. } => Some(source),
            ManifestError::Zip { source, .. } => Some(source),
            ManifestError::EntryStream { source, .. } => Some(source),
            ManifestError::Extract { source, .. } => Some(source),
            ManifestError::Persist { source } => Some(source),
            ManifestError::SizeMismatch { .. } => None,
        }
    }
}

// Generic IO error conversion that doesn't carry a path
impl From<std::io::Error> for ManifestError {
    fn from(err: std::io::Error) -> Self {
        ManifestError::Io { source: err, path: PathBuf::new() }
    }
}
