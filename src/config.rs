//! Runtime configuration for the manifest pipeline.
//!
//! The tool has exactly two tunables, both constructed once in `main` and
//! passed by reference through the pipeline instead of living in ambient
//! global state.

/// Entries smaller than this many bytes are hashed in memory; entries at or
/// above it are staged to disk first.
pub const DEFAULT_IN_MEM_THRESHOLD: u64 = 1_048_576;

#[derive(Debug, Clone)]
pub struct Config {
    /// Size threshold (bytes) selecting the in-memory vs on-disk hashing path.
    pub in_mem_threshold: u64,
    /// When true, progress diagnostics and the resulting manifest text are
    /// printed to stdout.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            in_mem_threshold: DEFAULT_IN_MEM_THRESHOLD,
            verbose: true,
        }
    }
}
