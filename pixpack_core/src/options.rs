use crate::chunker::{self, DEFAULT_MAX_CHUNK_SIZE};
use crate::error::Result;

/// Settings for one encode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Upper bound on payload bytes carried by a single image.
    pub max_chunk_size: u64,
    /// Write `pixpack_manifest.json` next to the images.
    pub write_manifest: bool,
    /// Remove part files and the manifest left in the output directory by a
    /// previous run before writing new ones.
    pub clear_stale_parts: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            write_manifest: true,
            clear_stale_parts: true,
        }
    }
}

impl EncodeOptions {
    pub fn with_max_chunk_size(mut self, max_chunk_size: u64) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        chunker::validate_chunk_size(self.max_chunk_size).map(|_| ())
    }
}

/// Settings for one decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Check parts against the manifest when one is present.
    pub verify_manifest: bool,
    /// Keep the reassembled archive in the output directory after a
    /// successful extraction.
    pub keep_archive: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            verify_manifest: true,
            keep_archive: false,
        }
    }
}
