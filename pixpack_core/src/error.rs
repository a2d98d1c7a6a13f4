//! Error types for framing, raster mapping, part discovery, and restore.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PixpackError>;

/// Errors raised by the byte-level codec and the encode/decode pipelines.
#[derive(Debug, thiserror::Error)]
pub enum PixpackError {
    /// The length prefix is missing or declares more bytes than are present.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The flattened raster cannot even hold the 4-byte length prefix.
    #[error("image too small: {len} bytes of pixel data, need at least 4")]
    ImageTooSmall { len: usize },

    /// The payload does not fit the 4-byte length field.
    #[error("payload too large: {len} bytes (max {max} bytes)")]
    PayloadTooLarge { len: u64, max: u64 },

    #[error("invalid max chunk size {0}: must be between 1 and 4294967295 bytes")]
    InvalidChunkSize(u64),

    /// Pixel buffer length does not match the stated dimensions.
    #[error("invalid raster: {width}x{height} RGB needs {expected} bytes, got {actual}")]
    InvalidRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("no encoded images found in {}", .0.display())]
    NoParts(PathBuf),

    /// Two files resolved to the same sequence index.
    #[error("duplicate part index {index}: {} and {}", .first.display(), .second.display())]
    DuplicatePart {
        index: u32,
        first: PathBuf,
        second: PathBuf,
    },

    /// The sequence `1..=n` has a hole.
    #[error("missing part {0}")]
    MissingPart(u32),

    #[error("manifest mismatch: {0}")]
    ManifestMismatch(String),

    #[error("checksum mismatch for {what}: expected {expected:016x}, got {actual:016x}")]
    ChecksumMismatch {
        what: String,
        expected: u64,
        actual: u64,
    },

    /// The reassembled bytes are not a recognizable archive. They were saved
    /// to `recovery_path` for manual inspection.
    #[error("invalid archive format; recovered bytes saved to {}", .recovery_path.display())]
    InvalidArchiveFormat { recovery_path: PathBuf },

    /// The archive is well formed but an entry could not be materialized.
    #[error("extraction failed: {0}")]
    ExtractionError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest encoding error: {0}")]
    Manifest(#[from] serde_json::Error),
}
