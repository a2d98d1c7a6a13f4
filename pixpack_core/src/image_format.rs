use std::path::Path;

use crate::raster::Raster;

/// Lossless on-disk representation of a [`Raster`].
///
/// Implementations must store and return every pixel byte exactly: the
/// payload is recovered from raw channel values, so any lossy or
/// recompressing format breaks the round trip.
pub trait ImageFormat: Send + Sync {
    /// Stable name recorded in the manifest (e.g. `png`).
    fn name(&self) -> &'static str;

    /// File extension of the images this format writes, without the dot.
    fn extension(&self) -> &'static str;

    /// Persist `raster` at `path`, replacing any existing file.
    fn write_raster(&self, raster: &Raster, path: &Path) -> anyhow::Result<()>;

    /// Load the raster stored at `path`.
    ///
    /// Images that are not 8-bit, 3-channel are foreign and must be rejected
    /// rather than converted.
    fn read_raster(&self, path: &Path) -> anyhow::Result<Raster>;
}
