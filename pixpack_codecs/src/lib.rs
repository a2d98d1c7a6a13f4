mod png_format;
mod zip_container;

pub use png_format::{PngCompression, PngFormat};
pub use zip_container::{needs_zip64, ZipContainer, ZIP64_THRESHOLD};

use pixpack_core::{Container, ImageFormat};

/// Resolve an image format from the name stored in a manifest or given on
/// the command line.
pub fn image_format_by_name(name: &str) -> anyhow::Result<Box<dyn ImageFormat>> {
    match name.to_ascii_lowercase().as_str() {
        "png" => Ok(Box::new(PngFormat::default())),
        other => anyhow::bail!("unknown image format '{}'. Valid options: png", other),
    }
}

/// Resolve a container from the name stored in a manifest or given on the
/// command line.
pub fn container_by_name(name: &str) -> anyhow::Result<Box<dyn Container>> {
    match name.to_ascii_lowercase().as_str() {
        "zip" => Ok(Box::new(ZipContainer::default())),
        other => anyhow::bail!("unknown container '{}'. Valid options: zip", other),
    }
}
