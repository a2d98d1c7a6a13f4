use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path};

use anyhow::Context;
use log::{debug, warn};
use pixpack_core::Container;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// End-of-central-directory record signature, `PK\x05\x06`.
const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];

/// Fixed part of the EOCD record; the archive comment follows it.
const EOCD_LEN: usize = 22;

const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// Entries at or above this size need ZIP64 extra fields.
pub const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Whether an entry of `len` bytes must be written as a ZIP64 entry.
pub fn needs_zip64(len: u64) -> bool {
    len >= ZIP64_THRESHOLD
}

/// Zip archive of a directory tree.
///
/// Entries are written in sorted path order with relative, `/`-separated
/// names. Empty directories get their own entries so the tree round-trips.
/// Entry timestamps are left at the DOS epoch (1980-01-01), so files with
/// older modification times never trip the zip date range. Files keep their
/// unix mode; directories are always restored as `0o755`. Files of 4 GiB
/// and more are written as ZIP64 entries.
#[derive(Debug, Clone)]
pub struct ZipContainer {
    /// Deflate file data; `false` stores it verbatim.
    pub deflate: bool,
}

impl Default for ZipContainer {
    fn default() -> Self {
        Self { deflate: true }
    }
}

impl ZipContainer {
    pub fn stored() -> Self {
        Self { deflate: false }
    }

    fn file_options(&self) -> FileOptions {
        let method = if self.deflate {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        FileOptions::default().compression_method(method)
    }
}

/// Zip entry name for a path relative to the archive root.
fn entry_name(relative: &Path) -> anyhow::Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| anyhow::anyhow!("path {:?} is not valid UTF-8", relative))?,
            ),
            _ => anyhow::bail!("unexpected path component in {:?}", relative),
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn with_permissions(options: FileOptions, meta: &fs::Metadata) -> FileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn with_permissions(options: FileOptions, _meta: &fs::Metadata) -> FileOptions {
    options
}

impl Container for ZipContainer {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn recovery_file_name(&self) -> &'static str {
        "restored.zip"
    }

    fn archive_directory(&self, source: &Path) -> anyhow::Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let mut files = 0usize;

        for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", source.display()))?;
            let path = entry.path();
            let name = entry_name(path.strip_prefix(source)?)?;

            // follow symlinks to files; linked directories are not descended
            let meta = fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
            if entry.file_type().is_symlink() && meta.is_dir() {
                warn!("skipping symlinked directory {}", path.display());
                continue;
            }

            if meta.is_dir() {
                // extraction applies a directory's mode before its children
                // exist, so a read-only source directory would lock them out
                zip.add_directory(name.as_str(), self.file_options())?;
            } else if meta.is_file() {
                let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                let options = with_permissions(self.file_options(), &meta)
                    .large_file(needs_zip64(data.len() as u64));
                zip.start_file(name.as_str(), options)?;
                zip.write_all(&data)?;
                debug!("  + {} ({} bytes)", name, data.len());
                files += 1;
            } else {
                warn!("skipping special file {}", path.display());
            }
        }

        let bytes = zip.finish()?.into_inner();
        debug!("archived {} file(s) into {} bytes", files, bytes.len());
        Ok(bytes)
    }

    fn has_signature(&self, bytes: &[u8]) -> bool {
        if bytes.len() < EOCD_LEN {
            return false;
        }
        let window_start = bytes.len().saturating_sub(EOCD_LEN + MAX_COMMENT_LEN);
        let window = &bytes[window_start..];
        (0..=window.len() - EOCD_LEN).rev().any(|pos| {
            if window[pos..pos + 4] != EOCD_SIGNATURE {
                return false;
            }
            let comment_len = u16::from_le_bytes([window[pos + 20], window[pos + 21]]) as usize;
            pos + EOCD_LEN + comment_len <= window.len()
        })
    }

    fn extract_archive(&self, bytes: &[u8], dest: &Path) -> anyhow::Result<()> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).context("reading zip central directory")?;
        let entries = archive.len();
        archive
            .extract(dest)
            .with_context(|| format!("extracting into {}", dest.display()))?;
        debug!("extracted {} entries into {}", entries, dest.display());
        Ok(())
    }
}
