use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{PixpackError, Result};
use crate::naming::PartFile;

/// Name of the JSON sidecar written next to the encoded images.
pub const MANIFEST_FILE_NAME: &str = "pixpack_manifest.json";

pub const MANIFEST_VERSION: u32 = 1;

/// One entry per encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartEntry {
    /// 1-based sequence index, identical to the one in `file_name`.
    pub index: u32,
    pub file_name: String,
    /// Length of the unframed payload carried by this image.
    pub payload_len: u64,
    /// xxhash3-64 of the payload.
    pub checksum: u64,
}

/// Explicit record of an encode run: which parts exist, in which order, and
/// what each one must decode to.
///
/// Decoding works without it; when present it turns silent corruption of an
/// image or a missing file into a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    /// Container name (e.g. `zip`) used to build the stream.
    pub container: String,
    /// Image format name (e.g. `png`) the parts were written with.
    pub image_format: String,
    pub max_chunk_size: u64,
    /// Length of the reassembled stream.
    pub total_len: u64,
    /// xxhash3-64 of the reassembled stream.
    pub checksum: u64,
    pub parts: Vec<PartEntry>,
}

impl Manifest {
    pub fn new(container: &str, image_format: &str, max_chunk_size: u64) -> Self {
        Self {
            version: MANIFEST_VERSION,
            container: container.to_string(),
            image_format: image_format.to_string(),
            max_chunk_size,
            total_len: 0,
            checksum: 0,
            parts: Vec::new(),
        }
    }

    /// Record a part after its image has been written.
    pub fn push_part(&mut self, index: u32, file_name: &str, payload: &[u8]) {
        self.parts.push(PartEntry {
            index,
            file_name: file_name.to_string(),
            payload_len: payload.len() as u64,
            checksum: xxh3_64(payload),
        });
    }

    /// Record the length and checksum of the whole stream.
    pub fn seal(&mut self, stream: &[u8]) {
        self.total_len = stream.len() as u64;
        self.checksum = xxh3_64(stream);
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE_NAME)
    }

    /// Write the manifest into `dir`, returning its path.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = Self::path_in(dir);
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Load the manifest from `dir`, or `None` when the directory has none.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(None);
        }
        let manifest: Self = serde_json::from_slice(&fs::read(&path)?)?;
        if manifest.version != MANIFEST_VERSION {
            return Err(PixpackError::ManifestMismatch(format!(
                "unsupported manifest version {} (only version {} is supported)",
                manifest.version, MANIFEST_VERSION
            )));
        }
        Ok(Some(manifest))
    }

    pub fn part(&self, index: u32) -> Option<&PartEntry> {
        self.parts.iter().find(|p| p.index == index)
    }

    /// Check that the discovered parts are exactly the ones recorded.
    pub fn verify_parts(&self, parts: &[PartFile]) -> Result<()> {
        let recorded: BTreeSet<u32> = self.parts.iter().map(|p| p.index).collect();
        let found: BTreeSet<u32> = parts.iter().map(|p| p.index).collect();

        if let Some(missing) = recorded.difference(&found).next() {
            return Err(PixpackError::MissingPart(*missing));
        }
        if let Some(extra) = found.difference(&recorded).next() {
            return Err(PixpackError::ManifestMismatch(format!(
                "part {} is not listed in the manifest ({} parts recorded)",
                extra,
                recorded.len()
            )));
        }
        Ok(())
    }

    /// Check one decoded payload against its recorded length and checksum.
    pub fn verify_payload(&self, index: u32, payload: &[u8]) -> Result<()> {
        let entry = self.part(index).ok_or_else(|| {
            PixpackError::ManifestMismatch(format!("part {} is not listed in the manifest", index))
        })?;
        if entry.payload_len != payload.len() as u64 {
            return Err(PixpackError::ManifestMismatch(format!(
                "part {} decoded to {} bytes but the manifest says {}",
                index,
                payload.len(),
                entry.payload_len
            )));
        }
        let actual = xxh3_64(payload);
        if actual != entry.checksum {
            return Err(PixpackError::ChecksumMismatch {
                what: format!("part {}", index),
                expected: entry.checksum,
                actual,
            });
        }
        Ok(())
    }

    /// Check the reassembled stream against the recorded totals.
    pub fn verify_stream(&self, stream: &[u8]) -> Result<()> {
        if self.total_len != stream.len() as u64 {
            return Err(PixpackError::ManifestMismatch(format!(
                "reassembled {} bytes but the manifest says {}",
                stream.len(),
                self.total_len
            )));
        }
        let actual = xxh3_64(stream);
        if actual != self.checksum {
            return Err(PixpackError::ChecksumMismatch {
                what: "reassembled stream".to_string(),
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}
