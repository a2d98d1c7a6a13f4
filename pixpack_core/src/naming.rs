use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PixpackError, Result};

/// File name prefix shared by every encoded part.
pub const PART_PREFIX: &str = "encoded_part_";

/// One encoded image on disk and the sequence index parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartFile {
    pub index: u32,
    pub path: PathBuf,
}

impl PartFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `encoded_part_<index>.<extension>`
pub fn part_file_name(index: u32, extension: &str) -> String {
    format!("{}{}.{}", PART_PREFIX, index, extension)
}

/// Parse the 1-based sequence index out of a part file name.
///
/// The name must be exactly the prefix, decimal digits, a dot, and the
/// extension (compared case-insensitively). Index 0 is never valid.
pub fn parse_part_index(file_name: &str, extension: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(PART_PREFIX)?;
    let (digits, ext) = rest.rsplit_once('.')?;
    if !ext.eq_ignore_ascii_case(extension) {
        return None;
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&index| index >= 1)
}

/// All regular files in `dir` whose names parse as parts, in directory order.
pub fn list_parts(dir: &Path, extension: &str) -> Result<Vec<PartFile>> {
    scan(dir, extension, true)
}

/// Every entry in `dir` named like a part, whatever its file type.
pub fn list_part_names(dir: &Path, extension: &str) -> Result<Vec<PartFile>> {
    scan(dir, extension, false)
}

fn scan(dir: &Path, extension: &str, files_only: bool) -> Result<Vec<PartFile>> {
    let mut parts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if files_only && !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(index) = parse_part_index(name, extension) {
            parts.push(PartFile {
                index,
                path: entry.path(),
            });
        }
    }
    Ok(parts)
}

/// Sort parts by index and check they form the sequence `1..=n`.
///
/// Filesystem and lexicographic order are never trusted: `encoded_part_10`
/// sorts after `encoded_part_9`.
pub fn order_parts(parts: Vec<PartFile>) -> Result<Vec<PartFile>> {
    let mut by_index: BTreeMap<u32, PartFile> = BTreeMap::new();
    for part in parts {
        if let Some(existing) = by_index.get(&part.index) {
            return Err(PixpackError::DuplicatePart {
                index: part.index,
                first: existing.path.clone(),
                second: part.path,
            });
        }
        by_index.insert(part.index, part);
    }

    for (expected, &index) in (1u32..).zip(by_index.keys()) {
        if index != expected {
            return Err(PixpackError::MissingPart(expected));
        }
    }

    Ok(by_index.into_values().collect())
}

/// Discover the parts in `dir` and return them in decode order.
pub fn discover_parts(dir: &Path, extension: &str) -> Result<Vec<PartFile>> {
    let parts = list_parts(dir, extension)?;
    if parts.is_empty() {
        return Err(PixpackError::NoParts(dir.to_path_buf()));
    }
    order_parts(parts)
}
