use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};

use crate::chunker;
use crate::cleanup::remove_best_effort;
use crate::container::Container;
use crate::frame;
use crate::image_format::ImageFormat;
use crate::manifest::Manifest;
use crate::naming::{self, part_file_name};
use crate::options::EncodeOptions;
use crate::raster;

/// What an encode run produced.
#[derive(Debug, Clone)]
pub struct EncodeReport {
    /// Length of the encoded stream (the archive, for directory encodes).
    pub stream_len: u64,
    /// Image paths in sequence order.
    pub parts: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

impl EncodeReport {
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

/// Turns a directory (or any byte stream) into numbered images.
///
/// # Pipeline
/// ```text
/// directory ─archive─▶ stream ─split─▶ chunk 1..n
/// chunk i ─frame─▶ [len:u32 BE][payload] ─map─▶ N×N×3 raster ─write─▶ encoded_part_i.<ext>
/// ```
/// Every chunk is held in memory while its image is written; the first
/// failure stops the run.
pub struct Encoder {
    container: Box<dyn Container>,
    format: Box<dyn ImageFormat>,
    options: EncodeOptions,
}

impl Encoder {
    pub fn new(
        container: Box<dyn Container>,
        format: Box<dyn ImageFormat>,
        options: EncodeOptions,
    ) -> Self {
        Self {
            container,
            format,
            options,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Archive `source` and encode the archive into images under `output`.
    pub fn encode_directory(&self, source: &Path, output: &Path) -> anyhow::Result<EncodeReport> {
        self.options.validate()?;
        if !source.is_dir() {
            anyhow::bail!("source {} is not a directory", source.display());
        }

        info!(
            "archiving {} as {}...",
            source.display(),
            self.container.name()
        );
        let archive = self
            .container
            .archive_directory(source)
            .with_context(|| format!("archiving {}", source.display()))?;
        info!("archive is {} bytes", archive.len());

        self.encode_stream(&archive, output)
    }

    /// Encode an arbitrary byte stream into images under `output`.
    pub fn encode_stream(&self, stream: &[u8], output: &Path) -> anyhow::Result<EncodeReport> {
        self.options.validate()?;
        fs::create_dir_all(output)
            .with_context(|| format!("creating output directory {}", output.display()))?;

        if self.options.clear_stale_parts {
            self.clear_stale(output)?;
        }

        let chunks = chunker::split(stream, self.options.max_chunk_size)?;
        let total = chunks.len();
        info!(
            "splitting {} bytes into {} part(s) of at most {} bytes",
            stream.len(),
            total,
            self.options.max_chunk_size
        );

        let mut manifest = Manifest::new(
            self.container.name(),
            self.format.name(),
            self.options.max_chunk_size,
        );
        let mut parts = Vec::with_capacity(total);

        for (i, chunk) in chunks.iter().enumerate() {
            let index = u32::try_from(i + 1).context("too many parts for a u32 index")?;
            let file_name = part_file_name(index, self.format.extension());
            let path = output.join(&file_name);

            let framed = frame::frame(chunk)?;
            let raster = raster::encode(&framed);
            self.format
                .write_raster(&raster, &path)
                .with_context(|| format!("writing {}", path.display()))?;

            info!(
                "  → created {} ({}/{}, {} bytes, {}x{} px)",
                file_name,
                index,
                total,
                chunk.len(),
                raster.width(),
                raster.height()
            );
            manifest.push_part(index, &file_name, chunk);
            parts.push(path);
        }

        manifest.seal(stream);
        let manifest_path = if self.options.write_manifest {
            let path = manifest
                .write(output)
                .with_context(|| format!("writing manifest into {}", output.display()))?;
            debug!("manifest written to {}", path.display());
            Some(path)
        } else {
            None
        };

        info!("encoded into {} image(s) in {}", parts.len(), output.display());

        Ok(EncodeReport {
            stream_len: stream.len() as u64,
            parts,
            manifest: manifest_path,
        })
    }

    /// Remove leftovers from an earlier run so they cannot join this one's
    /// sequence at decode time.
    fn clear_stale(&self, output: &Path) -> anyhow::Result<()> {
        let stale = naming::list_part_names(output, self.format.extension())
            .with_context(|| format!("scanning {}", output.display()))?;
        if !stale.is_empty() {
            info!(
                "removing {} stale part(s) from {}",
                stale.len(),
                output.display()
            );
        }
        for part in &stale {
            remove_best_effort(&part.path);
        }
        let manifest = Manifest::path_in(output);
        if manifest.exists() {
            remove_best_effort(&manifest);
        }
        Ok(())
    }
}
