use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{error, info, warn};

use crate::chunker;
use crate::cleanup::remove_best_effort;
use crate::container::Container;
use crate::error::PixpackError;
use crate::image_format::ImageFormat;
use crate::manifest::Manifest;
use crate::naming::{self, PartFile};
use crate::options::DecodeOptions;
use crate::raster;

/// What a decode run produced.
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub part_count: usize,
    /// Length of the reassembled archive.
    pub stream_len: u64,
    /// Whether the parts were checked against a manifest.
    pub verified: bool,
    /// Set when the reassembled archive was left on disk.
    pub archive: Option<PathBuf>,
}

/// Restores a directory from numbered images.
///
/// # Pipeline
/// ```text
/// encoded_part_{1..n} ─sort by index─▶ read raster ─flatten─▶ unframe ─▶ payload i
/// payload 1..n ─join─▶ archive ─signature check─▶ extract into output
/// ```
/// All images are decoded before anything is written, so a corrupt or
/// foreign image aborts the run without touching the output directory.
pub struct Decoder {
    container: Box<dyn Container>,
    format: Box<dyn ImageFormat>,
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(
        container: Box<dyn Container>,
        format: Box<dyn ImageFormat>,
        options: DecodeOptions,
    ) -> Self {
        Self {
            container,
            format,
            options,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode every part in `input` and return the reassembled stream.
    ///
    /// Writes nothing. Fails on the first part that cannot be decoded, naming
    /// the file.
    pub fn restore_stream(&self, input: &Path) -> anyhow::Result<Vec<u8>> {
        self.restore(input).map(|(stream, _, _)| stream)
    }

    /// Reassemble the archive from `input` and extract it into `output`.
    pub fn decode_directory(&self, input: &Path, output: &Path) -> anyhow::Result<DecodeReport> {
        let (stream, part_count, verified) = self.restore(input)?;

        fs::create_dir_all(output)
            .with_context(|| format!("creating output directory {}", output.display()))?;
        let archive_path = output.join(self.container.recovery_file_name());

        if !self.container.has_signature(&stream) {
            write_recovery(&archive_path, &stream)?;
            error!("reassembled data is not a valid {} archive", self.container.name());
            warn!("possible causes:");
            warn!("  1. the images were damaged or re-encoded by another program");
            warn!("  2. the images were produced by a different encoder");
            warn!(
                "data saved as {}; try extracting it manually",
                archive_path.display()
            );
            return Err(PixpackError::InvalidArchiveFormat {
                recovery_path: archive_path,
            }
            .into());
        }

        if archive_path.exists() {
            // from an earlier failed run; extraction recreates it if the archive holds one
            warn!("removing leftover {}", archive_path.display());
            remove_best_effort(&archive_path);
        }

        info!("extracting archive into {}...", output.display());
        if let Err(e) = self.container.extract_archive(&stream, output) {
            write_recovery(&archive_path, &stream)?;
            warn!("archive kept at {}", archive_path.display());
            return Err(PixpackError::ExtractionError(format!("{:#}", e)).into());
        }

        let archive = if self.options.keep_archive {
            if archive_path.exists() {
                // the extracted tree has a file of the same name
                warn!(
                    "not keeping archive: {} already exists",
                    archive_path.display()
                );
                None
            } else {
                write_recovery(&archive_path, &stream)?;
                Some(archive_path)
            }
        } else {
            None
        };

        info!("success! files restored into {}", output.display());

        Ok(DecodeReport {
            part_count,
            stream_len: stream.len() as u64,
            verified,
            archive,
        })
    }

    fn restore(&self, input: &Path) -> anyhow::Result<(Vec<u8>, usize, bool)> {
        let parts = naming::discover_parts(input, self.format.extension())
            .with_context(|| format!("looking for encoded images in {}", input.display()))?;

        let manifest = if self.options.verify_manifest {
            Manifest::load(input)
                .with_context(|| format!("reading manifest in {}", input.display()))?
        } else {
            None
        };
        if let Some(manifest) = &manifest {
            manifest.verify_parts(&parts)?;
        }

        info!("decoding {} image(s)...", parts.len());
        let mut payloads = Vec::with_capacity(parts.len());
        for part in &parts {
            let payload = self
                .decode_part(part, manifest.as_ref())
                .with_context(|| format!("decoding {}", part.path.display()))?;
            info!("  → processed {}", part.file_name());
            payloads.push(payload);
        }

        let stream = chunker::join(&payloads);
        if let Some(manifest) = &manifest {
            manifest.verify_stream(&stream)?;
        }

        Ok((stream, parts.len(), manifest.is_some()))
    }

    fn decode_part(&self, part: &PartFile, manifest: Option<&Manifest>) -> anyhow::Result<Vec<u8>> {
        let raster = self.format.read_raster(&part.path)?;
        let payload = raster::decode_payload(&raster)?;
        if let Some(manifest) = manifest {
            manifest.verify_payload(part.index, payload)?;
        }
        Ok(payload.to_vec())
    }
}

fn write_recovery(path: &Path, stream: &[u8]) -> anyhow::Result<()> {
    fs::write(path, stream).with_context(|| format!("writing {}", path.display()))
}
