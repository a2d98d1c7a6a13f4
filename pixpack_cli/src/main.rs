use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, Level};

use pixpack_codecs::{container_by_name, image_format_by_name, PngCompression, PngFormat};
use pixpack_core::chunker::DEFAULT_MAX_CHUNK_SIZE;
use pixpack_core::manifest::Manifest;
use pixpack_core::naming;
use pixpack_core::raster;
use pixpack_core::{
    Container, DecodeOptions, Decoder, EncodeOptions, Encoder, ImageFormat, PartFile,
};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "pixpack",
    about = "Pack a folder into lossless PNG images and restore it again",
    version
)]
struct Cli {
    /// Log debug details (per archive entry, cleanup)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a folder and encode it into numbered PNG images
    Encode {
        /// Folder to encode
        source: PathBuf,
        /// Where to write encoded_part_<n>.png (created if missing)
        output: PathBuf,
        /// Maximum payload bytes per image (default: 33554432 = 32 MiB)
        #[arg(short, long, default_value_t = DEFAULT_MAX_CHUNK_SIZE)]
        max_chunk_size: u64,
        /// PNG deflate effort: fast | default | best
        #[arg(short, long, default_value = "default")]
        compression: String,
        /// Do not write pixpack_manifest.json
        #[arg(long)]
        no_manifest: bool,
        /// Leave part files from an earlier run in the output folder
        #[arg(long)]
        keep_stale: bool,
    },
    /// Decode numbered PNG images back into the original folder
    Decode {
        /// Folder containing encoded_part_<n>.png
        input: PathBuf,
        /// Where to restore the files (created if missing)
        output: PathBuf,
        /// Keep the reassembled archive next to the restored files
        #[arg(long)]
        keep_archive: bool,
        /// Skip checking parts against pixpack_manifest.json
        #[arg(long)]
        ignore_manifest: bool,
    },
    /// Print manifest metadata and per-image statistics
    Inspect {
        /// Folder containing encoded_part_<n>.png
        input: PathBuf,
        /// Decode every image and print per-part details
        #[arg(long)]
        parts: bool,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn setup_logger(verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let level = if verbose {
        Level::Debug
    } else if quiet {
        Level::Warn
    } else {
        Level::Info
    };
    simple_logger::init_with_level(level)?;
    Ok(())
}

fn human_bytes(n: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if n < 1024 {
        return format!("{} B", n);
    }
    let exp = ((n.ilog2() / 10) as usize).min(UNITS.len());
    format!("{:.2} {}", n as f64 / (1u64 << (10 * exp)) as f64, UNITS[exp - 1])
}

/// Pick the format and container recorded by the encoder, falling back to
/// png/zip when the folder has no manifest.
fn resolve_from_manifest(
    input: &Path,
) -> anyhow::Result<(Option<Manifest>, Box<dyn Container>, Box<dyn ImageFormat>)> {
    let manifest = Manifest::load(input)
        .with_context(|| format!("reading manifest in {}", input.display()))?;
    let (container, format) = match &manifest {
        Some(m) => (
            container_by_name(&m.container)?,
            image_format_by_name(&m.image_format)?,
        ),
        None => (container_by_name("zip")?, image_format_by_name("png")?),
    };
    Ok((manifest, container, format))
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_encode(
    source: PathBuf,
    output: PathBuf,
    max_chunk_size: u64,
    compression: &str,
    no_manifest: bool,
    keep_stale: bool,
) -> anyhow::Result<()> {
    let format = PngFormat::new(PngCompression::from_name(compression)?);
    let options = EncodeOptions {
        max_chunk_size,
        write_manifest: !no_manifest,
        clear_stale_parts: !keep_stale,
    };
    let encoder = Encoder::new(container_by_name("zip")?, Box::new(format), options);

    let t0 = Instant::now();
    let report = encoder.encode_directory(&source, &output)?;
    let elapsed = t0.elapsed();

    eprintln!("  archive     : {}", human_bytes(report.stream_len));
    eprintln!("  chunk size  : {}", human_bytes(max_chunk_size));
    eprintln!("  images      : {}", report.part_count());
    if let Some(path) = &report.manifest {
        eprintln!("  manifest    : {}", path.display());
    }
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decode(
    input: PathBuf,
    output: PathBuf,
    keep_archive: bool,
    ignore_manifest: bool,
) -> anyhow::Result<()> {
    let (container, format) = if ignore_manifest {
        (container_by_name("zip")?, image_format_by_name("png")?)
    } else {
        let (_, container, format) = resolve_from_manifest(&input)?;
        (container, format)
    };
    let options = DecodeOptions {
        verify_manifest: !ignore_manifest,
        keep_archive,
    };
    let decoder = Decoder::new(container, format, options);

    let t0 = Instant::now();
    let report = decoder.decode_directory(&input, &output)?;
    let elapsed = t0.elapsed();

    eprintln!("  images      : {}", report.part_count);
    eprintln!("  archive     : {}", human_bytes(report.stream_len));
    eprintln!(
        "  verified    : {}",
        if report.verified { "manifest checksums" } else { "no manifest" }
    );
    if let Some(path) = &report.archive {
        eprintln!("  kept        : {}", path.display());
    }
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(input: PathBuf, show_parts: bool) -> anyhow::Result<()> {
    let (manifest, _, format) = resolve_from_manifest(&input)?;
    let parts = naming::discover_parts(&input, format.extension())
        .with_context(|| format!("looking for encoded images in {}", input.display()))?;

    println!("=== pixpack folder: {:?} ===", input);
    println!();
    println!("  images         : {}", parts.len());
    match &manifest {
        Some(m) => {
            println!("  manifest       : version {}", m.version);
            println!("  container      : {}", m.container);
            println!("  image format   : {}", m.image_format);
            println!("  max chunk size : {}", human_bytes(m.max_chunk_size));
            println!("  total size     : {}", human_bytes(m.total_len));
            println!("  checksum       : {:016x}", m.checksum);
            match m.verify_parts(&parts) {
                Ok(()) => println!("  part set       : matches manifest"),
                Err(e) => println!("  part set       : {}", e),
            }
        }
        None => println!("  manifest       : none"),
    }

    if show_parts {
        println!();
        println!(
            "  {:>6}  {:<28}  {:>11}  {:>12}  {}",
            "index", "file", "pixels", "payload", "status"
        );
        println!("  {}", "-".repeat(72));
        for part in &parts {
            match inspect_part(format.as_ref(), part, manifest.as_ref()) {
                Ok((dims, len, status)) => println!(
                    "  {:>6}  {:<28}  {:>11}  {:>12}  {}",
                    part.index,
                    part.file_name(),
                    dims,
                    human_bytes(len),
                    status
                ),
                Err(e) => println!(
                    "  {:>6}  {:<28}  {:>11}  {:>12}  error: {:#}",
                    part.index,
                    part.file_name(),
                    "-",
                    "-",
                    e
                ),
            }
        }
    }

    Ok(())
}

/// Decode one part, returning its dimensions, payload length, and manifest status.
fn inspect_part(
    format: &dyn ImageFormat,
    part: &PartFile,
    manifest: Option<&Manifest>,
) -> anyhow::Result<(String, u64, String)> {
    let raster = format.read_raster(&part.path)?;
    let payload = raster::decode_payload(&raster)?;
    let status = match manifest {
        Some(m) => match m.verify_payload(part.index, payload) {
            Ok(()) => "ok".to_string(),
            Err(e) => e.to_string(),
        },
        None => "unchecked".to_string(),
    };
    Ok((
        format!("{}x{}", raster.width(), raster.height()),
        payload.len() as u64,
        status,
    ))
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose, cli.quiet)?;
    debug!("pixpack {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Encode {
            source,
            output,
            max_chunk_size,
            compression,
            no_manifest,
            keep_stale,
        } => run_encode(
            source,
            output,
            max_chunk_size,
            &compression,
            no_manifest,
            keep_stale,
        ),
        Commands::Decode {
            input,
            output,
            keep_archive,
            ignore_manifest,
        } => run_decode(input, output, keep_archive, ignore_manifest),
        Commands::Inspect { input, parts } => run_inspect(input, parts),
    }
}
