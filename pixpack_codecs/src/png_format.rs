use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use pixpack_core::raster::Raster;
use pixpack_core::ImageFormat;

/// Deflate effort used when writing PNG files. Pixels are stored losslessly
/// at every setting; only file size and speed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

impl PngCompression {
    pub fn from_name(name: &str) -> anyhow::Result<Self> {
        match name {
            "fast" => Ok(Self::Fast),
            "default" => Ok(Self::Default),
            "best" => Ok(Self::Best),
            other => anyhow::bail!(
                "unknown png compression '{}'. Valid options: fast, default, best",
                other
            ),
        }
    }

    fn to_png(self) -> png::Compression {
        match self {
            Self::Fast => png::Compression::Fast,
            Self::Default => png::Compression::Default,
            Self::Best => png::Compression::Best,
        }
    }
}

/// 8-bit RGB PNG.
///
/// PNG is lossless, so every channel byte written comes back unchanged.
/// Only 8-bit RGB images are read back; palette, grayscale, alpha, and
/// 16-bit images are not pixpack output and are rejected.
#[derive(Debug, Clone, Default)]
pub struct PngFormat {
    pub compression: PngCompression,
}

impl PngFormat {
    pub fn new(compression: PngCompression) -> Self {
        Self { compression }
    }
}

impl ImageFormat for PngFormat {
    fn name(&self) -> &'static str {
        "png"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn write_raster(&self, raster: &Raster, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), raster.width(), raster.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(self.compression.to_png());

        let mut writer = encoder.write_header()?;
        writer.write_image_data(raster.pixels())?;
        writer.finish()?;
        Ok(())
    }

    fn read_raster(&self, path: &Path) -> anyhow::Result<Raster> {
        let file = File::open(path)?;
        // chunk sizes above ~64 MiB exceed the decoder's default budget
        let limits = png::Limits { bytes: usize::MAX };
        let mut decoder = png::Decoder::new_with_limits(BufReader::new(file), limits);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().context("reading png header")?;

        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).context("reading png pixel data")?;

        if info.color_type != png::ColorType::Rgb || info.bit_depth != png::BitDepth::Eight {
            anyhow::bail!(
                "unsupported pixel layout {:?}/{:?}; expected 8-bit RGB",
                info.color_type,
                info.bit_depth
            );
        }

        buf.truncate(info.buffer_size());
        Ok(Raster::from_rgb(info.width, info.height, buf)?)
    }
}
