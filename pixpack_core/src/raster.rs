use crate::error::{PixpackError, Result};
use crate::frame::{self, LEN_PREFIX_SIZE};

/// Channels per cell (R, G, B).
pub const CHANNELS: usize = 3;

/// A grid of 8-bit RGB cells used as an opaque byte container.
///
/// Pixels are stored flat in row-major, then column, then channel order, which
/// is also the order the framed buffer is laid out in. Rasters produced by
/// [`encode`] are square; rasters loaded from disk may have any shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap an existing RGB pixel buffer, checking it matches the dimensions.
    pub fn from_rgb(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(PixpackError::InvalidRaster {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// An all-zero (black) square raster.
    pub fn zeroed(side: u32) -> Self {
        let len = side as usize * side as usize * CHANNELS;
        Self {
            width: side,
            height: side,
            pixels: vec![0u8; len],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat RGB bytes, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The RGB triple at (`row`, `col`), or `None` outside the grid.
    pub fn pixel(&self, row: u32, col: u32) -> Option<[u8; CHANNELS]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let at = (row as usize * self.width as usize + col as usize) * CHANNELS;
        self.pixels[at..at + CHANNELS].try_into().ok()
    }
}

/// Smallest square side whose `side * side * 3` cells hold `len` bytes.
///
/// Equivalent to `ceil(sqrt(len / 3))`, computed in integers; never below 1.
pub fn side_for(len: usize) -> u32 {
    let cells = (len as u64).div_ceil(CHANNELS as u64);
    let mut side = (cells as f64).sqrt() as u64;
    // float sqrt can land one off in either direction for large inputs
    while side * side < cells {
        side += 1;
    }
    while side > 0 && (side - 1) * (side - 1) >= cells {
        side -= 1;
    }
    side.max(1) as u32
}

/// Lay `framed` out on a zero-filled square raster.
pub fn encode(framed: &[u8]) -> Raster {
    let mut raster = Raster::zeroed(side_for(framed.len()));
    raster.pixels[..framed.len()].copy_from_slice(framed);
    raster
}

/// Flatten `raster` back into a framed-buffer candidate (padding included).
pub fn decode(raster: &Raster) -> Result<&[u8]> {
    let flat = raster.pixels();
    if flat.len() < LEN_PREFIX_SIZE {
        return Err(PixpackError::ImageTooSmall { len: flat.len() });
    }
    Ok(flat)
}

/// Flatten `raster` and strip the length prefix and padding.
pub fn decode_payload(raster: &Raster) -> Result<&[u8]> {
    frame::unframe(decode(raster)?)
}
