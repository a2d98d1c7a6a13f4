pub mod chunker;
pub mod cleanup;
pub mod container;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod image_format;
pub mod manifest;
pub mod naming;
pub mod options;
pub mod raster;

pub use container::Container;
pub use decoder::{DecodeReport, Decoder};
pub use encoder::{EncodeReport, Encoder};
pub use error::{PixpackError, Result};
pub use frame::{frame, unframe, FrameHeader, LEN_PREFIX_SIZE};
pub use image_format::ImageFormat;
pub use manifest::{Manifest, PartEntry, MANIFEST_FILE_NAME};
pub use naming::PartFile;
pub use options::{DecodeOptions, EncodeOptions};
pub use raster::Raster;
