//! Image decode/encode boundary.
//!
//! Everything that enters the pipeline arrives as encoded bytes (a file or a
//! `data:` URI) and is decoded to RGBA8 here. Results leave as PNG or GIF.

mod data_uri;
mod gif;

pub use data_uri::{parse_data_uri, to_data_uri};
pub use self::gif::encode_gif;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{AdjustError, Result};

/// Encoded raster image plus its mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Wrap raw file bytes, sniffing the mime type from the magic bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).map_err(|e| AdjustError::Decode(e.to_string()))?;
        Ok(Self::new(format.to_mime_type(), bytes))
    }

    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let (mime, bytes) = parse_data_uri(uri)?;
        match mime {
            Some(mime) => Ok(Self::new(mime, bytes)),
            None => Self::from_bytes(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        to_data_uri(&self.mime, &self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn decode(&self) -> Result<PixelBuffer> {
        decode(&self.bytes)
    }
}

/// Output container for exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Gif,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Decode any supported raster encoding into RGBA8.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    if bytes.is_empty() {
        return Err(AdjustError::Decode("input image is empty".into()));
    }
    let image = image::load_from_memory(bytes).map_err(|e| AdjustError::Decode(e.to_string()))?;
    Ok(PixelBuffer::from_rgba_image(image.to_rgba8()))
}

pub fn encode(buffer: &PixelBuffer, format: ExportFormat, gif_speed: i32) -> Result<EncodedImage> {
    let bytes = match format {
        ExportFormat::Png => encode_png(buffer)?,
        ExportFormat::Gif => encode_gif(buffer, gif_speed)?,
    };
    Ok(EncodedImage::new(format.mime(), bytes))
}

pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| AdjustError::Encode(e.to_string()))?;
    Ok(out)
}
