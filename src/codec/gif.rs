use gif::{Encoder, Frame};

use crate::buffer::PixelBuffer;
use crate::error::{AdjustError, Result};

/// Encode one RGBA buffer as a single-frame GIF.
///
/// `speed`: quantization speed (1=best quality, 30=fastest), clamped.
pub fn encode_gif(buffer: &PixelBuffer, speed: i32) -> Result<Vec<u8>> {
    let (width, height) = gif_dimensions(buffer)?;
    let mut output = Vec::new();

    {
        let mut encoder = Encoder::new(&mut output, width, height, &[]).map_err(encode_error)?;

        let speed = speed.clamp(1, 30);
        let mut frame_data = buffer.as_raw().to_vec();
        let frame = Frame::from_rgba_speed(width, height, &mut frame_data, speed);
        encoder.write_frame(&frame).map_err(encode_error)?;
    }

    Ok(output)
}

fn gif_dimensions(buffer: &PixelBuffer) -> Result<(u16, u16)> {
    let too_large = || AdjustError::Encode(format!(
        "{}x{} exceeds the GIF size limit",
        buffer.width(),
        buffer.height()
    ));
    let width = u16::try_from(buffer.width()).map_err(|_| too_large())?;
    let height = u16::try_from(buffer.height()).map_err(|_| too_large())?;
    if width == 0 || height == 0 {
        return Err(AdjustError::Encode("cannot encode an empty image".into()));
    }
    Ok((width, height))
}

fn encode_error(e: gif::EncodingError) -> AdjustError {
    AdjustError::Encode(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_header_and_size() {
        let buf = PixelBuffer::filled(8, 5, [255, 0, 0, 255]).unwrap();
        let out = encode_gif(&buf, 10).unwrap();
        assert_eq!(&out[..6], b"GIF89a");
        assert_eq!(u16::from_le_bytes([out[6], out[7]]), 8);
        assert_eq!(u16::from_le_bytes([out[8], out[9]]), 5);
    }

    #[test]
    fn test_gif_rejects_oversized_and_empty() {
        assert!(encode_gif(&PixelBuffer::new(70_000, 1).unwrap(), 10).is_err());
        assert!(encode_gif(&PixelBuffer::new(0, 0).unwrap(), 10).is_err());
    }
}
