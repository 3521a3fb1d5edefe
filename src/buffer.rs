use image::RgbaImage;

use crate::common::clamp_i32;
use crate::error::{AdjustError, Result};

pub const CHANNELS: usize = 4;

/// Owned, row-major RGBA8 pixel grid.
///
/// `data.len() == width * height * 4` holds for every value of this type;
/// each constructor checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            data: vec![0; byte_len(width, height)?],
        })
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(byte_len(width, height)?)
            .collect();
        Ok(Self { width, height, data })
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(AdjustError::InvalidBufferLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn get(&self, x: u32, y: u32) -> Result<[u8; 4]> {
        let i = self.index(x, y)?;
        Ok([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Write one pixel, clamping every channel into 0..=255.
    pub fn set(&mut self, x: u32, y: u32, rgba: [i32; 4]) -> Result<()> {
        let i = self.index(x, y)?;
        for (c, value) in rgba.into_iter().enumerate() {
            self.data[i + c] = clamp_i32(value);
        }
        Ok(())
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.into_raw(),
        }
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            AdjustError::InvalidBufferLength {
                expected: self.pixel_count() * CHANNELS,
                actual: self.data.len(),
            },
        )
    }

    fn index(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(AdjustError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }
}

/// `width * height * 4`, or an error when that does not fit in `usize`.
fn byte_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(AdjustError::DimensionsTooLarge { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent_black() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.as_raw().len(), 24);
        assert_eq!(buf.get(2, 1).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_filled_repeats_color() {
        let buf = PixelBuffer::filled(2, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(buf.as_raw(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_byte_len_overflow_is_an_error() {
        // (2^32 - 1)^2 * 4 overflows a 64-bit usize as well
        assert!(matches!(
            byte_len(u32::MAX, u32::MAX),
            Err(AdjustError::DimensionsTooLarge { .. })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(u32::MAX, u32::MAX, Vec::new()),
            Err(AdjustError::DimensionsTooLarge { .. })
        ));
        assert!(PixelBuffer::new(u32::MAX, u32::MAX).is_err());
        assert_eq!(byte_len(3, 2).unwrap(), 24);
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_wrapping_dimensions_rejected_on_32_bit() {
        let err = PixelBuffer::from_raw(65536, 16384, Vec::new()).unwrap_err();
        assert!(matches!(err, AdjustError::DimensionsTooLarge { width: 65536, height: 16384 }));
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            AdjustError::InvalidBufferLength { expected: 16, actual: 15 }
        ));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let buf = PixelBuffer::new(4, 4).unwrap();
        assert!(matches!(buf.get(4, 0), Err(AdjustError::OutOfBounds { .. })));
        assert!(matches!(buf.get(0, 4), Err(AdjustError::OutOfBounds { .. })));
        assert!(buf.get(3, 3).is_ok());
    }

    #[test]
    fn test_set_clamps_channels() {
        let mut buf = PixelBuffer::new(2, 2).unwrap();
        buf.set(1, 0, [300, -5, 128, 255]).unwrap();
        assert_eq!(buf.get(1, 0).unwrap(), [255, 0, 128, 255]);
        assert!(matches!(
            buf.set(2, 0, [0, 0, 0, 0]),
            Err(AdjustError::OutOfBounds { x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn test_row_major_layout() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set(1, 1, [9, 9, 9, 9]).unwrap();
        let i = buf.stride() + 4;
        assert_eq!(&buf.as_raw()[i..i + 4], &[9, 9, 9, 9]);
    }

    #[test]
    fn test_clone_is_deep() {
        let original = PixelBuffer::filled(2, 1, [10, 20, 30, 40]).unwrap();
        let mut copy = original.clone();
        copy.set(0, 0, [0, 0, 0, 0]).unwrap();
        assert_eq!(original.get(0, 0).unwrap(), [10, 20, 30, 40]);
    }

    #[test]
    fn test_rgba_image_conversion() {
        let buf = PixelBuffer::filled(3, 2, [5, 6, 7, 8]).unwrap();
        let img = buf.to_rgba_image().unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(PixelBuffer::from_rgba_image(img), buf);
    }
}
