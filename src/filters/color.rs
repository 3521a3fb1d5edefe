use crate::buffer::{CHANNELS, PixelBuffer};
use crate::common::{clamp_channel, clamp_u8, hsl_to_rgb, luma, rgb_to_hsl};

/// A per-pixel color operation. None of these read neighbouring pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorOp {
    /// Multiplier around mid-gray (1.0 = no change).
    Contrast(f32),
    /// Plain multiplier (1.0 = no change).
    Brightness(f32),
    /// Lerp factor away from luma (1.0 = no change, 0.0 = gray).
    Saturation(f32),
    /// Hue shift in degrees, already reduced modulo 360.
    HueRotate(f32),
    Invert,
    Grayscale,
    Sepia,
    /// Alpha multiplier (1.0 = no change). RGB is untouched.
    Opacity(f32),
}

impl ColorOp {
    /// Apply to one pixel held in 0-255 float space.
    #[inline]
    pub fn apply(self, [r, g, b, a]: [f32; 4]) -> [f32; 4] {
        match self {
            ColorOp::Contrast(c) => [
                clamp_channel((r - 128.0) * c + 128.0),
                clamp_channel((g - 128.0) * c + 128.0),
                clamp_channel((b - 128.0) * c + 128.0),
                a,
            ],
            ColorOp::Brightness(m) => [
                clamp_channel(r * m),
                clamp_channel(g * m),
                clamp_channel(b * m),
                a,
            ],
            ColorOp::Saturation(s) => {
                let l = luma(r, g, b);
                [
                    clamp_channel(l + (r - l) * s),
                    clamp_channel(l + (g - l) * s),
                    clamp_channel(l + (b - l) * s),
                    a,
                ]
            }
            ColorOp::HueRotate(deg) => {
                let (h, s, l) = rgb_to_hsl(r / 255.0, g / 255.0, b / 255.0);
                let (nr, ng, nb) = hsl_to_rgb((h + deg).rem_euclid(360.0), s, l);
                [
                    clamp_channel(nr * 255.0),
                    clamp_channel(ng * 255.0),
                    clamp_channel(nb * 255.0),
                    a,
                ]
            }
            ColorOp::Invert => [255.0 - r, 255.0 - g, 255.0 - b, a],
            ColorOp::Grayscale => {
                let l = clamp_channel(luma(r, g, b));
                [l, l, l, a]
            }
            ColorOp::Sepia => [
                clamp_channel(0.393 * r + 0.769 * g + 0.189 * b),
                clamp_channel(0.349 * r + 0.686 * g + 0.168 * b),
                clamp_channel(0.272 * r + 0.534 * g + 0.131 * b),
                a,
            ],
            ColorOp::Opacity(o) => [r, g, b, a * o],
        }
    }
}

/// Run `ops` in order over every pixel of `src`, writing a fresh buffer.
///
/// Values stay in float space between operations and are rounded once.
pub fn apply_color_ops(src: &PixelBuffer, ops: &[ColorOp]) -> PixelBuffer {
    let mut out = src.clone();
    if ops.is_empty() {
        return out;
    }

    for px in out.as_raw_mut().chunks_exact_mut(CHANNELS) {
        let mut v = [px[0] as f32, px[1] as f32, px[2] as f32, px[3] as f32];
        for op in ops {
            v = op.apply(v);
        }
        px[0] = clamp_u8(v[0]);
        px[1] = clamp_u8(v[1]);
        px[2] = clamp_u8(v[2]);
        px[3] = clamp_u8(v[3]);
    }

    out
}
