use serde::{Deserialize, Serialize};

use crate::buffer::{CHANNELS, PixelBuffer};
use crate::common::clamp_i32;

/// What the one-pixel frame around the emboss kernel's reach holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmbossBorder {
    /// Border pixels are copied unchanged from the input.
    #[default]
    CopySource,
    /// Border pixels stay zero: transparent black.
    Transparent,
}

/// Horizontal relief kernel over RGB, alpha copied.
///
/// For each interior pixel and channel:
/// `127 + 2 * in[x, y] - in[x - 1, y] - in[x + 1, y]`, clamped to 0..=255.
/// `src` is only read; the result is a fresh buffer.
pub fn emboss(src: &PixelBuffer, border: EmbossBorder) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let mut out = src.clone();
    if border == EmbossBorder::Transparent {
        out.as_raw_mut().fill(0);
    }
    if w < 3 || h < 3 {
        return out;
    }

    let stride = w * CHANNELS;
    let input = src.as_raw();
    let output = out.as_raw_mut();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let index = y * stride + x * CHANNELS;
            for c in 0..3 {
                let v = 127 + 2 * input[index + c] as i32
                    - input[index - CHANNELS + c] as i32
                    - input[index + CHANNELS + c] as i32;
                output[index + c] = clamp_i32(v);
            }
            output[index + 3] = input[index + 3];
        }
    }

    out
}
