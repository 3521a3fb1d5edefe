use crate::buffer::{CHANNELS, PixelBuffer};
use crate::common::clamp_u8;

/// Largest sigma accepted; matches the blur slider's upper bound.
pub const MAX_SIGMA: f32 = 10.0;

/// Separable Gaussian blur with standard deviation `sigma` pixels.
///
/// Reads `src` and writes a new buffer, sampling past the edges by clamping
/// to the nearest edge pixel. Color is blurred premultiplied by alpha, so
/// the RGB of transparent pixels never bleeds into visible ones. Sigma is
/// capped at [`MAX_SIGMA`].
pub fn gaussian_blur(src: &PixelBuffer, sigma: f32) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    if sigma.is_nan() || sigma <= 0.0 || w == 0 || h == 0 {
        return src.clone();
    }

    let kernel = gaussian_kernel(sigma.min(MAX_SIGMA));
    let radius = (kernel.len() / 2) as isize;
    let stride = w * CHANNELS;

    let premultiplied: Vec<f32> = src
        .as_raw()
        .chunks_exact(CHANNELS)
        .flat_map(|px| {
            let a = px[3] as f32;
            let k = a / 255.0;
            [px[0] as f32 * k, px[1] as f32 * k, px[2] as f32 * k, a]
        })
        .collect();

    // Horizontal pass
    let mut h_buf = vec![0.0f32; w * h * CHANNELS];
    for y in 0..h {
        let row = &premultiplied[y * stride..(y + 1) * stride];
        for x in 0..w {
            let mut sums = [0.0f32; CHANNELS];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, w as isize - 1) as usize;
                for c in 0..CHANNELS {
                    sums[c] += row[sx * CHANNELS + c] * weight;
                }
            }
            let oi = y * stride + x * CHANNELS;
            h_buf[oi..oi + CHANNELS].copy_from_slice(&sums);
        }
    }

    // Vertical pass, then back to straight alpha
    let mut out = src.clone();
    let out_raw = out.as_raw_mut();
    for y in 0..h {
        for x in 0..w {
            let mut sums = [0.0f32; CHANNELS];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - radius).clamp(0, h as isize - 1) as usize;
                let si = sy * stride + x * CHANNELS;
                for c in 0..CHANNELS {
                    sums[c] += h_buf[si + c] * weight;
                }
            }
            let oi = y * stride + x * CHANNELS;
            let alpha = clamp_u8(sums[3]);
            if alpha == 0 {
                out_raw[oi..oi + CHANNELS].fill(0);
                continue;
            }
            for c in 0..3 {
                out_raw[oi + c] = clamp_u8(sums[c] * 255.0 / sums[3]);
            }
            out_raw[oi + 3] = alpha;
        }
    }

    out
}

/// Normalised 1D kernel of length `2 * ceil(3 * sigma) + 1`.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil().max(1.0) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sigma_is_noop() {
        let mut src = PixelBuffer::new(3, 3).unwrap();
        src.set(1, 1, [255, 255, 255, 255]).unwrap();
        assert_eq!(gaussian_blur(&src, 0.0), src);
    }

    #[test]
    fn test_kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 13);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(k[0], k[12]);
        assert!(k[6] > k[5]);
    }

    #[test]
    fn test_uniform_image_is_unchanged() {
        let src = PixelBuffer::filled(6, 5, [90, 140, 30, 255]).unwrap();
        assert_eq!(gaussian_blur(&src, 3.0), src);
    }

    #[test]
    fn test_spreads_a_single_bright_pixel() {
        let mut src = PixelBuffer::filled(5, 5, [0, 0, 0, 255]).unwrap();
        src.set(2, 2, [255, 255, 255, 255]).unwrap();
        let out = gaussian_blur(&src, 1.0);
        let center = out.get(2, 2).unwrap()[0];
        let neighbour = out.get(3, 2).unwrap()[0];
        assert!(center < 255);
        assert!(neighbour > 0);
        assert!(center > neighbour);
        assert_eq!(out.dimensions(), src.dimensions());
    }

    #[test]
    fn test_opaque_white_fades_into_transparency_without_graying() {
        let mut src = PixelBuffer::new(8, 1).unwrap();
        for x in 0..4 {
            src.set(x, 0, [255, 255, 255, 255]).unwrap();
        }
        let out = gaussian_blur(&src, 2.0);
        for x in 4..8 {
            let [r, g, b, a] = out.get(x, 0).unwrap();
            assert_eq!([r, g, b], [255, 255, 255], "pixel {x}");
            assert!(a > 0 && a < 255, "pixel {x} alpha {a}");
        }
        assert!(out.get(4, 0).unwrap()[3] > out.get(7, 0).unwrap()[3]);
    }

    #[test]
    fn test_hidden_color_does_not_bleed() {
        let mut src = PixelBuffer::filled(6, 6, [0, 0, 255, 255]).unwrap();
        for y in 0..6 {
            src.set(0, y, [255, 0, 0, 0]).unwrap();
        }
        let out = gaussian_blur(&src, 1.5);
        for px in out.as_raw().chunks_exact(4) {
            assert_eq!(px[0], 0);
        }
    }

    #[test]
    fn test_huge_sigma_is_capped() {
        let src = PixelBuffer::filled(4, 4, [10, 20, 30, 255]).unwrap();
        assert_eq!(gaussian_blur(&src, 1.0e6), src);
        assert_eq!(gaussian_blur(&src, f32::INFINITY), src);
        assert_eq!(gaussian_blur(&src, f32::NAN), src);
    }

    #[test]
    fn test_source_is_not_modified() {
        let mut src = PixelBuffer::new(4, 4).unwrap();
        src.set(0, 0, [255, 0, 0, 255]).unwrap();
        let before = src.clone();
        let _ = gaussian_blur(&src, 2.0);
        assert_eq!(src, before);
    }
}
