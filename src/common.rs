// ITU-R BT.709 luma coefficients
pub(crate) const LUMA_R: f32 = 0.2126;
pub(crate) const LUMA_G: f32 = 0.7152;
pub(crate) const LUMA_B: f32 = 0.0722;

#[inline(always)]
pub(crate) fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// Clamp a channel held in 0-255 float space.
#[inline(always)]
pub(crate) fn clamp_channel(v: f32) -> f32 {
    v.clamp(0.0, 255.0)
}

#[inline(always)]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[inline(always)]
pub(crate) fn clamp_i32(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// RGB (0..1) to HSL with hue in degrees [0, 360).
pub(crate) fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let d = max - min;
    if d < 1e-6 {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

    let h = if max == r {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// HSL (hue in degrees) back to RGB (0..1).
pub(crate) fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s < 1e-6 {
        return (l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let t = h / 360.0;

    (
        hue_to_rgb(p, q, t + 1.0 / 3.0),
        hue_to_rgb(p, q, t),
        hue_to_rgb(p, q, t - 1.0 / 3.0),
    )
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_u8_rounds_and_saturates() {
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(127.5), 128);
        assert_eq!(clamp_u8(318.5), 255);
    }

    #[test]
    fn test_luma_of_white_is_full() {
        assert!((luma(255.0, 255.0, 255.0) - 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_hsl_round_trip_primary_colors() {
        for (r, g, b) in [(1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (0.0, 0.0, 1.0), (0.2, 0.4, 0.6)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            assert!((r - r2).abs() < 1e-4, "r {r} vs {r2}");
            assert!((g - g2).abs() < 1e-4, "g {g} vs {g2}");
            assert!((b - b2).abs() < 1e-4, "b {b} vs {b2}");
        }
    }

    #[test]
    fn test_red_hue_is_zero_and_green_is_120() {
        assert_eq!(rgb_to_hsl(1.0, 0.0, 0.0).0, 0.0);
        assert!((rgb_to_hsl(0.0, 1.0, 0.0).0 - 120.0).abs() < 1e-4);
    }
}
