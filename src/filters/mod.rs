mod blur;
mod color;
mod emboss;

pub use blur::gaussian_blur;
pub use color::{ColorOp, apply_color_ops};
pub use emboss::{EmbossBorder, emboss};

use crate::buffer::PixelBuffer;
use crate::params::AdjustmentParameters;

/// One step of the color chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    Color(ColorOp),
    /// Gaussian blur, sigma in pixels. Needs neighbouring pixels, so the
    /// chain materialises a buffer before and after it.
    Blur(f32),
}

/// Ordered list of the stages implied by an [`AdjustmentParameters`],
/// excluding emboss.
///
/// Order: contrast, brightness, saturation, blur, hue-rotate, invert,
/// grayscale, sepia, opacity. Stages at their neutral value are left out, so
/// the baseline parameters produce an empty chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorFilterChain {
    stages: Vec<FilterStage>,
}

impl ColorFilterChain {
    pub fn from_params(params: &AdjustmentParameters) -> Self {
        let mut stages = Vec::new();

        if params.contrast != 100.0 {
            stages.push(FilterStage::Color(ColorOp::Contrast(params.contrast / 100.0)));
        }
        if params.brightness != 100.0 {
            stages.push(FilterStage::Color(ColorOp::Brightness(params.brightness / 100.0)));
        }
        if params.saturation != 100.0 {
            stages.push(FilterStage::Color(ColorOp::Saturation(params.saturation / 100.0)));
        }
        if params.blur > 0.0 {
            stages.push(FilterStage::Blur(params.blur));
        }
        let hue = params.hue_rotate.rem_euclid(360.0);
        if hue != 0.0 {
            stages.push(FilterStage::Color(ColorOp::HueRotate(hue)));
        }

        let toggles = [
            (params.invert, ColorOp::Invert),
            (params.grayscale, ColorOp::Grayscale),
            (params.sepia, ColorOp::Sepia),
        ];
        stages.extend(
            toggles
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, op)| FilterStage::Color(op)),
        );

        if params.opacity != 100.0 {
            stages.push(FilterStage::Color(ColorOp::Opacity(params.opacity / 100.0)));
        }

        Self { stages }
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn is_identity(&self) -> bool {
        self.stages.is_empty()
    }

    /// Produce a new buffer; `src` is never written.
    ///
    /// Runs of color operations are fused into one pass per pixel. A blur
    /// stage flushes the pending run into a buffer, then blurs a copy of it.
    pub fn apply(&self, src: &PixelBuffer) -> PixelBuffer {
        let mut working: Option<PixelBuffer> = None;
        let mut pending: Vec<ColorOp> = Vec::new();

        for stage in &self.stages {
            match *stage {
                FilterStage::Color(op) => pending.push(op),
                FilterStage::Blur(sigma) => {
                    let input = working.as_ref().unwrap_or(src);
                    let flushed = apply_color_ops(input, &pending);
                    pending.clear();
                    working = Some(gaussian_blur(&flushed, sigma));
                }
            }
        }

        let input = working.as_ref().unwrap_or(src);
        apply_color_ops(input, &pending)
    }
}
