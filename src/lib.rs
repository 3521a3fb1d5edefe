mod common;

pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod filters;
pub mod mosaic;
pub mod params;
pub mod pipeline;
pub mod processor;
pub mod state;

use wasm_bindgen::prelude::*;

pub use buffer::PixelBuffer;
pub use codec::{EncodedImage, ExportFormat};
pub use config::ProcessorConfig;
pub use error::{AdjustError, ConfigError, MosaicError};
pub use filters::{ColorFilterChain, EmbossBorder};
pub use params::{Adjustment, AdjustmentParameters, Effect};
pub use pipeline::{AdjustmentPipeline, Download, RenderResult};
pub use processor::ImageProcessor;
pub use state::ParameterState;

/// Apply a full adjustment set to raw RGBA pixel data in place.
///
/// - `image_data`: RGBA u8 slice, `width * height * 4` bytes
/// - `params_json`: `AdjustmentParameters` as JSON; missing fields are neutral
/// - `emboss_transparent_border`: leave the emboss border transparent
///   instead of copying the filtered pixels
#[wasm_bindgen]
pub fn apply_adjustments(
    image_data: &mut [u8],
    width: u32,
    height: u32,
    params_json: &str,
    emboss_transparent_border: bool,
) -> Result<(), JsError> {
    let params: AdjustmentParameters = serde_json::from_str(params_json)?;
    let border = if emboss_transparent_border {
        EmbossBorder::Transparent
    } else {
        EmbossBorder::CopySource
    };
    adjust_in_place(image_data, width, height, &params, border)?;
    Ok(())
}

/// Slider and toggle metadata for building the adjustment UI.
#[wasm_bindgen]
pub fn parameter_descriptors_json() -> String {
    serde_json::to_string(&params::descriptors()).unwrap_or_else(|_| "{}".to_string())
}

/// Rust side of [`apply_adjustments`].
pub fn adjust_in_place(
    image_data: &mut [u8],
    width: u32,
    height: u32,
    params: &AdjustmentParameters,
    border: EmbossBorder,
) -> error::Result<()> {
    let source = PixelBuffer::from_raw(width, height, image_data.to_vec())?;
    let render = AdjustmentPipeline::new(border).run_buffer(&source, params)?;
    image_data.copy_from_slice(render.buffer.as_raw());
    Ok(())
}
