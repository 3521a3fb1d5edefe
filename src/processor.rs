//! Stateful editor exported to JS.
//!
//! Ties [`ParameterState`], [`AdjustmentPipeline`] and the mosaic boundary
//! together and keeps the last good render around, so a failed
//! recomputation never blanks the preview.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

use crate::codec::EncodedImage;
use crate::config::ProcessorConfig;
use crate::error::{AdjustError, MosaicError, Result};
use crate::mosaic::{self, MosaicResponse, MosaicService};
use crate::params::{Adjustment, AdjustmentParameters, Effect};
use crate::pipeline::{AdjustmentPipeline, Download, RenderResult};
use crate::state::ParameterState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MosaicStart {
    generation: u32,
    url: Option<String>,
    body: String,
}

#[wasm_bindgen]
pub struct ImageProcessor {
    config: ProcessorConfig,
    state: Option<ParameterState>,
    pipeline: AdjustmentPipeline,
    last_render: Option<RenderResult>,
}

impl ImageProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        let pipeline = AdjustmentPipeline::new(config.emboss_border);
        Self {
            config,
            state: None,
            pipeline,
            last_render: None,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&ParameterState> {
        self.state.as_ref()
    }

    /// Last successful render.
    pub fn current_render(&self) -> Option<&RenderResult> {
        self.last_render.as_ref()
    }

    /// Load a new source image from raw file bytes and render it.
    pub fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<&RenderResult> {
        self.check_size(bytes.len())?;
        let image = EncodedImage::from_bytes(bytes)?;
        self.load(image)
    }

    /// Load a new source image from a `data:` URI and render it.
    pub fn load_data_uri(&mut self, uri: &str) -> Result<&RenderResult> {
        let image = EncodedImage::from_data_uri(uri)?;
        self.check_size(image.len())?;
        self.load(image)
    }

    fn load(&mut self, image: EncodedImage) -> Result<&RenderResult> {
        // decode before touching state so a bad upload keeps the old session
        let buffer = image.decode()?;
        info!(
            width = buffer.width(),
            height = buffer.height(),
            mime = %image.mime,
            "loaded source image"
        );
        let render = self.pipeline.run_buffer(&buffer, &AdjustmentParameters::BASELINE)?;
        let previous = self.state.as_ref().map_or(0, ParameterState::generation);
        let state = ParameterState::new(image).following(previous);
        self.pipeline.prime(Arc::clone(state.current_image()), buffer);
        self.state = Some(state);
        Ok(&*self.last_render.insert(render))
    }

    fn check_size(&self, size: usize) -> Result<()> {
        let limit = self.config.max_image_bytes;
        if size > limit {
            warn!(size, limit, "image rejected, too large");
            return Err(AdjustError::ImageTooLarge { size, limit });
        }
        Ok(())
    }

    fn state_mut(&mut self) -> Result<&mut ParameterState> {
        self.state.as_mut().ok_or(AdjustError::NoImage)
    }

    /// Recompute from the active image. On failure the previous render stays.
    pub fn render(&mut self) -> Result<&RenderResult> {
        let state = self.state.as_ref().ok_or(AdjustError::NoImage)?;
        match self.pipeline.run(state.current_image(), state.params()) {
            Ok(render) => Ok(&*self.last_render.insert(render)),
            Err(e) => {
                warn!(error = %e, "recomputation failed, keeping previous render");
                Err(e)
            }
        }
    }

    pub fn set_adjustment(&mut self, field: Adjustment, value: f32) -> Result<f32> {
        let stored = self.state_mut()?.set_adjustment(field, value)?;
        self.render()?;
        Ok(stored)
    }

    pub fn set_effect(&mut self, effect: Effect, enabled: bool) -> Result<()> {
        self.state_mut()?.set_effect(effect, enabled);
        self.render()?;
        Ok(())
    }

    pub fn set_parameters(&mut self, params: AdjustmentParameters) -> Result<()> {
        self.state_mut()?.set_parameters(params)?;
        self.render()?;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<&RenderResult> {
        self.state_mut()?.reset();
        self.render()
    }

    /// Export the current render with the configured name and format.
    pub fn download(&self) -> Result<Download> {
        let render = self.last_render.as_ref().ok_or(AdjustError::NoImage)?;
        render.download(&self.config.export)
    }

    /// Round trip through a native mosaic transport, re-rendering on success.
    pub fn create_mosaic(&mut self, service: &dyn MosaicService) -> std::result::Result<(), MosaicError> {
        let accepted = self.config.accepted_mosaic_types.clone();
        let state = self.state.as_mut().ok_or(MosaicError::NoImage)?;
        mosaic::handle_create_mosaic(state, service, &accepted)?;
        self.rerender_after_mosaic();
        Ok(())
    }

    /// Accept a response for a request started in JS.
    pub fn complete_mosaic(
        &mut self,
        generation: u32,
        result: std::result::Result<MosaicResponse, MosaicError>,
    ) -> std::result::Result<(), MosaicError> {
        let accepted = self.config.accepted_mosaic_types.clone();
        let state = self.state.as_mut().ok_or(MosaicError::NoImage)?;
        state.complete_mosaic(generation, result, &accepted)?;
        self.rerender_after_mosaic();
        Ok(())
    }

    /// Transport failure for a request started in JS.
    pub fn fail_mosaic(&mut self, generation: u32, message: &str) -> std::result::Result<(), MosaicError> {
        self.complete_mosaic(generation, Err(MosaicError::Transport(message.to_string())))
    }

    /// Start a mosaic request for JS: `{"generation", "url", "body"}`.
    pub fn begin_mosaic_json(&mut self) -> Result<String> {
        let url = self.config.mosaic_url();
        let ticket = self.state_mut()?.begin_mosaic();
        let start = MosaicStart {
            generation: ticket.generation(),
            url,
            body: ticket.request.to_json(),
        };
        Ok(serde_json::to_string(&start).unwrap_or_else(|_| "{}".to_string()))
    }

    fn rerender_after_mosaic(&mut self) {
        // the response already decoded once, so this only fails on a broken invariant
        if let Err(e) = self.render() {
            warn!(error = %e, "render after mosaic failed");
        }
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

#[wasm_bindgen]
impl ImageProcessor {
    /// `config_json` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn js_new(config_json: Option<String>) -> std::result::Result<ImageProcessor, JsError> {
        let config = match config_json {
            Some(json) => ProcessorConfig::from_json(&json)?,
            None => ProcessorConfig::default(),
        };
        Ok(Self::new(config))
    }

    #[wasm_bindgen(js_name = loadImage)]
    pub fn js_load_image(&mut self, data_uri: &str) -> std::result::Result<(), JsError> {
        self.load_data_uri(data_uri)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = loadBytes)]
    pub fn js_load_bytes(&mut self, bytes: Vec<u8>) -> std::result::Result<(), JsError> {
        self.load_bytes(bytes)?;
        Ok(())
    }

    /// Returns the value actually stored after clamping.
    #[wasm_bindgen(js_name = setAdjustment)]
    pub fn js_set_adjustment(&mut self, field: &str, value: f32) -> std::result::Result<f32, JsError> {
        Ok(self.set_adjustment(field.parse()?, value)?)
    }

    #[wasm_bindgen(js_name = setEffect)]
    pub fn js_set_effect(&mut self, effect: &str, enabled: bool) -> std::result::Result<(), JsError> {
        Ok(self.set_effect(effect.parse()?, enabled)?)
    }

    #[wasm_bindgen(js_name = setParameters)]
    pub fn js_set_parameters(&mut self, params_json: &str) -> std::result::Result<(), JsError> {
        let params: AdjustmentParameters = serde_json::from_str(params_json)?;
        Ok(self.set_parameters(params)?)
    }

    #[wasm_bindgen(js_name = parametersJson)]
    pub fn js_parameters_json(&self) -> String {
        let params = self.state.as_ref().map(|s| *s.params()).unwrap_or_default();
        serde_json::to_string(&params).unwrap_or_else(|_| "{}".to_string())
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) -> std::result::Result<(), JsError> {
        self.reset()?;
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.last_render.as_ref().map_or(0, |r| r.buffer.width())
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.last_render.as_ref().map_or(0, |r| r.buffer.height())
    }

    /// Raw RGBA of the current render, for `ImageData`.
    #[wasm_bindgen(js_name = pixels)]
    pub fn js_pixels(&self) -> Vec<u8> {
        self.last_render
            .as_ref()
            .map(|r| r.buffer.as_raw().to_vec())
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = previewDataUri)]
    pub fn js_preview_data_uri(&self) -> std::result::Result<String, JsError> {
        let render = self.last_render.as_ref().ok_or(AdjustError::NoImage)?;
        Ok(render.to_data_uri()?)
    }

    #[wasm_bindgen(js_name = downloadBytes)]
    pub fn js_download_bytes(&self) -> std::result::Result<Vec<u8>, JsError> {
        Ok(self.download()?.bytes)
    }

    #[wasm_bindgen(js_name = downloadFileName)]
    pub fn js_download_file_name(&self) -> String {
        self.config.export.file_name()
    }

    /// The caller POSTs `body` to `url` and reports back through
    /// `completeMosaic` with the same `generation`.
    #[wasm_bindgen(js_name = beginMosaic)]
    pub fn js_begin_mosaic(&mut self) -> std::result::Result<String, JsError> {
        Ok(self.begin_mosaic_json()?)
    }

    #[wasm_bindgen(js_name = completeMosaic)]
    pub fn js_complete_mosaic(
        &mut self,
        generation: u32,
        status: u16,
        content_type: &str,
        body: Vec<u8>,
    ) -> std::result::Result<(), JsError> {
        let response = MosaicResponse {
            status,
            content_type: content_type.to_string(),
            body,
        };
        Ok(self.complete_mosaic(generation, Ok(response))?)
    }

    /// Report that the request for `generation` never produced a response.
    /// The active image and parameters stay as they were; the failure is
    /// handed back as the error, or as a superseded notice for a stale ticket.
    #[wasm_bindgen(js_name = failMosaic)]
    pub fn js_fail_mosaic(&mut self, generation: u32, message: &str) -> std::result::Result<(), JsError> {
        Ok(self.fail_mosaic(generation, message)?)
    }
}
