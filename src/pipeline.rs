use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::codec::{self, EncodedImage, ExportFormat};
use crate::config::ExportOptions;
use crate::error::{AdjustError, Result};
use crate::filters::{ColorFilterChain, EmbossBorder, emboss};
use crate::params::AdjustmentParameters;

/// Final buffer of one pipeline run and the parameters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub buffer: PixelBuffer,
    pub params: AdjustmentParameters,
}

/// Short description of a render, returned to JS callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub width: u32,
    pub height: u32,
    pub params: AdjustmentParameters,
}

/// A file ready to hand to the host's download mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write into `dir` under the download's file name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl RenderResult {
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn summary(&self) -> RenderSummary {
        RenderSummary {
            width: self.buffer.width(),
            height: self.buffer.height(),
            params: self.params,
        }
    }

    pub fn encode(&self, format: ExportFormat, gif_speed: i32) -> Result<EncodedImage> {
        codec::encode(&self.buffer, format, gif_speed)
    }

    /// PNG data URI for display.
    pub fn to_data_uri(&self) -> Result<String> {
        Ok(self.encode(ExportFormat::Png, 10)?.to_data_uri())
    }

    pub fn download(&self, options: &ExportOptions) -> Result<Download> {
        let encoded = self.encode(options.format, options.gif_speed)?;
        Ok(Download {
            file_name: options.file_name(),
            mime: encoded.mime,
            bytes: encoded.bytes,
        })
    }
}

/// Color chain, then emboss when enabled.
///
/// Every run starts from the decoded, unmodified pixels of the image it is
/// given. Decoding is cached for the most recent image, keyed on the `Arc`.
#[derive(Debug, Default)]
pub struct AdjustmentPipeline {
    emboss_border: EmbossBorder,
    decoded: Option<(Arc<EncodedImage>, PixelBuffer)>,
}

impl AdjustmentPipeline {
    pub fn new(emboss_border: EmbossBorder) -> Self {
        Self {
            emboss_border,
            decoded: None,
        }
    }

    pub fn emboss_border(&self) -> EmbossBorder {
        self.emboss_border
    }

    pub fn run(&mut self, image: &Arc<EncodedImage>, params: &AdjustmentParameters) -> Result<RenderResult> {
        let border = self.emboss_border;
        let source = self.decoded(image)?;
        run_stages(source, params, border)
    }

    /// Run on an already decoded buffer.
    pub fn run_buffer(&self, source: &PixelBuffer, params: &AdjustmentParameters) -> Result<RenderResult> {
        run_stages(source, params, self.emboss_border)
    }

    /// Seed the decode cache with pixels already decoded from `image`.
    pub fn prime(&mut self, image: Arc<EncodedImage>, buffer: PixelBuffer) {
        self.decoded = Some((image, buffer));
    }

    /// True when `image` will be served from the decode cache.
    pub fn is_cached(&self, image: &Arc<EncodedImage>) -> bool {
        matches!(&self.decoded, Some((cached, _)) if Arc::ptr_eq(cached, image))
    }

    fn decoded(&mut self, image: &Arc<EncodedImage>) -> Result<&PixelBuffer> {
        if !self.is_cached(image) {
            let buffer = image.decode()?;
            debug!(
                width = buffer.width(),
                height = buffer.height(),
                mime = %image.mime,
                "decoded source image"
            );
            self.decoded = Some((Arc::clone(image), buffer));
        }
        match &self.decoded {
            Some((_, buffer)) => Ok(buffer),
            None => Err(AdjustError::NoImage),
        }
    }
}

fn run_stages(source: &PixelBuffer, params: &AdjustmentParameters, border: EmbossBorder) -> Result<RenderResult> {
    let params = params.sanitized()?;
    let chain = ColorFilterChain::from_params(&params);
    let mut working = chain.apply(source);
    check_dimensions(source, &working)?;

    if params.emboss {
        let embossed = emboss(&working, border);
        check_dimensions(&working, &embossed)?;
        working = embossed;
    }

    debug!(
        stages = chain.stages().len(),
        emboss = params.emboss,
        width = working.width(),
        height = working.height(),
        "pipeline run complete"
    );

    Ok(RenderResult {
        buffer: working,
        params,
    })
}

fn check_dimensions(input: &PixelBuffer, output: &PixelBuffer) -> Result<()> {
    if input.same_dimensions(output) {
        Ok(())
    } else {
        Err(AdjustError::DimensionMismatch {
            expected: input.dimensions(),
            actual: output.dimensions(),
        })
    }
}
