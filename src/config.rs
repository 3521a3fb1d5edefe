use serde::{Deserialize, Serialize};

use crate::codec::ExportFormat;
use crate::error::ConfigError;
use crate::filters::EmbossBorder;

/// 16 MiB, the mosaic service's request limit.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_MOSAIC_ENDPOINT: &str = "/api/create-mosaic";
pub const DEFAULT_FILE_STEM: &str = "adjusted-image";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub file_stem: String,
    /// GIF quantization speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            file_stem: DEFAULT_FILE_STEM.to_string(),
            gif_speed: 10,
        }
    }
}

impl ExportOptions {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }
}

/// Processor settings, usually handed over from JS as JSON.
///
/// Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessorConfig {
    /// Base URL of the mosaic service; `None` disables mosaic requests.
    pub api_url: Option<String>,
    pub mosaic_endpoint: String,
    /// Uploads above this size are refused before decoding.
    pub max_image_bytes: usize,
    /// Content types accepted from the mosaic service, lowercase.
    pub accepted_mosaic_types: Vec<String>,
    pub export: ExportOptions,
    pub emboss_border: EmbossBorder,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            mosaic_endpoint: DEFAULT_MOSAIC_ENDPOINT.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            accepted_mosaic_types: vec!["image/jpeg".to_string()],
            export: ExportOptions::default(),
            emboss_border: EmbossBorder::default(),
        }
    }
}

impl ProcessorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ProcessorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.file_stem.trim().is_empty() {
            return Err(ConfigError::Invalid("export.fileStem must not be empty".into()));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid("maxImageBytes must be positive".into()));
        }
        if !(1..=30).contains(&self.export.gif_speed) {
            return Err(ConfigError::Invalid(format!(
                "export.gifSpeed must be within 1..=30, got {}",
                self.export.gif_speed
            )));
        }
        if self.accepted_mosaic_types.is_empty() {
            return Err(ConfigError::Invalid(
                "acceptedMosaicTypes must list at least one type".into(),
            ));
        }
        Ok(())
    }

    /// Full mosaic URL, if an API base is configured.
    pub fn mosaic_url(&self) -> Option<String> {
        let base = self.api_url.as_deref()?.trim_end_matches('/');
        let endpoint = self.mosaic_endpoint.trim_start_matches('/');
        Some(format!("{base}/{endpoint}"))
    }
}
