use std::sync::Arc;

use tracing::{debug, info};

use crate::codec::EncodedImage;
use crate::error::Result;
use crate::params::{Adjustment, AdjustmentParameters, Effect};

/// Current parameters against a fixed baseline, plus the images they apply to.
///
/// `source` is the uploaded image and never changes. `current_image` starts
/// as the same image and may be swapped (mosaic); `reset` swaps it back.
#[derive(Debug, Clone)]
pub struct ParameterState {
    current: AdjustmentParameters,
    baseline: AdjustmentParameters,
    source: Arc<EncodedImage>,
    current_image: Arc<EncodedImage>,
    generation: u32,
}

impl ParameterState {
    pub fn new(source: EncodedImage) -> Self {
        let source = Arc::new(source);
        Self {
            current: AdjustmentParameters::BASELINE,
            baseline: AdjustmentParameters::BASELINE,
            current_image: Arc::clone(&source),
            source,
            generation: 0,
        }
    }

    pub fn params(&self) -> &AdjustmentParameters {
        &self.current
    }

    pub fn baseline(&self) -> &AdjustmentParameters {
        &self.baseline
    }

    pub fn source(&self) -> &Arc<EncodedImage> {
        &self.source
    }

    pub fn current_image(&self) -> &Arc<EncodedImage> {
        &self.current_image
    }

    /// True once the active image differs from the uploaded one.
    pub fn is_substituted(&self) -> bool {
        !Arc::ptr_eq(&self.source, &self.current_image)
    }

    /// Clamp `value` into the field's interval and store it. Non-finite
    /// values are rejected and leave the state as it was.
    pub fn set_adjustment(&mut self, field: Adjustment, value: f32) -> Result<f32> {
        self.current.set(field, value)
    }

    pub fn set_effect(&mut self, effect: Effect, enabled: bool) {
        self.current.set_effect(effect, enabled);
    }

    /// Replace the whole record, clamped like the single-field setter.
    /// A non-finite field rejects the record and leaves the state as it was.
    pub fn set_parameters(&mut self, params: AdjustmentParameters) -> Result<()> {
        self.current = params.sanitized()?;
        Ok(())
    }

    /// Back to baseline parameters and the uploaded image.
    ///
    /// Any mosaic request still in flight is superseded.
    pub fn reset(&mut self) {
        self.current = self.baseline;
        self.current_image = Arc::clone(&self.source);
        self.generation = self.generation.wrapping_add(1);
        info!("adjustments reset to baseline");
    }

    /// Swap the active image, keeping parameters and the uploaded source.
    pub fn replace_image(&mut self, image: EncodedImage) {
        debug!(mime = %image.mime, bytes = image.len(), "active image replaced");
        self.current_image = Arc::new(image);
    }

    /// Start past `previous`, so tickets from an earlier session stay stale.
    pub(crate) fn following(mut self, previous: u32) -> Self {
        self.generation = previous.wrapping_add(1);
        self
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }

    pub(crate) fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ParameterState {
        ParameterState::new(EncodedImage::new("image/png", vec![1, 2, 3]))
    }

    #[test]
    fn test_starts_at_baseline_on_source() {
        let s = state();
        assert!(s.params().is_neutral());
        assert!(!s.is_substituted());
        assert_eq!(s.baseline(), &AdjustmentParameters::BASELINE);
    }

    #[test]
    fn test_setters_clamp() {
        let mut s = state();
        assert_eq!(s.set_adjustment(Adjustment::Saturation, 250.0).unwrap(), 200.0);
        assert_eq!(s.params().saturation, 200.0);
        assert!(s.set_adjustment(Adjustment::Saturation, f32::NAN).is_err());
        assert_eq!(s.params().saturation, 200.0);
    }

    #[test]
    fn test_set_parameters_keeps_fields_in_range() {
        let mut s = state();
        s.set_parameters(AdjustmentParameters {
            contrast: 500.0,
            blur: 40.0,
            hue_rotate: -90.0,
            ..AdjustmentParameters::BASELINE
        })
        .unwrap();
        assert_eq!(s.params().contrast, 200.0);
        assert_eq!(s.params().blur, 10.0);
        assert_eq!(s.params().hue_rotate, 0.0);

        let stored = *s.params();
        let err = s.set_parameters(AdjustmentParameters {
            brightness: f32::INFINITY,
            ..AdjustmentParameters::BASELINE
        });
        assert!(err.is_err());
        assert_eq!(s.params(), &stored);
    }

    #[test]
    fn test_replace_keeps_parameters() {
        let mut s = state();
        s.set_adjustment(Adjustment::Contrast, 150.0).unwrap();
        s.replace_image(EncodedImage::new("image/jpeg", vec![4, 5]));
        assert!(s.is_substituted());
        assert_eq!(s.params().contrast, 150.0);
        assert_eq!(s.current_image().mime, "image/jpeg");
        assert_eq!(s.source().mime, "image/png");
    }

    #[test]
    fn test_reset_restores_everything() {
        let mut s = state();
        s.set_adjustment(Adjustment::Blur, 4.0).unwrap();
        s.set_effect(Effect::Emboss, true);
        s.replace_image(EncodedImage::new("image/jpeg", vec![4, 5]));
        let before = s.generation();
        s.reset();
        assert!(s.params().is_neutral());
        assert!(!s.is_substituted());
        assert!(s.generation() > before);
        assert_eq!(s.baseline(), &AdjustmentParameters::BASELINE);
    }
}
