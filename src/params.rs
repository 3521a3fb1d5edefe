use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{AdjustError, Result};

/// Continuous adjustment fields, one per slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Adjustment {
    Opacity,
    Contrast,
    Brightness,
    Saturation,
    Blur,
    HueRotate,
}

impl Adjustment {
    pub const ALL: [Adjustment; 6] = [
        Adjustment::Opacity,
        Adjustment::Contrast,
        Adjustment::Brightness,
        Adjustment::Saturation,
        Adjustment::Blur,
        Adjustment::HueRotate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
            Self::Saturation => "saturation",
            Self::Blur => "blur",
            Self::HueRotate => "hueRotate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Opacity => "Opacity",
            Self::Contrast => "Contrast",
            Self::Brightness => "Brightness",
            Self::Saturation => "Saturation",
            Self::Blur => "Blur",
            Self::HueRotate => "Hue Rotate",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Blur => "px",
            Self::HueRotate => "°",
            _ => "%",
        }
    }

    /// Closed interval of accepted values.
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Opacity => (0.0, 100.0),
            Self::Contrast | Self::Brightness | Self::Saturation => (0.0, 200.0),
            Self::Blur => (0.0, 10.0),
            Self::HueRotate => (0.0, 360.0),
        }
    }

    pub fn neutral(self) -> f32 {
        match self {
            Self::Opacity | Self::Contrast | Self::Brightness | Self::Saturation => 100.0,
            Self::Blur | Self::HueRotate => 0.0,
        }
    }

    /// Clamp into `range()`. Non-finite input has no place in the interval
    /// and is rejected.
    pub fn clamp(self, value: f32) -> Result<f32> {
        if !value.is_finite() {
            return Err(AdjustError::InvalidParameter {
                field: self.name(),
                value,
            });
        }
        let (min, max) = self.range();
        Ok(value.clamp(min, max))
    }
}

impl FromStr for Adjustment {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self> {
        Adjustment::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s) || a.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| AdjustError::UnknownField(s.to_string()))
    }
}

/// Boolean effect toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Invert,
    Grayscale,
    Sepia,
    Emboss,
}

impl Effect {
    pub const ALL: [Effect; 4] = [Effect::Invert, Effect::Grayscale, Effect::Sepia, Effect::Emboss];

    pub fn name(self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Emboss => "emboss",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Invert => "Invert colors",
            Self::Grayscale => "Black and white",
            Self::Sepia => "Sepia",
            Self::Emboss => "Emboss",
        }
    }
}

impl FromStr for Effect {
    type Err = AdjustError;

    fn from_str(s: &str) -> Result<Self> {
        Effect::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AdjustError::UnknownField(s.to_string()))
    }
}

/// Full parameter record applied to the active image.
///
/// Setters and deserialisation clamp every numeric field into its interval.
/// A record assembled by hand can hold anything, so whole records entering
/// the state or the pipeline pass through [`AdjustmentParameters::sanitized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawParameters")]
pub struct AdjustmentParameters {
    pub opacity: f32,
    pub contrast: f32,
    pub brightness: f32,
    pub saturation: f32,
    pub blur: f32,
    pub hue_rotate: f32,
    pub invert: bool,
    pub grayscale: bool,
    pub sepia: bool,
    pub emboss: bool,
}

impl Default for AdjustmentParameters {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl AdjustmentParameters {
    pub const BASELINE: AdjustmentParameters = AdjustmentParameters {
        opacity: 100.0,
        contrast: 100.0,
        brightness: 100.0,
        saturation: 100.0,
        blur: 0.0,
        hue_rotate: 0.0,
        invert: false,
        grayscale: false,
        sepia: false,
        emboss: false,
    };

    pub fn get(&self, field: Adjustment) -> f32 {
        match field {
            Adjustment::Opacity => self.opacity,
            Adjustment::Contrast => self.contrast,
            Adjustment::Brightness => self.brightness,
            Adjustment::Saturation => self.saturation,
            Adjustment::Blur => self.blur,
            Adjustment::HueRotate => self.hue_rotate,
        }
    }

    /// Store `value` clamped into the field's interval and return what was stored.
    pub fn set(&mut self, field: Adjustment, value: f32) -> Result<f32> {
        let clamped = field.clamp(value)?;
        if clamped != value {
            tracing::debug!(field = field.name(), value, clamped, "clamped adjustment");
        }
        let slot = match field {
            Adjustment::Opacity => &mut self.opacity,
            Adjustment::Contrast => &mut self.contrast,
            Adjustment::Brightness => &mut self.brightness,
            Adjustment::Saturation => &mut self.saturation,
            Adjustment::Blur => &mut self.blur,
            Adjustment::HueRotate => &mut self.hue_rotate,
        };
        *slot = clamped;
        Ok(clamped)
    }

    /// Copy with every numeric field clamped into its interval.
    ///
    /// Fails on the first non-finite field.
    pub fn sanitized(&self) -> Result<Self> {
        let mut out = *self;
        for field in Adjustment::ALL {
            out.set(field, self.get(field))?;
        }
        Ok(out)
    }

    pub fn effect(&self, effect: Effect) -> bool {
        match effect {
            Effect::Invert => self.invert,
            Effect::Grayscale => self.grayscale,
            Effect::Sepia => self.sepia,
            Effect::Emboss => self.emboss,
        }
    }

    pub fn set_effect(&mut self, effect: Effect, enabled: bool) {
        match effect {
            Effect::Invert => self.invert = enabled,
            Effect::Grayscale => self.grayscale = enabled,
            Effect::Sepia => self.sepia = enabled,
            Effect::Emboss => self.emboss = enabled,
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::BASELINE
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawParameters {
    opacity: f32,
    contrast: f32,
    brightness: f32,
    saturation: f32,
    blur: f32,
    hue_rotate: f32,
    invert: bool,
    grayscale: bool,
    sepia: bool,
    emboss: bool,
}

impl Default for RawParameters {
    fn default() -> Self {
        let b = AdjustmentParameters::BASELINE;
        Self {
            opacity: b.opacity,
            contrast: b.contrast,
            brightness: b.brightness,
            saturation: b.saturation,
            blur: b.blur,
            hue_rotate: b.hue_rotate,
            invert: b.invert,
            grayscale: b.grayscale,
            sepia: b.sepia,
            emboss: b.emboss,
        }
    }
}

impl TryFrom<RawParameters> for AdjustmentParameters {
    type Error = AdjustError;

    fn try_from(raw: RawParameters) -> Result<Self> {
        AdjustmentParameters {
            opacity: raw.opacity,
            contrast: raw.contrast,
            brightness: raw.brightness,
            saturation: raw.saturation,
            blur: raw.blur,
            hue_rotate: raw.hue_rotate,
            invert: raw.invert,
            grayscale: raw.grayscale,
            sepia: raw.sepia,
            emboss: raw.emboss,
        }
        .sanitized()
    }
}

/// Slider description handed to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderDescriptor {
    pub id: Adjustment,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleDescriptor {
    pub id: Effect,
    pub label: &'static str,
    pub default: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterDescriptors {
    pub sliders: Vec<SliderDescriptor>,
    pub toggles: Vec<ToggleDescriptor>,
}

pub fn descriptors() -> ParameterDescriptors {
    let sliders = Adjustment::ALL
        .into_iter()
        .map(|a| {
            let (min, max) = a.range();
            SliderDescriptor {
                id: a,
                label: a.label(),
                unit: a.unit(),
                min,
                max,
                step: 1.0,
                default: a.neutral(),
            }
        })
        .collect();
    let toggles = Effect::ALL
        .into_iter()
        .map(|e| ToggleDescriptor {
            id: e,
            label: e.label(),
            default: false,
        })
        .collect();
    ParameterDescriptors { sliders, toggles }
}
