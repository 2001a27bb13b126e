//! Per-pixel color adjustment model.
//!
//! Colors are handled as sRGB components in `[0, 1]`. Hue and saturation work in HSL,
//! tint blends linearly toward white, lighten shifts HSL lightness and contrast scales
//! each channel around mid-gray. All amounts are percentages except hue, which is degrees.

use image::RgbaImage;
use palette::{Hsl, IntoColor, ShiftHue, Srgb};

use crate::imaging::params::TransformParameters;

/// How a brightness delta is applied, chosen once from its sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrightnessStrategy {
    /// Blend toward white; used for non-negative amounts.
    Tint(f32),
    /// Shift HSL lightness; used for negative amounts, which darken.
    Lighten(f32),
}

impl BrightnessStrategy {
    /// Pick the strategy matching the sign of `amount`.
    pub fn for_amount(amount: f32) -> Self {
        if amount >= 0.0 {
            Self::Tint(amount)
        } else {
            Self::Lighten(amount)
        }
    }

    fn apply(self, rgb: Srgb<f32>) -> Srgb<f32> {
        match self {
            Self::Tint(amount) => tint(rgb, amount),
            Self::Lighten(amount) => lighten(rgb, amount),
        }
    }

    fn is_identity(self) -> bool {
        matches!(self, Self::Tint(a) | Self::Lighten(a) if a == 0.0)
    }
}

/// Ordered color operations derived from a [`TransformParameters`] value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjustment {
    hue: f32,
    saturation: f32,
    glitch: f32,
    brightness: BrightnessStrategy,
    contrast: f32,
}

impl ColorAdjustment {
    /// Derive the adjustment; glitch is negated and contrast normalized to `[-1, 1]`.
    pub fn from_params(params: &TransformParameters) -> Self {
        Self {
            hue: params.hue,
            saturation: params.saturation,
            glitch: -params.glitch,
            brightness: BrightnessStrategy::for_amount(params.brightness),
            contrast: params.contrast / 100.0,
        }
    }

    /// Strategy selected for the brightness delta.
    pub fn brightness(&self) -> BrightnessStrategy {
        self.brightness
    }

    /// True when applying the adjustment would not change any pixel.
    pub fn is_identity(&self) -> bool {
        self.hue == 0.0
            && self.saturation == 0.0
            && self.glitch == 0.0
            && self.brightness.is_identity()
            && self.contrast == 0.0
    }

    /// Adjust every pixel in place. Alpha is left untouched.
    pub fn apply(&self, image: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }
        for pixel in image.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            let adjusted = self.apply_rgb(Srgb::new(r, g, b).into_format());
            let out: Srgb<u8> = adjusted.into_format();
            pixel.0[0] = out.red;
            pixel.0[1] = out.green;
            pixel.0[2] = out.blue;
        }
    }

    fn apply_rgb(&self, mut rgb: Srgb<f32>) -> Srgb<f32> {
        if self.hue != 0.0 || self.saturation != 0.0 {
            let mut hsl: Hsl = rgb.into_color();
            hsl = hsl.shift_hue(self.hue);
            hsl.saturation = (hsl.saturation + self.saturation / 100.0).clamp(0.0, 1.0);
            rgb = hsl.into_color();
        }
        if self.glitch != 0.0 {
            rgb = tint(rgb, self.glitch);
        }
        if !self.brightness.is_identity() {
            rgb = self.brightness.apply(rgb);
        }
        if self.contrast != 0.0 {
            rgb = contrast(rgb, self.contrast);
        }
        rgb
    }
}

/// Linear blend toward white. Negative amounts push channels below their value and wash colors out.
fn tint(rgb: Srgb<f32>, amount: f32) -> Srgb<f32> {
    let p = amount / 100.0;
    let mix = |c: f32| (c + (1.0 - c) * p).clamp(0.0, 1.0);
    Srgb::new(mix(rgb.red), mix(rgb.green), mix(rgb.blue))
}

fn lighten(rgb: Srgb<f32>, amount: f32) -> Srgb<f32> {
    let mut hsl: Hsl = rgb.into_color();
    hsl.lightness = (hsl.lightness + amount / 100.0).clamp(0.0, 1.0);
    hsl.into_color()
}

fn contrast(rgb: Srgb<f32>, amount: f32) -> Srgb<f32> {
    // amount == 1 would divide by zero; the epsilon turns it into a hard threshold
    let factor = (1.0 + amount) / (1.0 - amount).max(f32::EPSILON);
    let scale = |c: f32| ((c - 0.5) * factor + 0.5).clamp(0.0, 1.0);
    Srgb::new(scale(rgb.red), scale(rgb.green), scale(rgb.blue))
}
