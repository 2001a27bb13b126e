//! Transform parameters and the lenient normalization applied to raw query input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pixelation divisor used when pixelation is requested without an explicit amount.
pub const DEFAULT_PIXELATION: f32 = 16.0;

const COLOR_RANGE: (f32, f32) = (-100.0, 100.0);
const GLITCH_RANGE: (f32, f32) = (0.0, 100.0);
const PIXELATION_RANGE: (f32, f32) = (0.0, 100.0);

/// Full set of knobs driving the transform pipeline and the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformParameters {
    /// Hue rotation in degrees, within `[-100, 100]`.
    pub hue: f32,
    /// Saturation delta in percent, within `[-100, 100]`.
    pub saturation: f32,
    /// Brightness delta in percent; the sign selects tint or lighten.
    pub brightness: f32,
    /// Contrast delta in percent, normalized to `[-1, 1]` when applied.
    pub contrast: f32,
    /// Color corruption amount, within `[0, 100]`.
    pub glitch: f32,
    /// Block-count divisor for pixelation, `0` disables it.
    pub pixelation: f32,
    /// Gate for the pixelation stage.
    pub is_pixelated: bool,
    /// Gate for mosaic synthesis.
    pub is_mesh: bool,
    /// Gate for gradient synthesis.
    pub is_gradient: bool,
    /// Gate for the centered square crop.
    pub is_square: bool,
}

impl TransformParameters {
    /// Parameters served by `/get/params`: a mild filter plus pixelation.
    pub fn standard() -> Self {
        Self {
            hue: 5.0,
            saturation: 20.0,
            brightness: 0.0,
            contrast: -20.0,
            glitch: 0.0,
            pixelation: DEFAULT_PIXELATION,
            is_pixelated: true,
            is_mesh: false,
            is_gradient: false,
            is_square: true,
        }
    }

    /// Pass-through parameters: every color operation is the identity and nothing is pixelated.
    pub fn neutral() -> Self {
        Self {
            hue: 0.0,
            saturation: 0.0,
            brightness: 0.0,
            contrast: 0.0,
            glitch: 0.0,
            pixelation: 0.0,
            is_pixelated: false,
            is_mesh: false,
            is_gradient: false,
            is_square: true,
        }
    }

    /// Neutral colors, no square crop.
    pub fn uncropped() -> Self {
        Self {
            is_square: false,
            ..Self::neutral()
        }
    }

    /// Neutral colors with the default pixelation.
    pub fn pixelated() -> Self {
        Self {
            pixelation: DEFAULT_PIXELATION,
            is_pixelated: true,
            ..Self::neutral()
        }
    }

    /// Build parameters from raw query values.
    ///
    /// In default mode the numeric fields stay neutral and only the boolean gates are read.
    /// Otherwise every field is clamped independently against [`TransformParameters::standard`].
    /// Malformed input never fails; it falls back to the field default.
    pub fn normalize(raw: &HashMap<String, String>, default_mode: bool) -> Self {
        let base = if default_mode {
            Self::neutral()
        } else {
            Self::standard()
        };
        Self::normalize_over(raw, base, default_mode)
    }

    /// [`TransformParameters::normalize`] with `base` supplying the defaults.
    ///
    /// Preset endpoints call this in default mode so their numeric fields stay fixed
    /// while the boolean gates still come from the query.
    pub fn normalize_over(raw: &HashMap<String, String>, base: Self, default_mode: bool) -> Self {
        let num = |key: &str, default: f32, (min, max): (f32, f32)| {
            if default_mode {
                default
            } else {
                clamp(raw.get(key).map(String::as_str), default, min, max)
            }
        };
        let flag = |key: &str, default: bool| coerce_bool(raw.get(key).map(String::as_str), default);

        let params = Self {
            hue: num("hue", base.hue, COLOR_RANGE),
            saturation: num("saturation", base.saturation, COLOR_RANGE),
            brightness: num("brightness", base.brightness, COLOR_RANGE),
            contrast: num("contrast", base.contrast, COLOR_RANGE),
            glitch: num("glitch", base.glitch, GLITCH_RANGE),
            pixelation: num("pixelation", base.pixelation, PIXELATION_RANGE),
            is_pixelated: flag("isPixelated", base.is_pixelated),
            is_mesh: flag("isMesh", base.is_mesh),
            is_gradient: flag("isGradient", base.is_gradient),
            is_square: flag("isSquare", base.is_square),
        };

        params.enforce_gates()
    }

    /// Turn on mosaic synthesis.
    pub fn with_mesh(mut self) -> Self {
        self.is_mesh = true;
        self
    }

    /// Turn on gradient synthesis, which also disables pixelation.
    pub fn with_gradient(mut self) -> Self {
        self.is_gradient = true;
        self.enforce_gates()
    }

    /// Divisor used by the pixelation stage, or `None` when the stage is skipped.
    ///
    /// A zero amount with the flag on falls back to [`DEFAULT_PIXELATION`].
    pub fn pixelation_divisor(&self) -> Option<f32> {
        if !self.is_pixelated || self.is_gradient {
            return None;
        }
        if self.pixelation > 0.0 {
            Some(self.pixelation)
        } else {
            Some(DEFAULT_PIXELATION)
        }
    }

    fn enforce_gates(mut self) -> Self {
        // pixelation only counts with a positive amount; gradients are blurred instead
        self.is_pixelated = self.is_pixelated && self.pixelation > 0.0 && !self.is_gradient;
        self
    }
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parse the leading number of `value` and clamp it into `[min, max]`, using `default` when
/// there is none.
pub fn clamp(value: Option<&str>, default: f32, min: f32, max: f32) -> f32 {
    match value.and_then(leading_float) {
        Some(parsed) => parsed.clamp(min, max),
        None => default,
    }
}

/// Longest prefix of `raw` (after leading whitespace) that reads as a decimal number.
///
/// `"12abc"` reads as 12 and `"1e"` as 1. The only spelled-out value is `Infinity`, so `"inf"`
/// and `"nan"` have no number.
pub fn leading_float(raw: &str) -> Option<f32> {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return text[..end + "Infinity".len()].parse().ok();
    }

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end].parse().ok()
}

/// Map exactly `"true"`/`"false"` to a boolean, anything else to `default`.
pub fn coerce_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        Some("true") => true,
        Some("false") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn clamp_snaps_to_nearest_bound() {
        assert_eq!(clamp(Some("250"), 5.0, -100.0, 100.0), 100.0);
        assert_eq!(clamp(Some("-1e9"), 5.0, -100.0, 100.0), -100.0);
        assert_eq!(clamp(Some("-3"), 5.0, 0.0, 100.0), 0.0);
        assert_eq!(clamp(Some("Infinity"), 5.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp(Some("-Infinity"), 5.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn clamp_reads_the_leading_number() {
        assert_eq!(clamp(Some("12abc"), 5.0, -100.0, 100.0), 12.0);
        assert_eq!(clamp(Some("-.5e1px"), 5.0, -100.0, 100.0), -5.0);
        assert_eq!(clamp(Some("3e"), 5.0, -100.0, 100.0), 3.0);
        assert_eq!(clamp(Some("7."), 5.0, -100.0, 100.0), 7.0);
        assert_eq!(clamp(Some("1.5.2"), 5.0, -100.0, 100.0), 1.5);
    }

    #[test]
    fn leading_float_rejects_non_numbers() {
        for junk in ["inf", "nan", "NaN", ".", "-", "e5", "+.e1", "abc12"] {
            assert_eq!(leading_float(junk), None, "{junk:?}");
        }
    }

    #[test]
    fn clamp_keeps_values_in_range() {
        assert_eq!(clamp(Some("42.5"), 5.0, -100.0, 100.0), 42.5);
        assert_eq!(clamp(Some(" -7 "), 5.0, -100.0, 100.0), -7.0);
    }

    #[test]
    fn clamp_falls_back_on_garbage() {
        assert_eq!(clamp(Some("abc"), 5.0, -100.0, 100.0), 5.0);
        assert_eq!(clamp(Some(""), -20.0, -100.0, 100.0), -20.0);
        assert_eq!(clamp(Some("NaN"), 16.0, 0.0, 100.0), 16.0);
        assert_eq!(clamp(None, 20.0, -100.0, 100.0), 20.0);
    }

    #[test]
    fn coerce_bool_only_accepts_exact_literals() {
        assert!(coerce_bool(Some("true"), false));
        assert!(!coerce_bool(Some("false"), true));
        for junk in ["TRUE", "1", "yes", " true", ""] {
            assert!(coerce_bool(Some(junk), true), "{junk:?}");
            assert!(!coerce_bool(Some(junk), false), "{junk:?}");
        }
        assert!(coerce_bool(None, true));
    }

    #[test]
    fn normalize_without_input_returns_standard() {
        let params = TransformParameters::normalize(&HashMap::new(), false);
        assert_eq!(params, TransformParameters::standard());
    }

    #[test]
    fn normalize_clamps_each_field() {
        let params = TransformParameters::normalize(
            &raw(&[
                ("hue", "300"),
                ("saturation", "oops"),
                ("brightness", "-40"),
                ("contrast", "-101"),
                ("glitch", "-5"),
                ("pixelation", "8"),
                ("isSquare", "false"),
            ]),
            false,
        );
        assert_eq!(params.hue, 100.0);
        assert_eq!(params.saturation, 20.0);
        assert_eq!(params.brightness, -40.0);
        assert_eq!(params.contrast, -100.0);
        assert_eq!(params.glitch, 0.0);
        assert_eq!(params.pixelation, 8.0);
        assert!(!params.is_square);
        assert!(params.is_pixelated);
    }

    #[test]
    fn default_mode_ignores_numeric_input() {
        let params = TransformParameters::normalize(
            &raw(&[("hue", "50"), ("contrast", "80"), ("isSquare", "false")]),
            true,
        );
        assert_eq!(params.hue, 0.0);
        assert_eq!(params.contrast, 0.0);
        assert!(!params.is_square);
        assert!(!params.is_pixelated);
    }

    #[test]
    fn presets_keep_numbers_but_read_gates() {
        let query = raw(&[("pixelation", "4"), ("hue", "30"), ("isSquare", "false")]);

        let pixelated = TransformParameters::normalize_over(&query, TransformParameters::pixelated(), true);
        assert_eq!(pixelated.pixelation, DEFAULT_PIXELATION);
        assert_eq!(pixelated.hue, 0.0);
        assert!(pixelated.is_pixelated);
        assert!(!pixelated.is_square);

        let uncropped =
            TransformParameters::normalize_over(&raw(&[]), TransformParameters::uncropped(), true);
        assert_eq!(uncropped, TransformParameters::uncropped());

        let no_pixels = raw(&[("isPixelated", "false")]);
        let plain = TransformParameters::normalize_over(&no_pixels, TransformParameters::pixelated(), true);
        assert_eq!(plain.pixelation_divisor(), None);
    }

    #[test]
    fn zero_pixelation_disables_the_flag() {
        let params =
            TransformParameters::normalize(&raw(&[("pixelation", "0"), ("isPixelated", "true")]), false);
        assert!(!params.is_pixelated);
        assert_eq!(params.pixelation_divisor(), None);
    }

    #[test]
    fn gradient_forces_pixelation_off() {
        let params = TransformParameters::normalize(
            &raw(&[
                ("isGradient", "true"),
                ("isPixelated", "true"),
                ("pixelation", "16"),
            ]),
            false,
        );
        assert!(params.is_gradient);
        assert!(!params.is_pixelated);
        assert_eq!(params.pixelation_divisor(), None);

        let preset = TransformParameters::standard().with_gradient();
        assert!(!preset.is_pixelated);
    }

    #[test]
    fn pixelation_divisor_defaults_when_amount_missing() {
        let params = TransformParameters {
            is_pixelated: true,
            pixelation: 0.0,
            ..TransformParameters::neutral()
        };
        assert_eq!(params.pixelation_divisor(), Some(DEFAULT_PIXELATION));
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(TransformParameters::standard()).unwrap();
        assert_eq!(json["isPixelated"], true);
        assert_eq!(json["contrast"], -20.0);
        assert!(json.get("is_square").is_none());
    }

    #[test]
    fn pixelated_preset_keeps_colors_neutral() {
        let params = TransformParameters::pixelated();
        assert_eq!(params.pixelation_divisor(), Some(16.0));
        assert!(params.is_square);
        assert_eq!(params.hue, 0.0);
        assert_eq!(params.contrast, 0.0);
    }
}
