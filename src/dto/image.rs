use serde::Serialize;
use utoipa::ToSchema;

use crate::imaging::{mosaic::GradientDescriptor, params::TransformParameters, quantize::Palette};

/// Plain `{message}` payload used by the welcome routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Human readable text.
    pub message: String,
}

impl MessageResponse {
    /// Wrap `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Palette fields shared by image and palette responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaletteFields {
    /// Extracted colors as `[r, g, b]`, most common first.
    pub palette: Palette,
    /// CSS `rgb()` notation of every palette color.
    pub palette_styles: Vec<String>,
    /// CSS `linear-gradient` built from the first four colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient_style: Option<String>,
}

impl PaletteFields {
    /// Derive the CSS renderings from `palette`.
    pub fn from_palette(palette: Palette) -> Self {
        let palette_styles = palette.css_styles();
        let gradient_style = GradientDescriptor::from_palette(&palette).map(|g| g.css());
        Self {
            palette,
            palette_styles,
            gradient_style,
        }
    }
}

/// Metadata describing a generated file.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    /// Source URL as supplied by the caller.
    pub url: String,
    /// Path the generated file is served at.
    pub src: String,
    /// Generated filename.
    pub file: String,
    /// Effective parameters, omitted for the fixed presets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<TransformParameters>,
    /// Palette the mosaic or gradient was built from.
    #[serde(flatten)]
    pub palette: Option<PaletteFields>,
    /// Gradient stops, only in gradient mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<GradientDescriptor>,
}

/// Result of a palette-only request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaletteResponse {
    /// Source URL as supplied by the caller.
    pub url: String,
    #[serde(flatten)]
    /// Extracted colors and their CSS renderings.
    pub fields: PaletteFields,
}
