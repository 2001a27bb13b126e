/// Color adjustment model used by the pipeline.
pub mod color;
/// Mosaic and gradient synthesis from an extracted palette.
pub mod mosaic;
/// Transform parameters and their normalization.
pub mod params;
/// Geometric and color transform pipeline.
pub mod pipeline;
/// Palette extraction by color quantization.
pub mod quantize;
