//! Palette-driven mosaic and gradient synthesis on top of a transformed image.

use image::{RgbaImage, imageops::FilterType};
use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::imaging::{
    params::TransformParameters,
    pipeline::{TARGET_SIZE, pixelate, resize_to_height, resize_to_height_with},
    quantize::{Palette, css_rgb},
};

/// Height of the tile grid a mosaic is drawn on.
pub const MOSAIC_GRID: u32 = 6;
/// Blur sigma applied to gradient-mode images.
pub const GRADIENT_BLUR: f32 = 20.0;
/// Stop offsets, in percent, matched positionally to palette indices 0..4.
pub const GRADIENT_OFFSETS: [u8; 4] = [0, 25, 75, 100];

/// Which synthesis pass runs after the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// Random palette tiles, upsampled and pixelated.
    Mosaic,
    /// Blurred image plus a 4-stop gradient descriptor.
    Gradient,
}

impl SynthesisMode {
    /// Mode requested by `params`, gradient taking precedence over mosaic.
    pub fn from_params(params: &TransformParameters) -> Option<Self> {
        if params.is_gradient {
            Some(Self::Gradient)
        } else if params.is_mesh {
            Some(Self::Mosaic)
        } else {
            None
        }
    }

    /// Minimum palette size this mode reads from.
    pub fn required_colors(self) -> usize {
        match self {
            Self::Mosaic => 1,
            Self::Gradient => GRADIENT_OFFSETS.len(),
        }
    }
}

/// One color stop of a linear gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct GradientStop {
    /// Position along the gradient, in percent.
    pub offset: u8,
    /// Stop color as `[r, g, b]`.
    #[schema(value_type = Vec<u8>)]
    pub color: [u8; 3],
}

/// Declarative 4-stop linear gradient for a client to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GradientDescriptor {
    /// Stops in ascending offset order.
    pub stops: Vec<GradientStop>,
}

impl GradientDescriptor {
    /// Build from palette entries 0..4, or `None` when the palette is shorter than that.
    pub fn from_palette(palette: &Palette) -> Option<Self> {
        let colors = palette.colors().get(..GRADIENT_OFFSETS.len())?;
        let stops = GRADIENT_OFFSETS
            .iter()
            .zip(colors)
            .map(|(&offset, &color)| GradientStop { offset, color })
            .collect();
        Some(Self { stops })
    }

    /// CSS `linear-gradient` rendering of the stops.
    pub fn css(&self) -> String {
        let stops = self
            .stops
            .iter()
            .map(|stop| format!("{} {}%", css_rgb(stop.color), stop.offset))
            .collect::<Vec<_>>()
            .join(", ");
        format!("linear-gradient(90deg, {stops})")
    }
}

/// Output of a synthesis pass.
#[derive(Debug, Clone)]
pub struct Synthesized {
    /// Raster that replaces the pipeline output on disk.
    pub image: RgbaImage,
    /// Present in gradient mode.
    pub gradient: Option<GradientDescriptor>,
}

/// Run the pass selected by `mode`.
pub fn synthesize<R: Rng + ?Sized>(
    mode: SynthesisMode,
    image: &RgbaImage,
    palette: &Palette,
    params: &TransformParameters,
    rng: &mut R,
) -> Synthesized {
    match mode {
        SynthesisMode::Mosaic => Synthesized {
            image: mosaic(image, palette, params.pixelation_divisor(), rng),
            gradient: None,
        },
        SynthesisMode::Gradient => Synthesized {
            image: image::imageops::blur(image, GRADIENT_BLUR),
            gradient: GradientDescriptor::from_palette(palette),
        },
    }
}

/// Redraw `image` as a coarse grid of randomly chosen palette colors.
///
/// The grid only fixes tile granularity; tile colors come from the palette alone.
/// Alpha of each tile is kept from the downsampled source.
pub fn mosaic<R: Rng + ?Sized>(
    image: &RgbaImage,
    palette: &Palette,
    pixelation: Option<f32>,
    rng: &mut R,
) -> RgbaImage {
    let mut grid = resize_to_height(image, MOSAIC_GRID);
    let colors = palette.colors();
    if !colors.is_empty() {
        for pixel in grid.pixels_mut() {
            let [r, g, b] = colors[rng.random_range(0..colors.len())];
            pixel.0[0] = r;
            pixel.0[1] = g;
            pixel.0[2] = b;
        }
    }

    // nearest keeps tiles flat; pixelation then softens the tile seams
    let mut upsampled = resize_to_height_with(&grid, TARGET_SIZE, FilterType::Nearest);
    if let Some(divisor) = pixelation {
        pixelate(&mut upsampled, divisor);
    }
    upsampled
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn primaries() -> Palette {
        Palette::new(vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]])
    }

    #[test]
    fn gradient_stops_follow_palette_order() {
        let descriptor = GradientDescriptor::from_palette(&primaries()).unwrap();
        let stops: Vec<_> = descriptor.stops.iter().map(|s| (s.offset, s.color)).collect();
        assert_eq!(
            stops,
            vec![
                (0, [255, 0, 0]),
                (25, [0, 255, 0]),
                (75, [0, 0, 255]),
                (100, [255, 255, 0]),
            ]
        );
        assert_eq!(
            descriptor.css(),
            "linear-gradient(90deg, rgb(255, 0, 0) 0%, rgb(0, 255, 0) 25%, \
             rgb(0, 0, 255) 75%, rgb(255, 255, 0) 100%)"
        );
    }

    #[test]
    fn gradient_needs_four_colors() {
        let short = Palette::new(vec![[1, 1, 1], [2, 2, 2], [3, 3, 3]]);
        assert!(GradientDescriptor::from_palette(&short).is_none());
    }

    #[test]
    fn gradient_wins_over_mesh() {
        let params = TransformParameters {
            is_mesh: true,
            is_gradient: true,
            ..TransformParameters::neutral()
        };
        assert_eq!(SynthesisMode::from_params(&params), Some(SynthesisMode::Gradient));
        assert_eq!(SynthesisMode::from_params(&TransformParameters::neutral()), None);
        assert_eq!(SynthesisMode::Gradient.required_colors(), 4);
        assert_eq!(SynthesisMode::Mosaic.required_colors(), 1);
    }

    #[test]
    fn mosaic_only_uses_palette_colors() {
        let source = RgbaImage::from_pixel(300, 300, Rgba([9, 9, 9, 255]));
        let palette = primaries();
        let mut rng = StdRng::seed_from_u64(7);

        let out = mosaic(&source, &palette, Some(16.0), &mut rng);

        assert_eq!(out.dimensions(), (TARGET_SIZE, TARGET_SIZE));
        let corner = out.get_pixel(0, 0).0;
        assert!(palette.colors().contains(&[corner[0], corner[1], corner[2]]));
        assert!(out.pixels().all(|p| p.0[..3] != [9, 9, 9]));
    }

    #[test]
    fn mosaic_is_reproducible_with_a_seed() {
        let source = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
        let a = mosaic(&source, &primaries(), Some(16.0), &mut StdRng::seed_from_u64(3));
        let b = mosaic(&source, &primaries(), Some(16.0), &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn mosaic_of_a_panorama_is_width_capped() {
        let source = RgbaImage::from_pixel(65_536, 1, Rgba([9, 9, 9, 255]));
        let out = mosaic(&source, &primaries(), None, &mut StdRng::seed_from_u64(5));
        assert_eq!(
            out.dimensions(),
            (TARGET_SIZE * crate::imaging::pipeline::MAX_ASPECT, TARGET_SIZE)
        );
    }

    #[test]
    fn gradient_mode_blurs_and_describes() {
        let source = RgbaImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let params = TransformParameters::neutral().with_gradient();
        let out = synthesize(
            SynthesisMode::Gradient,
            &source,
            &primaries(),
            &params,
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(out.image.dimensions(), (64, 64));
        let edge = out.image.get_pixel(31, 32).0[0];
        assert!(edge > 0 && edge < 255, "{edge}");
        assert_eq!(out.gradient.unwrap().stops.len(), 4);
    }
}
