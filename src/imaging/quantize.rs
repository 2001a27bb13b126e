//! Palette extraction by k-means color quantization.

use image::{RgbaImage, imageops::FilterType};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Longest edge of the working copy used for clustering.
const SAMPLE_EDGE: u32 = 64;
/// Pixels more transparent than this are ignored.
const MIN_ALPHA: u8 = 125;
const ITERATIONS: usize = 10;

/// Ordered representative colors, most common first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Vec<Vec<u8>>)]
pub struct Palette(Vec<[u8; 3]>);

impl Palette {
    /// Wrap already-ordered colors.
    pub fn new(colors: Vec<[u8; 3]>) -> Self {
        Self(colors)
    }

    /// Colors in palette order.
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.0
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no color was extracted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// CSS `rgb(r, g, b)` notation for every color.
    pub fn css_styles(&self) -> Vec<String> {
        self.0.iter().map(|c| css_rgb(*c)).collect()
    }
}

/// Render a color as a CSS `rgb()` function.
pub fn css_rgb([r, g, b]: [u8; 3]) -> String {
    format!("rgb({r}, {g}, {b})")
}

/// Failures raised while quantizing an image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizeError {
    /// The image does not hold enough distinct opaque colors.
    #[error("palette has {found} colors, at least {required} required")]
    NotEnoughColors {
        /// Distinct colors the quantizer produced.
        found: usize,
        /// Colors the caller needs.
        required: usize,
    },
}

/// Extract up to `count` dominant colors and require at least `required` of them.
pub fn extract_palette(
    image: &RgbaImage,
    count: usize,
    required: usize,
) -> Result<Palette, QuantizeError> {
    let samples = sample_pixels(image);
    let palette = Palette::new(kmeans(&samples, count));
    if palette.len() < required {
        return Err(QuantizeError::NotEnoughColors {
            found: palette.len(),
            required,
        });
    }
    Ok(palette)
}

fn sample_pixels(image: &RgbaImage) -> Vec<[f32; 3]> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let longest = width.max(height);
    let working = if longest > SAMPLE_EDGE {
        let scale = SAMPLE_EDGE as f32 / longest as f32;
        let w = ((width as f32 * scale).round() as u32).max(1);
        let h = ((height as f32 * scale).round() as u32).max(1);
        image::imageops::resize(image, w, h, FilterType::Triangle)
    } else {
        image.clone()
    };

    working
        .pixels()
        .filter(|p| p.0[3] >= MIN_ALPHA)
        .map(|p| [f32::from(p.0[0]), f32::from(p.0[1]), f32::from(p.0[2])])
        .collect()
}

fn dist_sq(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(pixel: [f32; 3], centroids: &[[f32; 3]]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| dist_sq(pixel, **a).total_cmp(&dist_sq(pixel, **b)))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Farthest-point seeding followed by Lloyd iterations; returns clusters by population.
fn kmeans(pixels: &[[f32; 3]], k: usize) -> Vec<[u8; 3]> {
    if pixels.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = Vec::with_capacity(k);
    centroids.push(pixels[pixels.len() / 2]);
    while centroids.len() < k {
        let (best_idx, best_dist) = pixels
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d = centroids
                    .iter()
                    .map(|c| dist_sq(*p, *c))
                    .fold(f32::MAX, f32::min);
                (i, d)
            })
            .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if best_dist == 0.0 {
            // fewer distinct colors than requested
            break;
        }
        centroids.push(pixels[best_idx]);
    }

    let mut counts = vec![0usize; centroids.len()];
    for _ in 0..ITERATIONS {
        let mut sums = vec![[0.0f32; 3]; centroids.len()];
        counts.fill(0);

        for p in pixels {
            let c = nearest(*p, &centroids);
            counts[c] += 1;
            for (sum, v) in sums[c].iter_mut().zip(p) {
                *sum += v;
            }
        }

        for (centroid, (sum, &n)) in centroids.iter_mut().zip(sums.iter().zip(&counts)) {
            if n > 0 {
                *centroid = sum.map(|s| s / n as f32);
            }
        }
    }

    let mut clusters: Vec<([u8; 3], usize)> = Vec::new();
    for (centroid, n) in centroids.into_iter().zip(counts) {
        if n == 0 {
            continue;
        }
        let color = centroid.map(|c| c.round().clamp(0.0, 255.0) as u8);
        match clusters.iter_mut().find(|(existing, _)| *existing == color) {
            Some((_, total)) => *total += n,
            None => clusters.push((color, n)),
        }
    }
    clusters.sort_by(|a, b| b.1.cmp(&a.1));
    clusters.into_iter().map(|(color, _)| color).collect()
}
