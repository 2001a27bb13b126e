//! Deterministic transform pipeline: square crop, color adjustment, resize, pixelation.

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use tracing::debug;

use crate::imaging::{color::ColorAdjustment, params::TransformParameters};

/// Height every generated image is resized to.
pub const TARGET_SIZE: u32 = 256;

/// Widest output allowed, as a multiple of the target height.
pub const MAX_ASPECT: u32 = 16;

const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Run every stage enabled by `params` and return the resulting raster.
///
/// Color work happens before the resize and pixelation runs last, on the final resolution.
pub fn apply(image: DynamicImage, params: &TransformParameters) -> RgbaImage {
    let image = if params.is_square {
        crop_to_square(&image)
    } else {
        image
    };

    let mut rgba = image.into_rgba8();
    let adjustment = ColorAdjustment::from_params(params);
    debug!(
        width = rgba.width(),
        height = rgba.height(),
        brightness = ?adjustment.brightness(),
        identity = adjustment.is_identity(),
        "adjusting colors"
    );
    adjustment.apply(&mut rgba);

    let mut resized = resize_to_height(&rgba, TARGET_SIZE);

    if let Some(divisor) = params.pixelation_divisor() {
        pixelate(&mut resized, divisor);
    }

    resized
}

/// Offsets and side of the centered square inside a `width × height` image.
pub fn square_region(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Crop the largest centered square.
pub fn crop_to_square(image: &DynamicImage) -> DynamicImage {
    let (x, y, side) = square_region(image.width(), image.height());
    image.crop_imm(x, y, side, side)
}

/// Resize so the height equals `target`, keeping the aspect ratio up to [`MAX_ASPECT`].
///
/// Degenerate images (zero width or height) are returned unchanged.
pub fn resize_to_height(image: &RgbaImage, target: u32) -> RgbaImage {
    resize_to_height_with(image, target, RESIZE_FILTER)
}

/// [`resize_to_height`] with an explicit sampling filter.
pub fn resize_to_height_with(image: &RgbaImage, target: u32, filter: FilterType) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let new_width = scaled_width(width, height, target);
    if new_width < width && height < target {
        // narrow first: resize samples vertically first and would otherwise allocate
        // a full-width intermediate at the target height
        let narrowed = image::imageops::resize(image, new_width, height, filter);
        return image::imageops::resize(&narrowed, new_width, target, filter);
    }
    image::imageops::resize(image, new_width, target, filter)
}

/// `floor(target * width / height)`, at least 1 and at most `target * MAX_ASPECT`.
///
/// Panoramas wider than the cap are squeezed horizontally.
pub fn scaled_width(width: u32, height: u32, target: u32) -> u32 {
    if height == 0 {
        return 1;
    }
    let ratio = width as f64 / height as f64;
    let max_width = target.saturating_mul(MAX_ASPECT).max(1);
    ((target as f64 * ratio).floor() as u32).clamp(1, max_width)
}

/// Replace each `block × block` cell with its average color, where `block = floor(height / divisor)`.
pub fn pixelate(image: &mut RgbaImage, divisor: f32) {
    let block = block_size(image.height(), divisor);
    if block <= 1 {
        return;
    }

    let (width, height) = image.dimensions();
    for top in (0..height).step_by(block as usize) {
        for left in (0..width).step_by(block as usize) {
            let right = (left + block).min(width);
            let bottom = (top + block).min(height);

            let mut sums = [0u64; 4];
            for y in top..bottom {
                for x in left..right {
                    for (sum, channel) in sums.iter_mut().zip(image.get_pixel(x, y).0) {
                        *sum += u64::from(channel);
                    }
                }
            }
            let count = u64::from((right - left) * (bottom - top));
            let average = Rgba(sums.map(|sum| (sum / count) as u8));

            for y in top..bottom {
                for x in left..right {
                    image.put_pixel(x, y, average);
                }
            }
        }
    }
}

/// Edge length of a pixelation block for an image of the given height.
pub fn block_size(height: u32, divisor: f32) -> u32 {
    if divisor <= 0.0 {
        return 1;
    }
    (height as f32 / divisor).floor() as u32
}
