use utoipa::{OpenApi, openapi};

use crate::config::DEFAULT_API_PREFIX;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for image-mesh.
#[openapi(
    paths(
        crate::routes::welcome,
        crate::routes::health::healthcheck,
        crate::routes::params::get_params,
        crate::routes::params::get_default_params,
        crate::routes::image::get_image,
        crate::routes::image::get_square,
        crate::routes::image::get_pixelated,
        crate::routes::image::get_edited,
        crate::routes::image::get_pixel_mesh,
        crate::routes::image::get_pixel_gradient,
        crate::routes::palette::get_palette,
        crate::routes::palette::get_gradient,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::image::MessageResponse,
            crate::dto::image::ImageResponse,
            crate::dto::image::PaletteResponse,
            crate::dto::image::PaletteFields,
            crate::imaging::params::TransformParameters,
            crate::imaging::quantize::Palette,
            crate::imaging::mosaic::GradientDescriptor,
            crate::imaging::mosaic::GradientStop,
        )
    ),
    tags(
        (name = "health", description = "Health check and welcome endpoints"),
        (name = "params", description = "Transform parameter presets"),
        (name = "images", description = "Image generation"),
        (name = "palette", description = "Palette extraction"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Document with the API paths moved under `prefix` instead of the default one.
    pub fn for_prefix(prefix: &str) -> openapi::OpenApi {
        let mut doc = Self::openapi();
        if prefix == DEFAULT_API_PREFIX {
            return doc;
        }
        doc.paths.paths = std::mem::take(&mut doc.paths.paths)
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DEFAULT_API_PREFIX) {
                Some(rest) => (format!("{prefix}{rest}"), item),
                None => (path, item),
            })
            .collect();
        doc
    }
}
