//! Generation requests: fetch the source, transform it off the runtime, optionally remap it
//! onto its palette and persist the result under a fresh name.

use image::RgbaImage;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    dto::{
        image::{ImageResponse, PaletteFields},
        validation::validate_source_url,
    },
    error::ServiceError,
    imaging::{
        mosaic::{self, GradientDescriptor, SynthesisMode},
        params::TransformParameters,
        pipeline,
        quantize::{self, Palette, QuantizeError},
    },
    state::SharedState,
};

/// Whether the effective parameters are echoed back in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoParams {
    /// Include `params` in the response.
    Yes,
    /// Fixed presets leave `params` out.
    No,
}

struct Rendered {
    image: RgbaImage,
    palette: Option<Palette>,
    gradient: Option<GradientDescriptor>,
}

/// Run the whole generation flow for `raw_url` and describe the stored file.
pub async fn generate(
    state: &SharedState,
    raw_url: Option<&str>,
    params: TransformParameters,
    echo: EchoParams,
) -> Result<ImageResponse, ServiceError> {
    let url = validate_source_url(raw_url)?;
    let source = state.source().fetch(&url).await?;

    let now = OffsetDateTime::now_utc();
    state.store().sweep(now).await;

    let palette_size = state.config().palette_size;
    let rendered = tokio::task::spawn_blocking(move || render(source, params, palette_size))
        .await
        .map_err(|err| ServiceError::Internal(format!("render worker failed: {err}")))??;

    let name = state.store().reserve(now);
    state.store().write(rendered.image, &name).await?;

    let file = name.to_string();
    info!(url = %url, file = %file, "generated image");
    Ok(ImageResponse {
        url,
        src: format!("/{file}"),
        file,
        params: (echo == EchoParams::Yes).then_some(params),
        palette: rendered.palette.map(PaletteFields::from_palette),
        gradient: rendered.gradient,
    })
}

fn render(
    source: image::DynamicImage,
    params: TransformParameters,
    palette_size: usize,
) -> Result<Rendered, QuantizeError> {
    let transformed = pipeline::apply(source, &params);
    let Some(mode) = SynthesisMode::from_params(&params) else {
        return Ok(Rendered {
            image: transformed,
            palette: None,
            gradient: None,
        });
    };

    let required = mode.required_colors();
    let palette = quantize::extract_palette(&transformed, palette_size.max(required), required)?;
    debug!(?mode, colors = palette.len(), "palette extracted");

    let synthesized = mosaic::synthesize(mode, &transformed, &palette, &params, &mut rand::rng());
    Ok(Rendered {
        image: synthesized.image,
        palette: Some(palette),
        gradient: synthesized.gradient,
    })
}
