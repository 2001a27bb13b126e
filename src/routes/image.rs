use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::image::ImageResponse,
    error::AppError,
    imaging::params::TransformParameters,
    services::image_service::{self, EchoParams},
    state::SharedState,
};

type RawQuery = Query<HashMap<String, String>>;

/// Image generation endpoints, one per preset.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/get/image", get(get_image))
        .route("/get/image/square", get(get_square))
        .route("/get/image/pixelate", get(get_pixelated))
        .route("/get/image/edited", get(get_edited))
        .route("/get/image/pixelMesh", get(get_pixel_mesh))
        .route("/get/image/pixelGradient", get(get_pixel_gradient))
}

async fn run(
    state: &SharedState,
    query: &HashMap<String, String>,
    params: TransformParameters,
    echo: EchoParams,
) -> Result<Json<ImageResponse>, AppError> {
    let url = query.get("url").map(String::as_str);
    let payload = image_service::generate(state, url, params, echo).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/get/image",
    context_path = "/image-mesh/api",
    tag = "images",
    params(
        ("url" = String, Query, description = "Source image URL"),
        ("isSquare" = Option<bool>, Query, description = "Crop to a centered square"),
        ("isPixelated" = Option<bool>, Query, description = "Enable pixelation"),
        ("isMesh" = Option<bool>, Query, description = "Remap onto a palette mosaic"),
        ("isGradient" = Option<bool>, Query, description = "Blur and emit a gradient")
    ),
    responses(
        (status = 200, description = "Resized copy of the source", body = ImageResponse),
        (status = 400, description = "Missing or blank url"),
        (status = 502, description = "Source could not be fetched or decoded"),
        (status = 504, description = "Source did not answer in time")
    )
)]
/// Resize the source without filtering; only the boolean gates are read from the query.
pub async fn get_image(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize_over(&query, TransformParameters::uncropped(), true);
    run(&state, &query, params, EchoParams::No).await
}

#[utoipa::path(
    get,
    path = "/get/image/square",
    context_path = "/image-mesh/api",
    tag = "images",
    params(
        ("url" = String, Query, description = "Source image URL"),
        ("isSquare" = Option<bool>, Query, description = "Crop to a centered square"),
        ("isPixelated" = Option<bool>, Query, description = "Enable pixelation"),
        ("isMesh" = Option<bool>, Query, description = "Remap onto a palette mosaic"),
        ("isGradient" = Option<bool>, Query, description = "Blur and emit a gradient")
    ),
    responses(
        (status = 200, description = "Centered square crop", body = ImageResponse),
        (status = 400, description = "Missing or blank url")
    )
)]
/// Crop the source to a centered square and resize it; only the boolean gates are read.
pub async fn get_square(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize(&query, true);
    run(&state, &query, params, EchoParams::No).await
}

#[utoipa::path(
    get,
    path = "/get/image/pixelate",
    context_path = "/image-mesh/api",
    tag = "images",
    params(
        ("url" = String, Query, description = "Source image URL"),
        ("isSquare" = Option<bool>, Query, description = "Crop to a centered square"),
        ("isPixelated" = Option<bool>, Query, description = "Enable pixelation"),
        ("isMesh" = Option<bool>, Query, description = "Remap onto a palette mosaic"),
        ("isGradient" = Option<bool>, Query, description = "Blur and emit a gradient")
    ),
    responses(
        (status = 200, description = "Square crop pixelated with the default block count", body = ImageResponse),
        (status = 400, description = "Missing or blank url")
    )
)]
/// Square crop plus default pixelation; only the boolean gates are read.
pub async fn get_pixelated(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize_over(&query, TransformParameters::pixelated(), true);
    run(&state, &query, params, EchoParams::No).await
}

#[utoipa::path(
    get,
    path = "/get/image/edited",
    context_path = "/image-mesh/api",
    tag = "images",
    params(
        ("url" = String, Query, description = "Source image URL"),
        ("hue" = Option<f32>, Query, description = "Hue rotation, -100..100"),
        ("saturation" = Option<f32>, Query, description = "Saturation delta, -100..100"),
        ("brightness" = Option<f32>, Query, description = "Brightness delta, -100..100"),
        ("contrast" = Option<f32>, Query, description = "Contrast delta, -100..100"),
        ("glitch" = Option<f32>, Query, description = "Color corruption, 0..100"),
        ("pixelation" = Option<f32>, Query, description = "Pixelation divisor, 0..100"),
        ("isSquare" = Option<bool>, Query, description = "Crop to a centered square"),
        ("isPixelated" = Option<bool>, Query, description = "Enable pixelation"),
        ("isMesh" = Option<bool>, Query, description = "Remap onto a palette mosaic"),
        ("isGradient" = Option<bool>, Query, description = "Blur and emit a gradient")
    ),
    responses(
        (status = 200, description = "Filtered image", body = ImageResponse),
        (status = 400, description = "Missing or blank url"),
        (status = 422, description = "Palette too small for the requested synthesis")
    )
)]
/// Fully parameterized transform.
pub async fn get_edited(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize(&query, false);
    run(&state, &query, params, EchoParams::Yes).await
}

#[utoipa::path(
    get,
    path = "/get/image/pixelMesh",
    context_path = "/image-mesh/api",
    tag = "images",
    params(("url" = String, Query, description = "Source image URL")),
    responses(
        (status = 200, description = "Random palette mosaic", body = ImageResponse),
        (status = 400, description = "Missing or blank url"),
        (status = 422, description = "No opaque color to build a palette from")
    )
)]
/// Transform, then redraw as a mosaic of palette colors.
pub async fn get_pixel_mesh(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize(&query, false).with_mesh();
    run(&state, &query, params, EchoParams::Yes).await
}

#[utoipa::path(
    get,
    path = "/get/image/pixelGradient",
    context_path = "/image-mesh/api",
    tag = "images",
    params(("url" = String, Query, description = "Source image URL")),
    responses(
        (status = 200, description = "Blurred image plus gradient descriptor", body = ImageResponse),
        (status = 400, description = "Missing or blank url"),
        (status = 422, description = "Fewer than four palette colors")
    )
)]
/// Transform, blur and describe a four stop gradient.
pub async fn get_pixel_gradient(
    State(state): State<SharedState>,
    Query(query): RawQuery,
) -> Result<Json<ImageResponse>, AppError> {
    let params = TransformParameters::normalize(&query, false).with_gradient();
    run(&state, &query, params, EchoParams::Yes).await
}
