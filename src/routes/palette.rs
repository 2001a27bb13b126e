use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::image::PaletteResponse, error::AppError, services::palette_service, state::SharedState,
};

/// Palette extraction endpoints; both paths answer the same payload.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/get/palette", get(get_palette))
        .route("/get/gradient", get(get_gradient))
}

#[utoipa::path(
    get,
    path = "/get/palette",
    context_path = "/image-mesh/api",
    tag = "palette",
    params(("url" = String, Query, description = "Source image URL")),
    responses(
        (status = 200, description = "Dominant colors of the source", body = PaletteResponse),
        (status = 400, description = "Missing or blank url"),
        (status = 422, description = "Fewer than four distinct colors")
    )
)]
/// Extract the dominant colors of the source image.
pub async fn get_palette(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<PaletteResponse>, AppError> {
    let url = query.get("url").map(String::as_str);
    let payload = palette_service::extract(&state, url).await?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/get/gradient",
    context_path = "/image-mesh/api",
    tag = "palette",
    params(("url" = String, Query, description = "Source image URL")),
    responses((status = 200, description = "Dominant colors and CSS gradient", body = PaletteResponse))
)]
/// Same as [`get_palette`], kept for clients that ask for the gradient by name.
pub async fn get_gradient(
    state: State<SharedState>,
    query: Query<HashMap<String, String>>,
) -> Result<Json<PaletteResponse>, AppError> {
    get_palette(state, query).await
}
