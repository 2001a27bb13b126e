use axum::{Json, Router, routing::get};

use crate::{imaging::params::TransformParameters, state::SharedState};

/// Parameter discovery endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/get/params", get(get_params))
        .route("/get/params/default", get(get_default_params))
}

#[utoipa::path(
    get,
    path = "/get/params",
    context_path = "/image-mesh/api",
    tag = "params",
    responses((status = 200, description = "Standard filter parameters", body = TransformParameters))
)]
/// Return the parameters `/get/image/edited` falls back to.
pub async fn get_params() -> Json<TransformParameters> {
    Json(TransformParameters::standard())
}

#[utoipa::path(
    get,
    path = "/get/params/default",
    context_path = "/image-mesh/api",
    tag = "params",
    responses((status = 200, description = "Pass-through parameters", body = TransformParameters))
)]
/// Return the all-neutral parameters.
pub async fn get_default_params() -> Json<TransformParameters> {
    Json(TransformParameters::neutral())
}
