use axum::Router;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Serve the Swagger UI with the API paths documented under the configured prefix.
pub fn router(api_prefix: &str) -> Router<SharedState> {
    SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::for_prefix(api_prefix))
        .into()
}
