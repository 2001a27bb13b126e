use axum::{Json, Router, extract::State, routing::get};
use tower_http::services::ServeDir;

use crate::{dto::image::MessageResponse, state::SharedState};

/// Swagger UI and OpenAPI JSON.
pub mod docs;
/// Health check.
pub mod health;
/// Image generation presets.
pub mod image;
/// Palette extraction.
pub mod palette;
/// Parameter presets.
pub mod params;

/// Compose all route trees, wiring in shared state, documentation and the static file fallback.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = Router::new()
        .route("/", get(welcome))
        .merge(params::router())
        .merge(image::router())
        .merge(palette::router());

    let docs_router = docs::router(&state.config().api_prefix);
    let public_files = ServeDir::new(state.store().dir());

    Router::new()
        .route("/", get(welcome))
        .nest(&state.config().api_prefix, api_router)
        .merge(health::router())
        .merge(docs_router)
        .fallback_service(public_files)
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Where the API lives", body = MessageResponse))
)]
/// Point callers at the API prefix.
pub async fn welcome(State(state): State<SharedState>) -> Json<MessageResponse> {
    Json(MessageResponse::new(state.config().welcome_message()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        dao::source::ImageSource,
        test_support::{StubSource, quadrants, state_in},
    };

    async fn send(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app_with(dir: &std::path::Path, source: Arc<dyn ImageSource>) -> Router {
        router(state_in(dir, source))
    }

    #[tokio::test]
    async fn welcome_is_served_at_root_and_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::missing());

        for uri in ["/", "/image-mesh/api"] {
            let response = send(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            let body = json(response).await;
            assert!(
                body["message"]
                    .as_str()
                    .unwrap()
                    .contains("/image-mesh/api/get/params")
            );
        }
    }

    #[tokio::test]
    async fn params_endpoints_expose_both_presets() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::missing());

        let standard = json(send(app.clone(), "/image-mesh/api/get/params").await).await;
        assert_eq!(standard["hue"], 5.0);
        assert_eq!(standard["isPixelated"], true);

        let neutral = json(send(app, "/image-mesh/api/get/params/default").await).await;
        assert_eq!(neutral["contrast"], 0.0);
        assert_eq!(neutral["isPixelated"], false);
    }

    #[tokio::test]
    async fn missing_url_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::image(quadrants()));

        let response = send(app, "/image-mesh/api/get/image/edited?hue=10").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json(response).await["message"], "url is not valid");
    }

    #[tokio::test]
    async fn generated_file_is_served_statically() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::image(quadrants()));

        let response = send(
            app.clone(),
            "/image-mesh/api/get/image/edited?url=http://img/a.png&pixelation=8",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["params"]["pixelation"], 8.0);
        let src = body["src"].as_str().unwrap().to_owned();

        let served = send(app, &src).await;
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(served.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn preset_responses_omit_params() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::image(quadrants()));

        let body = json(send(app, "/image-mesh/api/get/image/pixelate?url=x").await).await;
        assert!(body.get("params").is_none());
        assert!(body["file"].as_str().unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn preset_endpoints_read_boolean_gates() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::image(quadrants()));

        let square = json(send(app.clone(), "/image-mesh/api/get/image/square?url=x").await).await;
        let uncropped = json(
            send(app, "/image-mesh/api/get/image/square?url=x&isSquare=false&hue=90").await,
        )
        .await;

        let dimensions = |body: &Value| {
            let file = body["file"].as_str().unwrap();
            ::image::image_dimensions(dir.path().join(file)).unwrap()
        };
        assert_eq!(dimensions(&square), (256, 256));
        assert_eq!(dimensions(&uncropped), (341, 256));
    }

    #[tokio::test]
    async fn gradient_endpoint_returns_palette_fields() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::image(quadrants()));

        let body = json(send(app, "/image-mesh/api/get/image/pixelGradient?url=x").await).await;

        assert_eq!(body["params"]["isGradient"], true);
        assert_eq!(body["params"]["isPixelated"], false);
        assert!(body["gradientStyle"].as_str().unwrap().starts_with("linear-gradient(90deg"));
        assert_eq!(body["gradient"]["stops"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn upstream_failures_map_to_gateway_statuses() {
        let dir = tempfile::tempdir().unwrap();

        let slow = app_with(dir.path(), StubSource::slow());
        let response = send(slow, "/image-mesh/api/get/palette?url=x").await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let missing = app_with(dir.path(), StubSource::missing());
        let response = send(missing, "/image-mesh/api/get/image/square?url=x").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), StubSource::missing());

        let body = json(send(app, "/healthcheck").await).await;
        assert_eq!(body["status"], "ok");
    }
}
