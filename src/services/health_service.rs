use tokio::fs;
use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report `ok` while the serving directory exists, `degraded` otherwise.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let dir = state.store().dir();
    let usable = match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => true,
        Ok(_) => {
            warn!(dir = %dir.display(), "serving path is not a directory (degraded mode)");
            false
        }
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "serving directory unavailable (degraded mode)");
            false
        }
    };
    HealthResponse::from_serving_dir(usable)
}
