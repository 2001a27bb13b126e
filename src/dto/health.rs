use serde::Serialize;
use utoipa::ToSchema;

/// Whether generated files can currently be stored and served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The serving directory is usable.
    Ok,
    /// The serving directory is missing or not a directory.
    Degraded,
}

/// Payload of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Map the serving directory check onto a response.
    pub fn from_serving_dir(usable: bool) -> Self {
        let status = if usable {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self { status }
    }
}
