use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Room store backend in use, absent while degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl HealthResponse {
    /// The room store is installed and answering.
    pub fn ok(backend: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            backend: Some(backend.into()),
        }
    }

    /// No room store is available.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            backend: None,
        }
    }
}
