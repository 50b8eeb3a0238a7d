use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the room store and report whether the board is running degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.room_store().await else {
        warn!("room store unavailable (degraded mode)");
        return HealthResponse::degraded();
    };

    if let Err(err) = store.health_check().await {
        warn!(backend = store.backend_name(), error = %err, "room store health check failed");
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok(store.backend_name())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::AppConfig, dao::room_store::memory::MemoryRoomStore, state::AppState};

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, "degraded");

        state.set_room_store(Arc::new(MemoryRoomStore::new())).await;
        let health = health_status(&state).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.backend.as_deref(), Some("memory"));
    }
}
