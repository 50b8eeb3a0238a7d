//! Room status engine and the shared application state.

pub mod activity;
pub mod counters;
pub mod payload;
pub mod room;
pub mod session;
mod sse;
pub mod staff;
pub mod status;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::room_store::RoomBackend, dto::sse::SystemStatus, error::ServiceError,
};

pub use self::session::{EditSessions, RoomBusy, RoomClaim};
pub use self::sse::SseHub;
pub use self::status::EngineError;

/// Shared handle passed to every handler and service.
pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 64;
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Central application state: storage handle, live board stream and edit sessions.
pub struct AppState {
    room_store: RwLock<Option<Arc<dyn RoomBackend>>>,
    sse: SseHub,
    sessions: EditSessions,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            room_store: RwLock::new(None),
            sse: SseHub::new(SSE_CAPACITY),
            sessions: EditSessions::new(),
            config,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current room store, if one is installed.
    pub async fn room_store(&self) -> Option<Arc<dyn RoomBackend>> {
        self.room_store.read().await.as_ref().cloned()
    }

    /// Current room store, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_room_store(&self) -> Result<Arc<dyn RoomBackend>, ServiceError> {
        self.room_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a room store and leave degraded mode.
    pub async fn set_room_store(&self, store: Arc<dyn RoomBackend>) {
        {
            let mut guard = self.room_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the room store and enter degraded mode.
    pub async fn clear_room_store(&self) {
        {
            let mut guard = self.room_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, telling connected boards when it flips.
    pub async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        self.degraded.send_replace(value);
        self.sse
            .publish(EVENT_SYSTEM_STATUS, &SystemStatus { degraded: value });
    }

    /// Broadcast hub feeding the room board SSE stream.
    pub fn rooms_sse(&self) -> &SseHub {
        &self.sse
    }

    /// Registry of rooms currently held by an editing context.
    pub fn edit_sessions(&self) -> &EditSessions {
        &self.sessions
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
