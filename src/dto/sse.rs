use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::room::RoomView;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Serialise `payload` into the data field of an event named `event`.
    pub fn json<T>(event: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            event: Some(event.to_owned()),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// First event sent to a board when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Whether the backend is running without a room store.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast after a room was saved.
pub struct RoomUpdatedEvent {
    pub room: RoomView,
    /// Name of the staff member who made the change.
    pub staff_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after the whole room list was reloaded; boards refetch.
pub struct RoomsRefreshedEvent {
    pub count: usize,
}
