#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;

use crate::{
    dao::{
        models::{ActivityEntity, RoomEntity},
        storage::StorageResult,
    },
    state::payload::UpdatePayload,
};

/// Source of room snapshots.
pub trait RoomStore: Send + Sync {
    /// Every room currently known.
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>>;
    /// A single room by number.
    fn find_room(&self, room_no: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>>;
    /// Replace the whole snapshot with `rooms`.
    fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>>;
}

/// Destination of engine payloads. Writes are never retried by callers.
pub trait UpdateSink: Send + Sync {
    /// Persist `payload` on the existing room `room_no`.
    fn apply_update(
        &self,
        room_no: String,
        payload: UpdatePayload,
    ) -> BoxFuture<'static, StorageResult<()>>;
}

/// Append-only record of noteworthy actions.
pub trait ActivityLog: Send + Sync {
    /// Record one entry.
    fn append_activity(&self, entry: ActivityEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Entries at or after `since`, newest first.
    fn list_activity_since(
        &self,
        since: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>>;
    /// Latest `limit` entries of one room, newest first.
    fn list_room_activity(
        &self,
        room_no: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>>;
    /// Delete every entry, returning how many were removed.
    fn clear_activity(&self) -> BoxFuture<'static, StorageResult<u64>>;
}

/// Complete storage backend installed in the application state.
pub trait RoomBackend: RoomStore + UpdateSink + ActivityLog {
    /// Short backend name reported by the health check.
    fn backend_name(&self) -> &'static str;
    /// Check that the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
