use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::{
    dao::{
        models::{ActivityEntity, RoomEntity},
        storage::{StorageError, StorageResult},
    },
    state::payload::UpdatePayload,
};

use super::{ActivityLog, RoomBackend, RoomStore, UpdateSink};

/// Process-local backend, used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryRoomStore {
    rooms: Arc<DashMap<String, RoomEntity>>,
    activity: Arc<RwLock<Vec<ActivityEntity>>>,
}

impl MemoryRoomStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `rooms`.
    pub fn with_rooms(rooms: impl IntoIterator<Item = RoomEntity>) -> Self {
        let store = Self::new();
        for room in rooms {
            store.rooms.insert(room.room_no.clone(), room);
        }
        store
    }
}

fn newest_first(entries: &mut [ActivityEntity]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

impl RoomStore for MemoryRoomStore {
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let rooms = self.rooms.clone();
        Box::pin(async move { Ok(rooms.iter().map(|entry| entry.value().clone()).collect()) })
    }

    fn find_room(&self, room_no: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let rooms = self.rooms.clone();
        Box::pin(async move { Ok(rooms.get(&room_no).map(|entry| entry.value().clone())) })
    }

    fn replace_rooms(&self, replacement: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let rooms = self.rooms.clone();
        Box::pin(async move {
            rooms.clear();
            for room in replacement {
                rooms.insert(room.room_no.clone(), room);
            }
            Ok(())
        })
    }
}

impl UpdateSink for MemoryRoomStore {
    fn apply_update(
        &self,
        room_no: String,
        payload: UpdatePayload,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let rooms = self.rooms.clone();
        Box::pin(async move {
            let mut entry = rooms
                .get_mut(&room_no)
                .ok_or_else(|| StorageError::rejected(format!("room {room_no} does not exist")))?;
            entry.apply_update(&payload);
            Ok(())
        })
    }
}

impl ActivityLog for MemoryRoomStore {
    fn append_activity(&self, entry: ActivityEntity) -> BoxFuture<'static, StorageResult<()>> {
        let activity = self.activity.clone();
        Box::pin(async move {
            activity.write().await.push(entry);
            Ok(())
        })
    }

    fn list_activity_since(
        &self,
        since: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let activity = self.activity.clone();
        Box::pin(async move {
            let mut entries: Vec<_> = activity
                .read()
                .await
                .iter()
                .filter(|entry| entry.timestamp >= since)
                .cloned()
                .collect();
            newest_first(&mut entries);
            Ok(entries)
        })
    }

    fn list_room_activity(
        &self,
        room_no: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        let activity = self.activity.clone();
        Box::pin(async move {
            let mut entries: Vec<_> = activity
                .read()
                .await
                .iter()
                .filter(|entry| entry.room_no == room_no)
                .cloned()
                .collect();
            newest_first(&mut entries);
            entries.truncate(limit);
            Ok(entries)
        })
    }

    fn clear_activity(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let activity = self.activity.clone();
        Box::pin(async move {
            let mut guard = activity.write().await;
            let removed = guard.len() as u64;
            guard.clear();
            Ok(removed)
        })
    }
}

impl RoomBackend for MemoryRoomStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use uuid::Uuid;

    use super::*;
    use crate::state::{
        activity::ActivityCategory,
        payload::GuestRecord,
        staff::Department,
        status::{BaseStatus, CompositeStatus},
    };

    fn room(no: &str) -> RoomEntity {
        RoomEntity {
            room_no: no.into(),
            room_type: "DLX".into(),
            room_status: CompositeStatus::plain(BaseStatus::Od),
            current_guest: GuestRecord::empty(),
            new_guest: GuestRecord::empty(),
            notes: String::new(),
            updated_at: SystemTime::UNIX_EPOCH,
        }
    }

    fn entry(room_no: &str, timestamp: SystemTime) -> ActivityEntity {
        ActivityEntity {
            id: Uuid::new_v4(),
            timestamp,
            staff_name: "Mai".into(),
            department: Department::Hk,
            room_no: room_no.into(),
            category: ActivityCategory::OccupiedCleaning,
            old_status: Some(CompositeStatus::plain(BaseStatus::Od)),
            new_status: Some(CompositeStatus::plain(BaseStatus::Oc)),
            detail: None,
        }
    }

    #[tokio::test]
    async fn update_requires_existing_room() {
        let store = MemoryRoomStore::with_rooms([room("101")]);
        let payload = UpdatePayload {
            room_status: CompositeStatus::plain(BaseStatus::Oc),
            notes: "done".into(),
            current_guest: GuestRecord::empty(),
            new_guest: GuestRecord::empty(),
        };

        store
            .apply_update("101".into(), payload.clone())
            .await
            .unwrap();
        let saved = store.find_room("101".into()).await.unwrap().unwrap();
        assert_eq!(saved.room_status, CompositeStatus::plain(BaseStatus::Oc));
        assert_eq!(saved.notes, "done");
        assert_eq!(saved.room_type, "DLX");

        let err = store.apply_update("999".into(), payload).await.unwrap_err();
        assert!(matches!(err, StorageError::Rejected { .. }));
    }

    #[tokio::test]
    async fn activity_queries_are_newest_first() {
        let store = MemoryRoomStore::new();
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        for (offset, room_no) in [(0, "101"), (10, "102"), (20, "101"), (30, "101")] {
            store
                .append_activity(entry(room_no, base + Duration::from_secs(offset)))
                .await
                .unwrap();
        }

        let since = store
            .list_activity_since(base + Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(since.len(), 3);
        assert!(since.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));

        let history = store.list_room_activity("101".into(), 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, base + Duration::from_secs(30));

        assert_eq!(store.clear_activity().await.unwrap(), 4);
        assert!(store.list_room_activity("101".into(), 10).await.unwrap().is_empty());
    }
}
