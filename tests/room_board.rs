use std::{
    collections::HashSet,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use futures::future::BoxFuture;
use room_board_back::{
    config::AppConfig,
    dao::{
        models::{ActivityEntity, RoomEntity},
        room_store::{ActivityLog, RoomBackend, RoomStore, UpdateSink, memory::MemoryRoomStore},
        storage::{StorageError, StorageResult},
    },
    dto::{
        report::ClearActivityRequest,
        room::{BulkEditRequest, BulkOutcome, GuestEffect, RefreshRequest, TransitionRequest},
        staff::StaffInput,
    },
    error::ServiceError,
    services::{bulk_service, report_service, room_service},
    state::{
        AppState, SharedState,
        activity::ActivityCategory,
        payload::UpdatePayload,
        room::{Guest, GuestSlot, Room},
        staff::Department,
        status::{BaseStatus, CompositeStatus},
    },
};

fn status(text: &str) -> CompositeStatus {
    text.parse().unwrap()
}

fn guest(name: &str, pax: u32) -> GuestSlot {
    GuestSlot::from_guest(Guest {
        name: name.into(),
        check_in: "01-06-25".into(),
        check_out: "04-06-25".into(),
        pax,
    })
}

fn staff(name: &str, department: Department) -> StaffInput {
    StaffInput {
        name: name.into(),
        department,
    }
}

fn hotel_rooms() -> Vec<RoomEntity> {
    [
        Room::new("101", status("od")).with_current_guest(guest("Nguyen", 2)),
        Room::new("102", status("vd")),
        Room::new("103", status("vd")),
        Room::new("205", status("vc/arr")).with_new_guest(guest("Tran", 1)),
    ]
    .iter()
    .map(RoomEntity::from)
    .collect()
}

async fn board_with(store: Arc<dyn RoomBackend>, config: AppConfig) -> SharedState {
    let state = AppState::new(config);
    state.set_room_store(store).await;
    state
}

/// Activity is appended in the background; give the spawned task a chance to run.
async fn wait_for_activity(store: &MemoryRoomStore, expected: usize) -> Vec<ActivityEntity> {
    for _ in 0..200 {
        let entries = store.list_activity_since(UNIX_EPOCH).await.unwrap();
        if entries.len() >= expected {
            return entries;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {expected} activity entries");
}

/// Backend refusing payloads for a fixed set of rooms.
#[derive(Clone)]
struct RefusingSink {
    inner: MemoryRoomStore,
    refused: Arc<HashSet<String>>,
}

impl RoomStore for RefusingSink {
    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        self.inner.list_rooms()
    }

    fn find_room(&self, room_no: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        self.inner.find_room(room_no)
    }

    fn replace_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.replace_rooms(rooms)
    }
}

impl UpdateSink for RefusingSink {
    fn apply_update(
        &self,
        room_no: String,
        payload: UpdatePayload,
    ) -> BoxFuture<'static, StorageResult<()>> {
        if self.refused.contains(&room_no) {
            return Box::pin(async move {
                Err(StorageError::rejected(format!("room {room_no} is locked upstream")))
            });
        }
        self.inner.apply_update(room_no, payload)
    }
}

impl ActivityLog for RefusingSink {
    fn append_activity(&self, entry: ActivityEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.append_activity(entry)
    }

    fn list_activity_since(
        &self,
        since: SystemTime,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        self.inner.list_activity_since(since)
    }

    fn list_room_activity(
        &self,
        room_no: String,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ActivityEntity>>> {
        self.inner.list_room_activity(room_no, limit)
    }

    fn clear_activity(&self) -> BoxFuture<'static, StorageResult<u64>> {
        self.inner.clear_activity()
    }
}

impl RoomBackend for RefusingSink {
    fn backend_name(&self) -> &'static str {
        "refusing"
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.try_reconnect()
    }
}

#[tokio::test]
async fn occupied_cleaning_is_saved_broadcast_and_reported() {
    let store = MemoryRoomStore::with_rooms(hotel_rooms());
    let state = board_with(Arc::new(store.clone()), AppConfig::default()).await;
    let mut board = state.rooms_sse().subscribe();

    let response = room_service::transition_room(
        &state,
        "101",
        TransitionRequest {
            staff: staff("Hoa", Department::Hk),
            to: BaseStatus::Oc,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.from, status("od"));
    assert_eq!(response.to, status("oc"));
    assert_eq!(response.guest_effect, GuestEffect::None);
    assert_eq!(
        response.room.current_guest.as_ref().map(|g| g.name.as_str()),
        Some("Nguyen")
    );

    let saved = store.find_room("101".into()).await.unwrap().unwrap();
    assert_eq!(saved.room_status, status("oc"));
    assert_eq!(saved.current_guest.name, "Nguyen");

    let event = board.recv().await.unwrap();
    assert_eq!(event.event.as_deref(), Some("room.updated"));
    assert!(event.data.contains(r#""roomNo":"101""#));

    let entries = wait_for_activity(&store, 1).await;
    assert_eq!(entries[0].category, ActivityCategory::OccupiedCleaning);
    assert_eq!(entries[0].staff_name, "Hoa");

    let report = report_service::activity_report(&state).await.unwrap();
    assert_eq!(report.statistics.total_actions, 1);
    assert_eq!(
        report.statistics.by_category[&ActivityCategory::OccupiedCleaning],
        1
    );
    assert_eq!(report.statistics.by_staff[0].staff_name, "Hoa");
}

#[tokio::test]
async fn inspection_checks_the_expected_guest_in() {
    let store = MemoryRoomStore::with_rooms(hotel_rooms());
    let state = board_with(Arc::new(store.clone()), AppConfig::default()).await;

    let response = room_service::transition_room(
        &state,
        "205",
        TransitionRequest {
            staff: staff("Lan", Department::Fo),
            to: BaseStatus::Ip,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.to, status("ip"));
    assert_eq!(response.guest_effect, GuestEffect::Promoted);
    assert!(response.room.new_guest.is_none());
    assert_eq!(response.room.current_guest.as_ref().map(|g| g.pax), Some(1));

    let saved = store.find_room("205".into()).await.unwrap().unwrap();
    assert_eq!(saved.current_guest.name, "Tran");
    assert_eq!(saved.new_guest.name, "");
    assert!(store.list_activity_since(UNIX_EPOCH).await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_edit_survives_a_refusing_sink() {
    let inner = MemoryRoomStore::with_rooms(hotel_rooms());
    let backend = RefusingSink {
        inner: inner.clone(),
        refused: Arc::new(HashSet::from(["102".to_owned()])),
    };
    let state = board_with(Arc::new(backend), AppConfig::default()).await;

    let response = bulk_service::bulk_edit(
        &state,
        BulkEditRequest {
            staff: staff("Quang", Department::Hk),
            room_numbers: vec!["102".into(), "103".into()],
            status: Some(BaseStatus::Vc),
            arrival: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.updated, 1);
    assert_eq!(response.failed, 1);
    assert_eq!(response.results[0].outcome, BulkOutcome::Failed);
    assert_eq!(response.results[1].outcome, BulkOutcome::Updated);

    let refused = inner.find_room("102".into()).await.unwrap().unwrap();
    assert_eq!(refused.room_status, status("vd"));
    let cleaned = inner.find_room("103".into()).await.unwrap().unwrap();
    assert_eq!(cleaned.room_status, status("vc"));

    let entries = wait_for_activity(&inner, 1).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].room_no, "103");
}

#[tokio::test]
async fn sink_failure_is_surfaced_on_single_room_change() {
    let inner = MemoryRoomStore::with_rooms(hotel_rooms());
    let backend = RefusingSink {
        inner: inner.clone(),
        refused: Arc::new(HashSet::from(["102".to_owned()])),
    };
    let state = board_with(Arc::new(backend), AppConfig::default()).await;

    let err = room_service::transition_room(
        &state,
        "102",
        TransitionRequest {
            staff: staff("Quang", Department::Hk),
            to: BaseStatus::Vc,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::SinkFailure { ref room_no, .. } if room_no == "102"));
    // The claim is released with the failed request.
    assert!(!state.edit_sessions().is_claimed("102"));
}

#[tokio::test]
async fn front_office_refreshes_and_clears() {
    let dir = std::env::temp_dir().join(format!("room-board-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let seed_path = dir.join("rooms.json");
    tokio::fs::write(
        &seed_path,
        r#"[{"roomNo": "301", "status": "VD"}, {"roomNo": "302", "status": "OC"}]"#,
    )
    .await
    .unwrap();

    let store = MemoryRoomStore::with_rooms(hotel_rooms());
    let config = AppConfig {
        seed_path: seed_path.clone(),
        ..AppConfig::default()
    };
    let state = board_with(Arc::new(store.clone()), config).await;

    let forbidden = room_service::refresh_from_source(
        &state,
        RefreshRequest {
            staff: staff("Hoa", Department::Hk),
        },
    )
    .await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden(_))));

    let refreshed = room_service::refresh_from_source(
        &state,
        RefreshRequest {
            staff: staff("Lan", Department::Fo),
        },
    )
    .await
    .unwrap();
    assert_eq!(refreshed.rooms, 2);

    let listing = room_service::list_rooms(&state, None).await.unwrap();
    let numbers: Vec<_> = listing.rooms.iter().map(|room| room.room_no.as_str()).collect();
    assert_eq!(numbers, vec!["301", "302"]);
    assert_eq!(listing.counters.occupied, 1);

    store
        .append_activity(ActivityEntity {
            id: uuid::Uuid::new_v4(),
            timestamp: SystemTime::now(),
            staff_name: "Hoa".into(),
            department: Department::Hk,
            room_no: "301".into(),
            category: ActivityCategory::VacantCleaning,
            old_status: Some(status("vd")),
            new_status: Some(status("vc")),
            detail: None,
        })
        .await
        .unwrap();
    let cleared = report_service::clear_activity(
        &state,
        ClearActivityRequest {
            staff: staff("Lan", Department::Fo),
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.removed, 1);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
