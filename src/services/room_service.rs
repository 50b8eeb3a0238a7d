use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dao::{
        models::ActivityEntity,
        room_store::{RoomBackend, RoomStore, UpdateSink},
        seed,
    },
    dto::room::{
        FloorView, GuestEffect, RefreshRequest, RefreshResponse, RoomEditRequest,
        RoomEditResponse, RoomListResponse, RoomView, StatusCount, TransitionRequest,
        TransitionResponse,
    },
    error::ServiceError,
    services::{activity_service, sse_events},
    state::{
        SharedState,
        counters::{self, RoomFilter},
        payload::{GuestRecord, build_update},
        room::{ArrivalChange, Room},
        staff::Staff,
        status::{BaseStatus, can_transition},
    },
};

/// Rooms in `filter` (every room when `None`) with the counters of the whole hotel.
pub async fn list_rooms(
    state: &SharedState,
    filter: Option<RoomFilter>,
) -> Result<RoomListResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let rooms = load_rooms(&store).await?;
    let filter = filter.unwrap_or(RoomFilter::All);

    Ok(RoomListResponse {
        filter,
        counters: counters::compute_counters(&rooms),
        rooms: counters::filter_rooms(&rooms, filter)
            .into_iter()
            .map(RoomView::from)
            .collect(),
    })
}

/// Rooms grouped by floor, floors and rooms in board order.
pub async fn rooms_by_floor(state: &SharedState) -> Result<Vec<FloorView>, ServiceError> {
    let store = state.require_room_store().await?;
    let rooms = load_rooms(&store).await?;

    Ok(counters::group_by_floor(&rooms)
        .into_iter()
        .map(|(floor, rooms)| FloorView {
            floor,
            rooms: rooms.into_iter().map(RoomView::from).collect(),
        })
        .collect())
}

/// Number of rooms per composite status present on the board.
pub async fn status_statistics(state: &SharedState) -> Result<Vec<StatusCount>, ServiceError> {
    let store = state.require_room_store().await?;
    let rooms = load_rooms(&store).await?;

    Ok(counters::status_statistics(&rooms)
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect())
}

/// A single room with the statuses it may move to.
pub async fn get_room(state: &SharedState, room_no: &str) -> Result<RoomView, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_no).await?;
    Ok(RoomView::from(&room))
}

/// Quick status change of one room.
pub async fn transition_room(
    state: &SharedState,
    room_no: &str,
    request: TransitionRequest,
) -> Result<TransitionResponse, ServiceError> {
    let staff: Staff = request.staff.into();
    let store = state.require_room_store().await?;
    let _claim = state.edit_sessions().claim(room_no)?;

    let mut room = load_room(&store, room_no).await?;
    require_transition(&staff, &room, request.to)?;
    let outcome = room.transition(request.to)?;
    let entries =
        activity_service::status_change_entry(&staff, room_no, outcome.from, outcome.to)
            .into_iter()
            .collect();
    commit(state, &store, &staff, &room, entries).await?;

    info!(
        room_no,
        staff = %staff.name,
        from = %outcome.from,
        to = %outcome.to,
        promoted = outcome.promoted,
        "room status changed"
    );

    Ok(TransitionResponse {
        from: outcome.from,
        to: outcome.to,
        guest_effect: GuestEffect::from(&outcome),
        room: RoomView::from(&room),
    })
}

/// Full edit of one room: status steps, arrival flag, guests and notes.
///
/// Steps run in order and a refused step aborts the edit without saving anything.
/// Guest data the resulting status cannot hold is dropped and reported as a notice.
pub async fn edit_room(
    state: &SharedState,
    room_no: &str,
    request: RoomEditRequest,
) -> Result<RoomEditResponse, ServiceError> {
    let staff: Staff = request.staff.into();
    let store = state.require_room_store().await?;
    let _claim = state.edit_sessions().claim(room_no)?;

    let original = load_room(&store, room_no).await?;
    let mut room = original.clone();
    let mut entries = Vec::new();
    let mut notices = Vec::new();

    for step in request.steps {
        if step == room.status().base() {
            continue;
        }
        require_transition(&staff, &room, step)?;
        let outcome = room.transition(step)?;
        entries.extend(activity_service::status_change_entry(
            &staff,
            room_no,
            outcome.from,
            outcome.to,
        ));
    }

    if let Some(arrival) = request.arrival
        && room.set_arrival(arrival) == ArrivalChange::Refused
    {
        notices.push(arrival_refused_notice(room.status().base()));
    }
    if let Some(guest) = request.current_guest
        && !room.set_current_guest(GuestRecord::from(guest).into())
    {
        notices.push(format!(
            "current guest ignored: room is {}",
            room.status().base().label()
        ));
    }
    if let Some(guest) = request.new_guest
        && !room.set_new_guest(GuestRecord::from(guest).into())
    {
        notices.push("expected guest ignored: no arrival flagged".to_owned());
    }
    if let Some(notes) = request.notes {
        let previous = room.notes().to_owned();
        if room.set_notes(notes.trim()) {
            entries.push(activity_service::note_change_entry(
                &staff,
                room_no,
                &previous,
                room.notes(),
            ));
        }
    }

    let changed = room != original;
    if changed {
        commit(state, &store, &staff, &room, entries).await?;
        info!(
            room_no,
            staff = %staff.name,
            status = %room.status(),
            notices = notices.len(),
            "room edited"
        );
    }

    Ok(RoomEditResponse {
        changed,
        room: RoomView::from(&room),
        notices,
    })
}

/// Reload the room list from the seed source, replacing every stored room.
pub async fn refresh_from_source(
    state: &SharedState,
    request: RefreshRequest,
) -> Result<RefreshResponse, ServiceError> {
    let staff: Staff = request.staff.into();
    require_manager(&staff, "refresh the room list")?;
    let store = state.require_room_store().await?;

    let path = &state.config().seed_path;
    let rooms = seed::load_rooms(path).await?;
    let count = rooms.len();
    store.replace_rooms(rooms).await?;

    info!(count, staff = %staff.name, path = %path.display(), "room list refreshed");
    sse_events::broadcast_rooms_refreshed(state, count);
    Ok(RefreshResponse { rooms: count })
}

/// Refuse `action` unless the staff member's department may manage the board.
pub(crate) fn require_manager(staff: &Staff, action: &str) -> Result<(), ServiceError> {
    if staff.department.can_manage() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "{} staff may not {action}",
            staff.department.as_str()
        )))
    }
}

/// Refuse a table transition the staff member's department may not perform.
///
/// Transitions outside the table are left to the engine.
pub(crate) fn require_transition(
    staff: &Staff,
    room: &Room,
    to: BaseStatus,
) -> Result<(), ServiceError> {
    let from = room.status().base();
    if can_transition(from, to) && !staff.department.allows(from, to) {
        return Err(ServiceError::Forbidden(format!(
            "{} staff may not move room {} from {} to {}",
            staff.department.as_str(),
            room.room_no(),
            from.label(),
            to.label()
        )));
    }
    Ok(())
}

pub(crate) fn arrival_refused_notice(base: BaseStatus) -> String {
    format!("arrival flag not allowed on {}", base.label())
}

pub(crate) async fn load_rooms(store: &Arc<dyn RoomBackend>) -> Result<Vec<Room>, ServiceError> {
    Ok(store
        .list_rooms()
        .await?
        .into_iter()
        .map(Room::from)
        .collect())
}

pub(crate) async fn load_room(
    store: &Arc<dyn RoomBackend>,
    room_no: &str,
) -> Result<Room, ServiceError> {
    store
        .find_room(room_no.to_owned())
        .await?
        .map(Room::from)
        .ok_or_else(|| ServiceError::NotFound(format!("room {room_no}")))
}

/// Send the room payload to the update sink, then log activity and notify boards.
///
/// Nothing is logged or broadcast when the sink refuses the payload.
pub(crate) async fn commit(
    state: &SharedState,
    store: &Arc<dyn RoomBackend>,
    staff: &Staff,
    room: &Room,
    entries: Vec<ActivityEntity>,
) -> Result<(), ServiceError> {
    let room_no = room.room_no().to_owned();
    if let Err(source) = store.apply_update(room_no.clone(), build_update(room)).await {
        warn!(room_no = %room_no, error = %source, "update sink refused room payload");
        return Err(ServiceError::SinkFailure { room_no, source });
    }

    activity_service::record(store.clone(), entries);
    sse_events::broadcast_room_updated(state, room, staff);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::{models::RoomEntity, room_store::memory::MemoryRoomStore},
        dto::{room::GuestInput, staff::StaffInput},
        state::{AppState, room::GuestSlot, staff::Department, status::CompositeStatus},
    };

    fn staff(department: Department) -> StaffInput {
        StaffInput {
            name: "Thu".into(),
            department,
        }
    }

    async fn state_with(rooms: Vec<Room>) -> SharedState {
        let state = AppState::new(AppConfig::default());
        let store = MemoryRoomStore::with_rooms(rooms.iter().map(RoomEntity::from));
        state.set_room_store(Arc::new(store)).await;
        state
    }

    fn status(text: &str) -> CompositeStatus {
        text.parse().unwrap()
    }

    #[tokio::test]
    async fn degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            list_rooms(&state, None).await,
            Err(ServiceError::Degraded)
        ));
    }

    #[tokio::test]
    async fn list_filters_rooms_but_counts_everything() {
        let state = state_with(vec![
            Room::new("101", status("od")),
            Room::new("102", status("vc/arr")),
            Room::new("201", status("do")),
        ])
        .await;

        let response = list_rooms(&state, Some(RoomFilter::Arrival)).await.unwrap();
        assert_eq!(response.counters.all, 3);
        assert_eq!(response.counters.not_cleaned, 2);
        let numbers: Vec<_> = response.rooms.iter().map(|room| room.room_no.as_str()).collect();
        assert_eq!(numbers, vec!["102"]);
    }

    #[tokio::test]
    async fn refused_transition_leaves_room_untouched() {
        let state = state_with(vec![Room::new("101", status("od"))]).await;
        let request = TransitionRequest {
            staff: staff(Department::Hk),
            to: BaseStatus::Vc,
        };

        let err = transition_room(&state, "101", request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(_)));
        assert_eq!(get_room(&state, "101").await.unwrap().status, status("od"));
    }

    #[tokio::test]
    async fn missing_room_is_not_found() {
        let state = state_with(Vec::new()).await;
        let request = TransitionRequest {
            staff: staff(Department::Hk),
            to: BaseStatus::Vc,
        };
        assert!(matches!(
            transition_room(&state, "999", request).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn claimed_room_is_busy() {
        let state = state_with(vec![Room::new("101", status("vd"))]).await;
        let _claim = state.edit_sessions().claim("101").unwrap();
        let request = TransitionRequest {
            staff: staff(Department::Hk),
            to: BaseStatus::Vc,
        };
        assert!(matches!(
            transition_room(&state, "101", request).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn edit_reports_ignored_guest_data() {
        let state = state_with(vec![Room::new("305", status("vd"))]).await;
        let request = RoomEditRequest {
            staff: staff(Department::Fo),
            steps: vec![BaseStatus::Vc],
            arrival: Some(true),
            current_guest: Some(GuestInput {
                name: "Walk-in".into(),
                ..GuestInput::default()
            }),
            new_guest: Some(GuestInput {
                name: "Minh".into(),
                pax: 2,
                ..GuestInput::default()
            }),
            notes: Some(" late arrival ".into()),
        };

        let response = edit_room(&state, "305", request).await.unwrap();
        assert!(response.changed);
        assert_eq!(response.room.status, status("vc/arr"));
        assert!(response.room.current_guest.is_none());
        assert_eq!(response.room.new_guest.as_ref().map(|g| g.pax), Some(2));
        assert_eq!(response.room.notes, "late arrival");
        assert_eq!(response.notices, vec!["current guest ignored: room is Vacant Clean"]);
    }

    #[tokio::test]
    async fn failed_step_saves_nothing() {
        let state = state_with(vec![Room::new("101", status("od"))]).await;
        let request = RoomEditRequest {
            staff: staff(Department::Hk),
            steps: vec![BaseStatus::Oc, BaseStatus::Vd],
            arrival: None,
            current_guest: None,
            new_guest: None,
            notes: Some("should not stick".into()),
        };

        assert!(edit_room(&state, "101", request).await.is_err());
        let room = get_room(&state, "101").await.unwrap();
        assert_eq!(room.status, status("od"));
        assert_eq!(room.notes, "");
    }

    #[tokio::test]
    async fn housekeeping_cannot_release_due_outs_or_lock_rooms() {
        let state = state_with(vec![
            Room::new("101", status("do")),
            Room::new("102", status("vd")),
        ])
        .await;

        for (room_no, to) in [("101", BaseStatus::Vd), ("102", BaseStatus::Lock)] {
            let request = TransitionRequest {
                staff: staff(Department::Hk),
                to,
            };
            let err = transition_room(&state, room_no, request).await.unwrap_err();
            assert!(matches!(err, ServiceError::Forbidden(_)), "{room_no}: {err:?}");
            assert!(!state.edit_sessions().is_claimed(room_no));
        }
        assert_eq!(get_room(&state, "101").await.unwrap().status, status("do"));
        assert_eq!(get_room(&state, "102").await.unwrap().status, status("vd"));

        for (room_no, to) in [("101", BaseStatus::Vd), ("102", BaseStatus::Lock)] {
            let request = TransitionRequest {
                staff: staff(Department::Fo),
                to,
            };
            let response = transition_room(&state, room_no, request).await.unwrap();
            assert_eq!(response.to.base(), to);
        }
    }

    #[tokio::test]
    async fn housekeeping_edit_stops_at_a_locked_step() {
        let state = state_with(vec![Room::new("102", status("vc"))]).await;
        let request = RoomEditRequest {
            staff: staff(Department::Hk),
            steps: vec![BaseStatus::Vd, BaseStatus::Lock],
            arrival: None,
            current_guest: None,
            new_guest: None,
            notes: None,
        };

        assert!(matches!(
            edit_room(&state, "102", request).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert_eq!(get_room(&state, "102").await.unwrap().status, status("vc"));
    }

    #[tokio::test]
    async fn housekeeping_cannot_refresh() {
        let state = state_with(Vec::new()).await;
        let request = RefreshRequest {
            staff: staff(Department::Hk),
        };
        assert!(matches!(
            refresh_from_source(&state, request).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[test]
    fn guest_slot_from_form_trims() {
        let slot: GuestSlot = GuestRecord::from(GuestInput {
            name: "  ".into(),
            ..GuestInput::default()
        })
        .into();
        assert!(slot.is_empty());
    }
}
