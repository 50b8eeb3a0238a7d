use crate::{
    dto::{
        room::RoomView,
        sse::{RoomUpdatedEvent, RoomsRefreshedEvent},
    },
    state::{SharedState, room::Room, staff::Staff},
};

const EVENT_ROOM_UPDATED: &str = "room.updated";
const EVENT_ROOMS_REFRESHED: &str = "rooms.refreshed";

/// Tell every board that `room` was saved.
pub fn broadcast_room_updated(state: &SharedState, room: &Room, staff: &Staff) {
    let payload = RoomUpdatedEvent {
        room: RoomView::from(room),
        staff_name: staff.name.clone(),
    };
    state.rooms_sse().publish(EVENT_ROOM_UPDATED, &payload);
}

/// Tell every board that the room list was replaced and must be refetched.
pub fn broadcast_rooms_refreshed(state: &SharedState, count: usize) {
    state
        .rooms_sse()
        .publish(EVENT_ROOMS_REFRESHED, &RoomsRefreshedEvent { count });
}
