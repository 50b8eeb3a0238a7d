use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{
    activity::ActivityCategory,
    payload::{GuestRecord, UpdatePayload},
    room::Room,
    staff::Department,
    status::CompositeStatus,
};

/// Room as held by storage backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Unique room number.
    pub room_no: String,
    /// Room type label.
    #[serde(default)]
    pub room_type: String,
    /// Composite status (`vd`, `vc/arr`, ...).
    pub room_status: CompositeStatus,
    /// Resident guest, blank when none.
    #[serde(default)]
    pub current_guest: GuestRecord,
    /// Expected guest, blank when none.
    #[serde(default)]
    pub new_guest: GuestRecord,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Last time the room was written.
    pub updated_at: SystemTime,
}

impl RoomEntity {
    /// Overwrite the mutable fields with an engine payload.
    pub fn apply_update(&mut self, payload: &UpdatePayload) {
        self.room_status = payload.room_status;
        self.notes = payload.notes.clone();
        self.current_guest = payload.current_guest.clone();
        self.new_guest = payload.new_guest.clone();
        self.updated_at = SystemTime::now();
    }
}

impl From<&Room> for RoomEntity {
    fn from(room: &Room) -> Self {
        Self {
            room_no: room.room_no().to_owned(),
            room_type: room.room_type().to_owned(),
            room_status: room.status(),
            current_guest: room.current_guest().into(),
            new_guest: room.new_guest().into(),
            notes: room.notes().to_owned(),
            updated_at: SystemTime::now(),
        }
    }
}

impl From<RoomEntity> for Room {
    /// Rebuild the engine room; guest data contradicting the status is dropped.
    fn from(entity: RoomEntity) -> Self {
        Room::new(entity.room_no, entity.room_status)
            .with_room_type(entity.room_type)
            .with_current_guest(entity.current_guest.into())
            .with_new_guest(entity.new_guest.into())
            .with_notes(entity.notes)
    }
}

/// One line of the activity report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntity {
    /// Unique entry identifier.
    pub id: Uuid,
    /// When the action happened.
    pub timestamp: SystemTime,
    /// Staff member who performed it.
    pub staff_name: String,
    /// Department of the staff member.
    pub department: Department,
    /// Room concerned.
    pub room_no: String,
    /// Kind of action.
    pub category: ActivityCategory,
    /// Status before a status change.
    pub old_status: Option<CompositeStatus>,
    /// Status after a status change.
    pub new_status: Option<CompositeStatus>,
    /// Free-form detail, e.g. the note change.
    pub detail: Option<String>,
}
