use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    room::{Guest, GuestSlot, Room},
    status::CompositeStatus,
};

/// Guest record as persisted: empty slots are written as blank records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    /// Guest name, empty when no guest.
    #[serde(default)]
    pub name: String,
    /// Check-in date, empty when no guest.
    #[serde(default)]
    pub check_in: String,
    /// Check-out date, empty when no guest.
    #[serde(default)]
    pub check_out: String,
    /// Number of guests, zero when no guest.
    #[serde(default)]
    pub pax: u32,
}

impl GuestRecord {
    /// Blank record standing for an empty slot.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<&GuestSlot> for GuestRecord {
    fn from(slot: &GuestSlot) -> Self {
        match slot {
            GuestSlot::Empty => GuestRecord::empty(),
            GuestSlot::Present(guest) => GuestRecord {
                name: guest.name.clone(),
                check_in: guest.check_in.clone(),
                check_out: guest.check_out.clone(),
                pax: guest.pax,
            },
        }
    }
}

impl From<GuestRecord> for GuestSlot {
    fn from(record: GuestRecord) -> Self {
        GuestSlot::from_guest(Guest {
            name: record.name.trim().to_owned(),
            check_in: record.check_in.trim().to_owned(),
            check_out: record.check_out.trim().to_owned(),
            pax: record.pax,
        })
    }
}

/// Minimal set of fields written to the update sink after an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    /// Composite status, `base` or `base/arr`.
    #[schema(value_type = String, example = "vc/arr")]
    pub room_status: CompositeStatus,
    /// Free-text notes.
    pub notes: String,
    /// Resident guest, blank on vacant rooms.
    pub current_guest: GuestRecord,
    /// Expected guest, blank unless an arrival is flagged.
    pub new_guest: GuestRecord,
}

/// Build the persistence payload for `room`.
///
/// Guest records are blanked according to the status even if the room somehow held
/// data, so a payload never contradicts the composite status it carries.
pub fn build_update(room: &Room) -> UpdatePayload {
    let status = room.status();

    let current_guest = if status.base().is_vacant() {
        GuestRecord::empty()
    } else {
        room.current_guest().into()
    };
    let new_guest = if status.has_arrival() {
        room.new_guest().into()
    } else {
        GuestRecord::empty()
    };

    UpdatePayload {
        room_status: status,
        notes: room.notes().to_owned(),
        current_guest,
        new_guest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::status::BaseStatus;

    fn guest(name: &str) -> GuestSlot {
        GuestSlot::Present(Guest {
            name: name.into(),
            check_in: "01-06-25".into(),
            check_out: "04-06-25".into(),
            pax: 1,
        })
    }

    #[test]
    fn occupied_room_payload() {
        let mut room = Room::new("101", BaseStatus::Od.into())
            .with_current_guest(guest("Alice"))
            .with_notes("extra towels");
        room.transition(BaseStatus::Oc).unwrap();

        let payload = build_update(&room);
        assert_eq!(payload.room_status.to_string(), "oc");
        assert_eq!(payload.current_guest.name, "Alice");
        assert_eq!(payload.new_guest, GuestRecord::empty());
        assert_eq!(payload.notes, "extra towels");
    }

    #[test]
    fn payload_wire_shape() {
        let room = Room::new("205", CompositeStatus::new(BaseStatus::Vc, true))
            .with_new_guest(guest("Bob"));

        let value = serde_json::to_value(build_update(&room)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "roomStatus": "vc/arr",
                "notes": "",
                "currentGuest": { "name": "", "checkIn": "", "checkOut": "", "pax": 0 },
                "newGuest": { "name": "Bob", "checkIn": "01-06-25", "checkOut": "04-06-25", "pax": 1 },
            })
        );
    }

    #[test]
    fn payload_is_stable_across_calls() {
        let room = Room::new("402", CompositeStatus::new(BaseStatus::Do, true))
            .with_current_guest(guest("Dan"))
            .with_new_guest(guest("Eve"));

        let first = serde_json::to_vec(&build_update(&room)).unwrap();
        let second = serde_json::to_vec(&build_update(&room)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn blank_record_maps_to_empty_slot() {
        let record = GuestRecord {
            name: "   ".into(),
            ..GuestRecord::empty()
        };
        assert_eq!(GuestSlot::from(record), GuestSlot::Empty);
    }
}
