use std::{cmp::Ordering, mem};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::{BaseStatus, CompositeStatus, EngineError, can_transition};

/// Guest data attached to a room, either the resident or the expected arrival.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    /// Guest name as written on the booking.
    pub name: String,
    /// Check-in date, free text.
    pub check_in: String,
    /// Check-out date, free text.
    pub check_out: String,
    /// Number of guests.
    pub pax: u32,
}

impl Guest {
    /// Whether every field is empty, which is how missing guests travel on the wire.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.check_in.trim().is_empty()
            && self.check_out.trim().is_empty()
            && self.pax == 0
    }
}

/// Tagged guest slot: a room either has a guest in this position or it does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GuestSlot {
    /// No guest.
    #[default]
    Empty,
    /// A guest with its booking data.
    Present(Guest),
}

impl GuestSlot {
    /// Wrap a guest, mapping a blank record to [`GuestSlot::Empty`].
    pub fn from_guest(guest: Guest) -> Self {
        if guest.is_blank() {
            GuestSlot::Empty
        } else {
            GuestSlot::Present(guest)
        }
    }

    /// Borrow the guest if present.
    pub fn guest(&self) -> Option<&Guest> {
        match self {
            GuestSlot::Empty => None,
            GuestSlot::Present(guest) => Some(guest),
        }
    }

    /// Whether the slot holds no guest.
    pub fn is_empty(&self) -> bool {
        matches!(self, GuestSlot::Empty)
    }
}

/// Why the resident guest was cleared by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The room became vacant.
    Vacated,
    /// A due-out room was marked vacant dirty: the guest has departed.
    DueOutDeparted,
}

/// Result of a successful [`Room::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Status before the transition.
    pub from: CompositeStatus,
    /// Status after the transition.
    pub to: CompositeStatus,
    /// The expected arrival was moved into the resident slot.
    pub promoted: bool,
    /// The resident guest was cleared, and why.
    pub cleared: Option<ClearReason>,
}

/// What [`Room::set_arrival`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalChange {
    /// The flag already had the requested value.
    Unchanged,
    /// The flag was turned on.
    Enabled,
    /// The flag was turned off and the expected guest discarded.
    Disabled,
    /// The flag was requested on a status that cannot carry it; it stays off.
    Refused,
}

/// A hotel room with its status and guests.
///
/// Fields are private so the guest invariants hold for every value: no resident
/// guest on a vacant room, no expected guest without the arrival flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    room_no: String,
    room_type: String,
    status: CompositeStatus,
    current_guest: GuestSlot,
    new_guest: GuestSlot,
    notes: String,
}

impl Room {
    /// Create an empty room in the given status.
    pub fn new(room_no: impl Into<String>, status: CompositeStatus) -> Self {
        Self {
            room_no: room_no.into(),
            room_type: String::new(),
            status,
            current_guest: GuestSlot::Empty,
            new_guest: GuestSlot::Empty,
            notes: String::new(),
        }
    }

    /// Set the room type label.
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = room_type.into();
        self
    }

    /// Attach the resident guest; dropped when the room is vacant.
    pub fn with_current_guest(mut self, guest: GuestSlot) -> Self {
        self.set_current_guest(guest);
        self
    }

    /// Attach the expected guest; dropped when no arrival is flagged.
    pub fn with_new_guest(mut self, guest: GuestSlot) -> Self {
        self.set_new_guest(guest);
        self
    }

    /// Set the free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Unique room number.
    pub fn room_no(&self) -> &str {
        &self.room_no
    }

    /// Room type label.
    pub fn room_type(&self) -> &str {
        &self.room_type
    }

    /// Current composite status.
    pub fn status(&self) -> CompositeStatus {
        self.status
    }

    /// Resident guest slot.
    pub fn current_guest(&self) -> &GuestSlot {
        &self.current_guest
    }

    /// Expected guest slot.
    pub fn new_guest(&self) -> &GuestSlot {
        &self.new_guest
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Floor the room is on.
    pub fn floor(&self) -> String {
        floor_of(&self.room_no)
    }

    /// Base statuses the room may move to next.
    pub fn available_transitions(&self) -> &'static [BaseStatus] {
        self.status.base().targets()
    }

    /// Move the room to `to`, applying the guest side effects.
    ///
    /// Promotion looks at the status before the move, clearing at the target. The
    /// arrival flag survives only when it was not consumed by a promotion and the
    /// target can carry it.
    pub fn transition(&mut self, to: BaseStatus) -> Result<TransitionOutcome, EngineError> {
        let from = self.status;
        if !can_transition(from.base(), to) {
            return Err(EngineError::InvalidTransition {
                from: from.base(),
                to,
            });
        }

        let promoted = from.has_arrival() && to == BaseStatus::Ip;
        if promoted {
            self.current_guest = mem::take(&mut self.new_guest);
        }

        let cleared = if from.base() == BaseStatus::Do && to == BaseStatus::Vd {
            Some(ClearReason::DueOutDeparted)
        } else if to.is_vacant() {
            Some(ClearReason::Vacated)
        } else {
            None
        };
        if cleared.is_some() {
            self.current_guest = GuestSlot::Empty;
        }

        self.status = CompositeStatus::new(to, from.has_arrival() && !promoted);
        if !self.status.has_arrival() {
            self.new_guest = GuestSlot::Empty;
        }

        Ok(TransitionOutcome {
            from,
            to: self.status,
            promoted,
            cleared,
        })
    }

    /// Turn the arrival flag on or off.
    pub fn set_arrival(&mut self, requested: bool) -> ArrivalChange {
        let base = self.status.base();
        match (self.status.has_arrival(), requested) {
            (true, true) | (false, false) => ArrivalChange::Unchanged,
            (false, true) if !base.can_have_arrival() => ArrivalChange::Refused,
            (false, true) => {
                self.status = CompositeStatus::new(base, true);
                ArrivalChange::Enabled
            }
            (true, false) => {
                self.status = CompositeStatus::plain(base);
                self.new_guest = GuestSlot::Empty;
                ArrivalChange::Disabled
            }
        }
    }

    /// Replace the resident guest. Returns false when the room is vacant and the
    /// guest was ignored.
    pub fn set_current_guest(&mut self, guest: GuestSlot) -> bool {
        if self.status.base().is_vacant() {
            self.current_guest = GuestSlot::Empty;
            return guest.is_empty();
        }
        self.current_guest = guest;
        true
    }

    /// Replace the expected guest. Returns false when no arrival is flagged and the
    /// guest was ignored.
    pub fn set_new_guest(&mut self, guest: GuestSlot) -> bool {
        if !self.status.has_arrival() {
            self.new_guest = GuestSlot::Empty;
            return guest.is_empty();
        }
        self.new_guest = guest;
        true
    }

    /// Replace the notes, returning whether they changed.
    pub fn set_notes(&mut self, notes: impl Into<String>) -> bool {
        let notes = notes.into();
        if notes == self.notes {
            return false;
        }
        self.notes = notes;
        true
    }
}

/// Floor label of a room number: everything before the last two characters.
///
/// Short numbers fall back to their first character.
pub fn floor_of(room_no: &str) -> String {
    let room_no = room_no.trim();
    let chars: Vec<char> = room_no.chars().collect();
    match chars.len() {
        0 => String::new(),
        1..=2 => chars[..1].iter().collect(),
        len => chars[..len - 2].iter().collect(),
    }
}

/// Dashboard ordering of room numbers: numeric when both parse, textual otherwise.
pub fn room_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}
