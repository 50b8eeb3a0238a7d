use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::{
        staff::StaffInput,
        validation::{validate_room_no, validate_room_numbers},
    },
    state::{
        counters::{CounterSet, RoomFilter},
        payload::GuestRecord,
        room::{ClearReason, Guest, Room, TransitionOutcome},
        status::{BaseStatus, CompositeStatus},
    },
};

/// One status a room may move to next.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransitionOption {
    pub status: BaseStatus,
    pub label: String,
}

/// Room as shown on the board.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_no: String,
    pub room_type: String,
    /// Floor derived from the room number.
    pub floor: String,
    /// Composite status, e.g. `vc/arr`.
    #[schema(value_type = String)]
    pub status: CompositeStatus,
    /// Human-readable base status.
    pub status_label: String,
    pub arrival: bool,
    pub current_guest: Option<Guest>,
    pub new_guest: Option<Guest>,
    pub notes: String,
    pub available_transitions: Vec<TransitionOption>,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        let status = room.status();
        Self {
            room_no: room.room_no().to_owned(),
            room_type: room.room_type().to_owned(),
            floor: room.floor(),
            status,
            status_label: status.base().label().to_owned(),
            arrival: status.has_arrival(),
            current_guest: room.current_guest().guest().cloned(),
            new_guest: room.new_guest().guest().cloned(),
            notes: room.notes().to_owned(),
            available_transitions: room
                .available_transitions()
                .iter()
                .map(|target| TransitionOption {
                    status: *target,
                    label: target.label().to_owned(),
                })
                .collect(),
        }
    }
}

/// Room number taken from the request path.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Path)]
pub struct RoomPath {
    /// Room number, e.g. `101`.
    #[validate(custom(function = "validate_room_no"))]
    pub room_no: String,
}

/// Query of the room list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomListQuery {
    /// Counter bucket to show; every room when absent.
    pub filter: Option<RoomFilter>,
}

/// Room list with the counters of the whole hotel.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomListResponse {
    pub filter: RoomFilter,
    pub counters: CounterSet,
    pub rooms: Vec<RoomView>,
}

/// Rooms of one floor, in room order.
#[derive(Debug, Serialize, ToSchema)]
pub struct FloorView {
    pub floor: String,
    pub rooms: Vec<RoomView>,
}

/// Number of rooms in one composite status.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    #[schema(value_type = String)]
    pub status: CompositeStatus,
    pub count: usize,
}

/// Quick status change from the board.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TransitionRequest {
    #[validate(nested)]
    pub staff: StaffInput,
    /// Target base status; the arrival flag follows the room.
    pub to: BaseStatus,
}

/// How the resident guest slot changed during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GuestEffect {
    /// Nothing moved.
    None,
    /// The expected guest checked in.
    Promoted,
    /// The room became vacant and the resident was removed.
    Vacated,
    /// The due-out guest left.
    Departed,
}

impl From<&TransitionOutcome> for GuestEffect {
    fn from(outcome: &TransitionOutcome) -> Self {
        match (outcome.promoted, outcome.cleared) {
            (true, _) => GuestEffect::Promoted,
            (false, Some(ClearReason::DueOutDeparted)) => GuestEffect::Departed,
            (false, Some(ClearReason::Vacated)) => GuestEffect::Vacated,
            (false, None) => GuestEffect::None,
        }
    }
}

/// Result of a quick status change.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    #[schema(value_type = String)]
    pub from: CompositeStatus,
    #[schema(value_type = String)]
    pub to: CompositeStatus,
    pub guest_effect: GuestEffect,
    pub room: RoomView,
}

/// Guest fields entered in the edit form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestInput {
    #[validate(length(max = 120))]
    pub name: String,
    #[validate(length(max = 20))]
    pub check_in: String,
    #[validate(length(max = 20))]
    pub check_out: String,
    #[validate(range(max = 50))]
    pub pax: u32,
}

impl From<GuestInput> for GuestRecord {
    fn from(input: GuestInput) -> Self {
        GuestRecord {
            name: input.name,
            check_in: input.check_in,
            check_out: input.check_out,
            pax: input.pax,
        }
    }
}

/// Full edit of one room. Absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomEditRequest {
    #[validate(nested)]
    pub staff: StaffInput,
    /// Status steps applied in order; each one must be a valid transition.
    #[serde(default)]
    #[validate(length(max = 16))]
    pub steps: Vec<BaseStatus>,
    pub arrival: Option<bool>,
    #[validate(nested)]
    pub current_guest: Option<GuestInput>,
    #[validate(nested)]
    pub new_guest: Option<GuestInput>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Result of a full edit.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomEditResponse {
    /// Whether anything was saved.
    pub changed: bool,
    pub room: RoomView,
    /// Requested changes the room could not take, e.g. guest data on a vacant room.
    pub notices: Vec<String>,
}

/// Same change applied to several rooms.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkEditRequest {
    #[validate(nested)]
    pub staff: StaffInput,
    #[validate(custom(function = "validate_room_numbers"))]
    pub room_numbers: Vec<String>,
    pub status: Option<BaseStatus>,
    pub arrival: Option<bool>,
}

/// Outcome of a bulk edit for one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkOutcome {
    Updated,
    Unchanged,
    Failed,
}

/// Per-room line of a bulk edit result.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkRoomResult {
    pub room_no: String,
    pub outcome: BulkOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Bulk edit summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkEditResponse {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub results: Vec<BulkRoomResult>,
}

/// Reload of the room list from the seed source.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RefreshRequest {
    #[validate(nested)]
    pub staff: StaffInput,
}

/// Number of rooms after a reload.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub rooms: usize,
}
