use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::{
    dao::room_store::RoomBackend,
    dto::room::{BulkEditRequest, BulkEditResponse, BulkOutcome, BulkRoomResult},
    error::ServiceError,
    services::{activity_service, room_service},
    state::{SharedState, room::ArrivalChange, staff::Staff, status::BaseStatus},
};

/// Apply the same status and/or arrival change to several rooms.
///
/// Rooms are handled one after the other; a room that fails is reported in the
/// result and does not stop the others. A room already in the requested status
/// is left as is.
pub async fn bulk_edit(
    state: &SharedState,
    request: BulkEditRequest,
) -> Result<BulkEditResponse, ServiceError> {
    if request.status.is_none() && request.arrival.is_none() {
        return Err(ServiceError::InvalidInput(
            "bulk edit needs a status or an arrival flag".into(),
        ));
    }

    let staff: Staff = request.staff.into();
    let store = state.require_room_store().await?;
    let room_numbers: IndexSet<String> = request
        .room_numbers
        .iter()
        .map(|room_no| room_no.trim().to_owned())
        .collect();

    let mut response = BulkEditResponse {
        updated: 0,
        unchanged: 0,
        failed: 0,
        results: Vec::with_capacity(room_numbers.len()),
    };

    for room_no in room_numbers {
        let (outcome, message) =
            match edit_one(state, &store, &staff, &room_no, request.status, request.arrival).await
            {
                Ok(done) => done,
                Err(err) => {
                    warn!(room_no = %room_no, error = %err, "bulk edit failed for room");
                    (BulkOutcome::Failed, Some(err.to_string()))
                }
            };

        match outcome {
            BulkOutcome::Updated => response.updated += 1,
            BulkOutcome::Unchanged => response.unchanged += 1,
            BulkOutcome::Failed => response.failed += 1,
        }
        response.results.push(BulkRoomResult {
            room_no,
            outcome,
            message,
        });
    }

    info!(
        staff = %staff.name,
        updated = response.updated,
        unchanged = response.unchanged,
        failed = response.failed,
        "bulk edit applied"
    );
    Ok(response)
}

async fn edit_one(
    state: &SharedState,
    store: &Arc<dyn RoomBackend>,
    staff: &Staff,
    room_no: &str,
    status: Option<BaseStatus>,
    arrival: Option<bool>,
) -> Result<(BulkOutcome, Option<String>), ServiceError> {
    let claim = state.edit_sessions().claim(room_no)?;
    debug!(room_no = claim.room_no(), claim = %claim.id(), "room claimed for bulk edit");
    let original = room_service::load_room(store, room_no).await?;
    let mut room = original.clone();
    let mut entries = Vec::new();

    if let Some(status) = status
        && status != room.status().base()
    {
        room_service::require_transition(staff, &room, status)?;
        let outcome = room.transition(status)?;
        entries.extend(activity_service::status_change_entry(
            staff,
            room_no,
            outcome.from,
            outcome.to,
        ));
    }

    let mut notice = None;
    if let Some(arrival) = arrival
        && room.set_arrival(arrival) == ArrivalChange::Refused
    {
        notice = Some(room_service::arrival_refused_notice(room.status().base()));
    }

    if room == original {
        return Ok((BulkOutcome::Unchanged, notice));
    }
    room_service::commit(state, store, staff, &room, entries).await?;
    Ok((BulkOutcome::Updated, notice))
}
