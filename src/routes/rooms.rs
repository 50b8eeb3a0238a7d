use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::room::{
        BulkEditRequest, BulkEditResponse, FloorView, RefreshRequest, RefreshResponse,
        RoomEditRequest, RoomEditResponse, RoomListQuery, RoomListResponse, RoomPath, RoomView,
        StatusCount, TransitionRequest, TransitionResponse,
    },
    error::AppError,
    services::{bulk_service, room_service},
    state::SharedState,
};

/// Room board endpoints: listing, status changes, edits and reloads.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/rooms", get(list_rooms))
        .route("/rooms/floors", get(rooms_by_floor))
        .route("/rooms/statistics", get(status_statistics))
        .route("/rooms/bulk", post(bulk_edit))
        .route("/rooms/refresh", post(refresh_rooms))
        .route("/rooms/{room_no}", get(get_room).put(edit_room))
        .route("/rooms/{room_no}/transition", post(transition_room))
}

#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    params(RoomListQuery),
    responses(
        (status = 200, description = "Rooms of the bucket with the hotel counters", body = RoomListResponse),
        (status = 503, description = "No room store (degraded mode)")
    )
)]
/// List rooms, optionally restricted to one counter bucket.
pub async fn list_rooms(
    State(state): State<SharedState>,
    Query(query): Query<RoomListQuery>,
) -> Result<Json<RoomListResponse>, AppError> {
    Ok(Json(room_service::list_rooms(&state, query.filter).await?))
}

#[utoipa::path(
    get,
    path = "/rooms/floors",
    tag = "rooms",
    responses((status = 200, description = "Rooms grouped by floor", body = [FloorView]))
)]
/// List rooms grouped by floor.
pub async fn rooms_by_floor(
    State(state): State<SharedState>,
) -> Result<Json<Vec<FloorView>>, AppError> {
    Ok(Json(room_service::rooms_by_floor(&state).await?))
}

#[utoipa::path(
    get,
    path = "/rooms/statistics",
    tag = "rooms",
    responses((status = 200, description = "Number of rooms per status", body = [StatusCount]))
)]
/// Count rooms per composite status.
pub async fn status_statistics(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StatusCount>>, AppError> {
    Ok(Json(room_service::status_statistics(&state).await?))
}

#[utoipa::path(
    get,
    path = "/rooms/{room_no}",
    tag = "rooms",
    params(RoomPath),
    responses(
        (status = 200, description = "Room with its next statuses", body = RoomView),
        (status = 404, description = "Unknown room")
    )
)]
/// Fetch one room.
pub async fn get_room(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<RoomPath>>,
) -> Result<Json<RoomView>, AppError> {
    Ok(Json(room_service::get_room(&state, &path.room_no).await?))
}

#[utoipa::path(
    post,
    path = "/rooms/{room_no}/transition",
    tag = "rooms",
    params(RoomPath),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Status changed", body = TransitionResponse),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "Transition not allowed or room being edited"),
        (status = 502, description = "Update sink refused the change")
    )
)]
/// Move a room to another status.
pub async fn transition_room(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<RoomPath>>,
    Valid(Json(request)): Valid<Json<TransitionRequest>>,
) -> Result<Json<TransitionResponse>, AppError> {
    Ok(Json(
        room_service::transition_room(&state, &path.room_no, request).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/rooms/{room_no}",
    tag = "rooms",
    params(RoomPath),
    request_body = RoomEditRequest,
    responses(
        (status = 200, description = "Room edited", body = RoomEditResponse),
        (status = 404, description = "Unknown room"),
        (status = 409, description = "A step was not allowed or room being edited"),
        (status = 502, description = "Update sink refused the change")
    )
)]
/// Edit a room: status steps, arrival flag, guests and notes.
pub async fn edit_room(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<RoomPath>>,
    Valid(Json(request)): Valid<Json<RoomEditRequest>>,
) -> Result<Json<RoomEditResponse>, AppError> {
    Ok(Json(
        room_service::edit_room(&state, &path.room_no, request).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/rooms/bulk",
    tag = "rooms",
    request_body = BulkEditRequest,
    responses((status = 200, description = "Per-room outcomes", body = BulkEditResponse))
)]
/// Apply one status or arrival change to several rooms.
pub async fn bulk_edit(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<BulkEditRequest>>,
) -> Result<Json<BulkEditResponse>, AppError> {
    Ok(Json(bulk_service::bulk_edit(&state, request).await?))
}

#[utoipa::path(
    post,
    path = "/rooms/refresh",
    tag = "rooms",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Room list reloaded", body = RefreshResponse),
        (status = 403, description = "Only front office may reload"),
        (status = 502, description = "Room list source unusable")
    )
)]
/// Reload the room list from its source file.
pub async fn refresh_rooms(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<RefreshRequest>>,
) -> Result<Json<RefreshResponse>, AppError> {
    Ok(Json(room_service::refresh_from_source(&state, request).await?))
}
