use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        report::{
            ActivityReport, ClearActivityRequest, ClearActivityResponse, RoomHistoryResponse,
        },
        room::RoomPath,
    },
    error::AppError,
    services::report_service,
    state::SharedState,
};

/// Activity report endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/reports/activity", get(activity_report))
        .route("/reports/activity/rooms/{room_no}", get(room_history))
        .route("/reports/activity/clear", post(clear_activity))
}

#[utoipa::path(
    get,
    path = "/reports/activity",
    tag = "reports",
    responses((status = 200, description = "Activity since the report window opened", body = ActivityReport))
)]
/// Today's activity with per-category and per-staff statistics.
pub async fn activity_report(
    State(state): State<SharedState>,
) -> Result<Json<ActivityReport>, AppError> {
    Ok(Json(report_service::activity_report(&state).await?))
}

#[utoipa::path(
    get,
    path = "/reports/activity/rooms/{room_no}",
    tag = "reports",
    params(RoomPath),
    responses((status = 200, description = "Latest activity of the room", body = RoomHistoryResponse))
)]
/// Latest activity of one room.
pub async fn room_history(
    State(state): State<SharedState>,
    Valid(Path(path)): Valid<Path<RoomPath>>,
) -> Result<Json<RoomHistoryResponse>, AppError> {
    Ok(Json(
        report_service::room_history(&state, &path.room_no).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/reports/activity/clear",
    tag = "reports",
    request_body = ClearActivityRequest,
    responses(
        (status = 200, description = "Activity log cleared", body = ClearActivityResponse),
        (status = 403, description = "Only front office may clear the log")
    )
)]
/// Wipe the activity log.
pub async fn clear_activity(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<ClearActivityRequest>>,
) -> Result<Json<ClearActivityResponse>, AppError> {
    Ok(Json(report_service::clear_activity(&state, request).await?))
}
