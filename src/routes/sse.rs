use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/rooms",
    tag = "sse",
    responses((status = 200, description = "Room board SSE stream (`handshake`, `room.updated`, `rooms.refreshed`, `system.status`)", content_type = "text/event-stream", body = String))
)]
/// Stream room board changes to connected boards.
pub async fn rooms_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let (receiver, greeting) = sse_service::subscribe_rooms(&state).await;
    info!(
        boards = state.rooms_sse().subscriber_count(),
        "new room SSE connection"
    );
    sse_service::to_sse_stream(receiver, greeting)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/rooms", get(rooms_stream))
}
