use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the room board backend.
#[openapi(
    info(title = "Room Board Back", description = "Hotel room status board"),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::rooms_stream,
        crate::routes::rooms::list_rooms,
        crate::routes::rooms::rooms_by_floor,
        crate::routes::rooms::status_statistics,
        crate::routes::rooms::get_room,
        crate::routes::rooms::transition_room,
        crate::routes::rooms::edit_room,
        crate::routes::rooms::bulk_edit,
        crate::routes::rooms::refresh_rooms,
        crate::routes::reports::activity_report,
        crate::routes::reports::room_history,
        crate::routes::reports::clear_activity,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::RoomUpdatedEvent,
            crate::dto::sse::RoomsRefreshedEvent,
            crate::state::status::BaseStatus,
            crate::state::staff::Department,
            crate::state::payload::UpdatePayload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "rooms", description = "Room board and status changes"),
        (name = "reports", description = "Housekeeping activity report"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_room_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/rooms",
            "/rooms/{room_no}",
            "/rooms/{room_no}/transition",
            "/rooms/bulk",
            "/reports/activity",
            "/sse/rooms",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
