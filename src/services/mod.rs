/// Activity log entries and background recording.
pub mod activity_service;
/// Same change applied to several rooms.
pub mod bulk_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Activity report, room history and log maintenance.
pub mod report_service;
/// Room listing, quick transitions, full edits and reloads.
pub mod room_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Room store connection supervision and degraded mode.
pub mod storage_supervisor;
