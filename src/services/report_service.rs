use std::time::SystemTime;

use indexmap::IndexMap;
use time::{Duration, OffsetDateTime, Time, UtcOffset, format_description::well_known::Rfc3339};
use tracing::info;

use crate::{
    config::ReportStart,
    dao::{models::ActivityEntity, room_store::ActivityLog},
    dto::report::{
        ActivityEntryView, ActivityReport, ClearActivityRequest, ClearActivityResponse,
        ReportStatistics, RoomHistoryResponse, StaffStatistics,
    },
    error::ServiceError,
    services::room_service,
    state::{SharedState, activity::ActivityCategory, staff::Staff},
};

/// Start of the report window containing `now`.
///
/// The window opens every day at `start` hotel local time; before that time of
/// day, the window opened yesterday.
pub fn report_window_start(
    now: OffsetDateTime,
    offset: UtcOffset,
    start: ReportStart,
) -> OffsetDateTime {
    let local = now.to_offset(offset);
    let today =
        local.replace_time(Time::MIDNIGHT) + Duration::seconds(start.seconds_from_midnight());
    if local < today {
        today - Duration::DAY
    } else {
        today
    }
}

/// Count entries per category and per staff member.
pub fn compute_report_statistics(entries: &[ActivityEntity]) -> ReportStatistics {
    let empty_categories = || -> IndexMap<ActivityCategory, usize> {
        ActivityCategory::ALL.into_iter().map(|category| (category, 0)).collect()
    };

    let mut by_category = empty_categories();
    let mut by_staff: IndexMap<(String, _), StaffStatistics> = IndexMap::new();
    for entry in entries {
        *by_category.entry(entry.category).or_default() += 1;

        let staff = by_staff
            .entry((entry.staff_name.clone(), entry.department))
            .or_insert_with(|| StaffStatistics {
                staff_name: entry.staff_name.clone(),
                department: entry.department,
                total: 0,
                by_category: empty_categories(),
            });
        staff.total += 1;
        *staff.by_category.entry(entry.category).or_default() += 1;
    }

    let mut by_staff: Vec<StaffStatistics> = by_staff.into_values().collect();
    by_staff.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.staff_name.cmp(&b.staff_name))
    });

    ReportStatistics {
        total_actions: entries.len(),
        by_category,
        by_staff,
    }
}

/// Activity since the start of the current report window, with its statistics.
pub async fn activity_report(state: &SharedState) -> Result<ActivityReport, ServiceError> {
    let store = state.require_room_store().await?;
    let config = state.config();
    let offset = config.utc_offset();

    let since = report_window_start(OffsetDateTime::now_utc(), offset, config.report_start);
    let entries = store.list_activity_since(SystemTime::from(since)).await?;
    let statistics = compute_report_statistics(&entries);

    Ok(ActivityReport {
        since: since
            .format(&Rfc3339)
            .unwrap_or_else(|_| "invalid-timestamp".into()),
        statistics,
        entries: entries
            .into_iter()
            .map(|entry| ActivityEntryView::from_entity(entry, offset))
            .collect(),
    })
}

/// Latest activity of one room, newest first.
pub async fn room_history(
    state: &SharedState,
    room_no: &str,
) -> Result<RoomHistoryResponse, ServiceError> {
    let store = state.require_room_store().await?;
    let config = state.config();
    let offset = config.utc_offset();

    let entries = store
        .list_room_activity(room_no.to_owned(), config.room_history_limit)
        .await?;
    Ok(RoomHistoryResponse {
        room_no: room_no.to_owned(),
        entries: entries
            .into_iter()
            .map(|entry| ActivityEntryView::from_entity(entry, offset))
            .collect(),
    })
}

/// Wipe the activity log.
pub async fn clear_activity(
    state: &SharedState,
    request: ClearActivityRequest,
) -> Result<ClearActivityResponse, ServiceError> {
    let staff: Staff = request.staff.into();
    room_service::require_manager(&staff, "clear the activity log")?;
    let store = state.require_room_store().await?;

    let removed = store.clear_activity().await?;
    info!(removed, staff = %staff.name, "activity log cleared");
    Ok(ClearActivityResponse { removed })
}
