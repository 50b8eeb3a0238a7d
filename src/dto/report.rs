use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::UtcOffset;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::ActivityEntity,
    dto::{format_system_time, staff::StaffInput},
    state::{activity::ActivityCategory, staff::Department, status::CompositeStatus},
};

/// One line of the activity report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntryView {
    pub id: Uuid,
    /// RFC 3339 timestamp in hotel local time.
    pub timestamp: String,
    pub staff_name: String,
    pub department: Department,
    pub room_no: String,
    pub category: ActivityCategory,
    #[schema(value_type = Option<String>)]
    pub old_status: Option<CompositeStatus>,
    #[schema(value_type = Option<String>)]
    pub new_status: Option<CompositeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActivityEntryView {
    /// Render a stored entry with timestamps in `offset`.
    pub fn from_entity(entity: ActivityEntity, offset: UtcOffset) -> Self {
        Self {
            id: entity.id,
            timestamp: format_system_time(entity.timestamp, offset),
            staff_name: entity.staff_name,
            department: entity.department,
            room_no: entity.room_no,
            category: entity.category,
            old_status: entity.old_status,
            new_status: entity.new_status,
            detail: entity.detail,
        }
    }
}

/// Actions of one staff member within the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffStatistics {
    pub staff_name: String,
    pub department: Department,
    pub total: usize,
    #[schema(value_type = Object)]
    pub by_category: IndexMap<ActivityCategory, usize>,
}

/// Totals of the report window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatistics {
    pub total_actions: usize,
    #[schema(value_type = Object)]
    pub by_category: IndexMap<ActivityCategory, usize>,
    /// Staff ordered by number of actions, most active first.
    pub by_staff: Vec<StaffStatistics>,
}

/// Today's activity report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityReport {
    /// Start of the report window (RFC 3339, hotel local time).
    pub since: String,
    pub statistics: ReportStatistics,
    /// Newest first.
    pub entries: Vec<ActivityEntryView>,
}

/// Latest entries of one room, newest first.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomHistoryResponse {
    pub room_no: String,
    pub entries: Vec<ActivityEntryView>,
}

/// Request to wipe the activity log.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClearActivityRequest {
    #[validate(nested)]
    pub staff: StaffInput,
}

/// Number of entries removed from the activity log.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearActivityResponse {
    pub removed: u64,
}
