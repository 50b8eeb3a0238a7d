use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::models::{ActivityEntity, RoomEntity};

pub const ROOM_PREFIX: &str = "room::";
pub const ACTIVITY_PREFIX: &str = "activity::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub value: Option<RowValue>,
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RowValue {
    pub rev: String,
}

#[derive(Debug, Serialize)]
pub struct BulkDocsRequest<T> {
    pub docs: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDocsResult {
    #[serde(default)]
    pub error: Option<String>,
}

/// Tombstone used to delete a document through `_bulk_docs`.
#[derive(Debug, Serialize)]
pub struct DeletedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(rename = "_deleted")]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRoomDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub room: RoomEntity,
}

impl CouchRoomDocument {
    pub fn new(room: RoomEntity, rev: Option<String>) -> Self {
        Self {
            id: room_doc_id(&room.room_no),
            rev,
            room,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchActivityDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub entry: ActivityEntity,
}

impl From<ActivityEntity> for CouchActivityDocument {
    fn from(entry: ActivityEntity) -> Self {
        Self {
            id: activity_doc_id(entry.timestamp, entry.id),
            rev: None,
            entry,
        }
    }
}

pub fn room_doc_id(room_no: &str) -> String {
    format!("{ROOM_PREFIX}{room_no}")
}

/// Activity ids sort chronologically: the timestamp is zero-padded milliseconds.
pub fn activity_doc_id(timestamp: SystemTime, id: Uuid) -> String {
    format!("{}{}::{}", ACTIVITY_PREFIX, activity_key(timestamp), id.simple())
}

/// Lower bound of the activity ids recorded at or after `since`.
pub fn activity_lower_bound(since: SystemTime) -> String {
    format!("{}{}", ACTIVITY_PREFIX, activity_key(since))
}

fn activity_key(timestamp: SystemTime) -> String {
    let millis = timestamp
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    format!("{millis:013}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn activity_ids_sort_by_time() {
        let early = UNIX_EPOCH + Duration::from_millis(999);
        let late = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let a = activity_doc_id(early, Uuid::new_v4());
        let b = activity_doc_id(late, Uuid::new_v4());

        assert!(a.starts_with("activity::0000000000999::"));
        assert!(a < b);
        assert!(activity_lower_bound(late) <= b);
    }
}
