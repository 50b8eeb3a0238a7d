use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{ActivityEntity, RoomEntity},
    state::{
        activity::ActivityCategory, payload::GuestRecord, staff::Department,
        status::CompositeStatus,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    room_no: String,
    #[serde(default)]
    room_type: String,
    room_status: CompositeStatus,
    #[serde(default)]
    current_guest: GuestRecord,
    #[serde(default)]
    new_guest: GuestRecord,
    #[serde(default)]
    notes: String,
    updated_at: DateTime,
}

impl From<RoomEntity> for MongoRoomDocument {
    fn from(value: RoomEntity) -> Self {
        Self {
            room_no: value.room_no,
            room_type: value.room_type,
            room_status: value.room_status,
            current_guest: value.current_guest,
            new_guest: value.new_guest,
            notes: value.notes,
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoRoomDocument> for RoomEntity {
    fn from(value: MongoRoomDocument) -> Self {
        Self {
            room_no: value.room_no,
            room_type: value.room_type,
            room_status: value.room_status,
            current_guest: value.current_guest,
            new_guest: value.new_guest,
            notes: value.notes,
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoActivityDocument {
    #[serde(rename = "_id")]
    id: String,
    timestamp: DateTime,
    staff_name: String,
    department: Department,
    room_no: String,
    category: ActivityCategory,
    old_status: Option<CompositeStatus>,
    new_status: Option<CompositeStatus>,
    detail: Option<String>,
}

impl From<ActivityEntity> for MongoActivityDocument {
    fn from(value: ActivityEntity) -> Self {
        Self {
            id: value.id.simple().to_string(),
            timestamp: DateTime::from_system_time(value.timestamp),
            staff_name: value.staff_name,
            department: value.department,
            room_no: value.room_no,
            category: value.category,
            old_status: value.old_status,
            new_status: value.new_status,
            detail: value.detail,
        }
    }
}

impl From<MongoActivityDocument> for ActivityEntity {
    fn from(value: MongoActivityDocument) -> Self {
        Self {
            id: Uuid::parse_str(&value.id).unwrap_or_else(|_| Uuid::nil()),
            timestamp: value.timestamp.to_system_time(),
            staff_name: value.staff_name,
            department: value.department,
            room_no: value.room_no,
            category: value.category,
            old_status: value.old_status,
            new_status: value.new_status,
            detail: value.detail,
        }
    }
}
