//! Room list import from the JSON export of the front-office sheet.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    dao::{models::RoomEntity, room_store::RoomStore, storage::StorageError},
    state::{
        payload::GuestRecord,
        room::Room,
        status::{ARRIVAL_SUFFIX, CompositeStatus},
    },
};

/// Placeholder the sheet uses for an empty date cell.
const BLANK_DATE: &str = "00-01-00";

/// Failures while importing the room list.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file `{path}`")]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The seed file is not a JSON array of rows.
    #[error("failed to parse seed file")]
    Parse(#[from] serde_json::Error),
    /// Writing the imported rooms failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoomRow {
    #[serde(default, alias = "room_no")]
    room_no: Value,
    #[serde(default, alias = "room_type")]
    room_type: Option<String>,
    #[serde(default, alias = "room_status")]
    status: Option<String>,
    #[serde(default)]
    arr: Value,
    #[serde(default, alias = "current_guest")]
    current_guest: Option<RawGuest>,
    #[serde(default, alias = "new_guest")]
    new_guest: Option<RawGuest>,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGuest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "check_in")]
    check_in: Option<String>,
    #[serde(default, alias = "check_out")]
    check_out: Option<String>,
    #[serde(default)]
    pax: Value,
}

impl From<RawGuest> for GuestRecord {
    fn from(raw: RawGuest) -> Self {
        GuestRecord {
            name: raw.name.unwrap_or_default().trim().to_owned(),
            check_in: normalize_date(raw.check_in.as_deref()),
            check_out: normalize_date(raw.check_out.as_deref()),
            pax: parse_pax(&raw.pax),
        }
    }
}

/// Parse the JSON rows of the seed file into normalized rooms.
///
/// Rows without a room number or with an unknown status are skipped with a
/// warning; the first row wins when a room number repeats.
pub fn parse_rooms(contents: &str) -> Result<Vec<RoomEntity>, SeedError> {
    let rows: Vec<RawRoomRow> = serde_json::from_str(contents)?;
    let now = SystemTime::now();

    let mut seen = HashSet::new();
    let mut rooms = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let room_no = match &row.room_no {
            Value::String(text) => text.trim().to_owned(),
            Value::Number(number) => number.to_string(),
            _ => String::new(),
        };
        if room_no.is_empty() {
            warn!(row = index, "skipping seed row without room number");
            continue;
        }
        if !seen.insert(room_no.clone()) {
            warn!(row = index, room_no = %room_no, "skipping duplicate seed row");
            continue;
        }

        let raw_status = row.status.as_deref().unwrap_or_default();
        let Some(status) = clean_room_status(raw_status, &row.arr) else {
            warn!(
                row = index,
                room_no = %room_no,
                status = ?row.status,
                "skipping seed row with unknown status"
            );
            continue;
        };

        let current: GuestRecord = row.current_guest.unwrap_or_default().into();
        let new: GuestRecord = row.new_guest.unwrap_or_default().into();
        // Going through the engine room drops guests the status cannot hold.
        let room = Room::new(room_no, status)
            .with_room_type(row.room_type.unwrap_or_default().trim())
            .with_current_guest(current.into())
            .with_new_guest(new.into())
            .with_notes(row.notes.unwrap_or_default().trim());

        let mut entity = RoomEntity::from(&room);
        entity.updated_at = now;
        rooms.push(entity);
    }

    Ok(rooms)
}

/// Read and parse the seed file at `path`.
pub async fn load_rooms(path: &Path) -> Result<Vec<RoomEntity>, SeedError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_rooms(&contents)
}

/// Import the seed file into `store` when the store holds no room yet.
///
/// Returns the number of imported rooms.
pub async fn seed_if_empty<S>(store: &S, path: &Path) -> Result<usize, SeedError>
where
    S: RoomStore + ?Sized,
{
    if !store.list_rooms().await?.is_empty() {
        return Ok(0);
    }

    let rooms = load_rooms(path).await?;
    let count = rooms.len();
    store.replace_rooms(rooms).await?;
    info!(count, path = %path.display(), "seeded empty room store");
    Ok(count)
}

/// Status cell plus separate ARR column to a composite status.
///
/// The status cell may already carry the `/arr` suffix. ARR on a status that cannot
/// hold it is dropped.
fn clean_room_status(status: &str, arr: &Value) -> Option<CompositeStatus> {
    let parsed: CompositeStatus = status.trim().parse().ok()?;
    Some(CompositeStatus::new(
        parsed.base(),
        parsed.has_arrival() || arrival_flag(arr),
    ))
}

fn arrival_flag(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => {
            let text = text.trim();
            text.eq_ignore_ascii_case(ARRIVAL_SUFFIX) || text.eq_ignore_ascii_case("true")
        }
        Value::Number(number) => number.as_u64().is_some_and(|n| n > 0),
        _ => false,
    }
}

/// Digits of the pax cell ("2 pax" is 2), zero when there are none.
fn parse_pax(value: &Value) -> u32 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or_default(),
        Value::String(text) => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            digits.parse().unwrap_or_default()
        }
        _ => 0,
    }
}

/// `d/m/yyyy`, `d.m.yy` and friends to `dd-mm-yy`; blanks and the sheet
/// placeholder to an empty string. Anything else is kept as written.
fn normalize_date(value: Option<&str>) -> String {
    let text = value.unwrap_or_default().trim();
    if text.is_empty() || text == BLANK_DATE {
        return String::new();
    }

    let parts: Vec<&str> = text.split(['/', '-', '.']).map(str::trim).collect();
    let numbers: Option<Vec<u32>> = parts.iter().map(|part| part.parse().ok()).collect();
    match numbers.as_deref() {
        Some(&[day, month, year]) if (1..=31).contains(&day) && (1..=12).contains(&month) => {
            format!("{day:02}-{month:02}-{:02}", year % 100)
        }
        _ => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::room_store::memory::MemoryRoomStore, state::status::BaseStatus};

    const SEED: &str = r#"[
        {"roomNo": "101", "roomType": "DLX", "status": "OD",
         "currentGuest": {"name": " Alice ", "checkIn": "3/6/2025", "checkOut": "05-06-25", "pax": "2 pax"}},
        {"roomNo": 205, "status": "VC", "arr": "ARR",
         "newGuest": {"name": "Bob", "checkIn": "06-06-25", "checkOut": "00-01-00", "pax": 1}},
        {"roomNo": "206", "status": "oc", "arr": "ARR",
         "newGuest": {"name": "Ghost"}},
        {"roomNo": "207", "status": "VD/ARR"},
        {"roomNo": "208", "status": "VC",
         "currentGuest": {"name": "Leftover"}},
        {"roomNo": "209", "status": "??"},
        {"roomNo": "101", "status": "VD"},
        {"roomNo": "", "status": "VD"}
    ]"#;

    #[test]
    fn normalizes_sheet_rows() {
        let rooms = parse_rooms(SEED).unwrap();
        let numbers: Vec<_> = rooms.iter().map(|room| room.room_no.as_str()).collect();
        assert_eq!(numbers, vec!["101", "205", "206", "207", "208"]);

        let alice = &rooms[0];
        assert_eq!(alice.room_status, CompositeStatus::plain(BaseStatus::Od));
        assert_eq!(alice.current_guest.name, "Alice");
        assert_eq!(alice.current_guest.check_in, "03-06-25");
        assert_eq!(alice.current_guest.pax, 2);

        let bob = &rooms[1];
        assert_eq!(bob.room_status.to_string(), "vc/arr");
        assert_eq!(bob.new_guest.name, "Bob");
        assert_eq!(bob.new_guest.check_out, "");

        // ARR dropped on an occupied room, together with the expected guest.
        assert_eq!(rooms[2].room_status.to_string(), "oc");
        assert_eq!(rooms[2].new_guest, GuestRecord::empty());

        assert_eq!(rooms[3].room_status.to_string(), "vd/arr");
        assert_eq!(rooms[4].current_guest, GuestRecord::empty());
    }

    #[test]
    fn pax_and_flags() {
        assert_eq!(parse_pax(&Value::from("3 adults")), 3);
        assert_eq!(parse_pax(&Value::from("")), 0);
        assert_eq!(parse_pax(&Value::Null), 0);
        assert!(arrival_flag(&Value::from(" arr ")));
        assert!(arrival_flag(&Value::from(true)));
        assert!(!arrival_flag(&Value::from("")));
    }

    #[tokio::test]
    async fn seeding_skips_populated_store() {
        let dir = std::env::temp_dir().join(format!("room-seed-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("rooms.json");
        tokio::fs::write(&path, SEED).await.unwrap();

        let store = MemoryRoomStore::new();
        assert_eq!(seed_if_empty(&store, &path).await.unwrap(), 5);
        assert_eq!(seed_if_empty(&store, &path).await.unwrap(), 0);
        assert_eq!(store.list_rooms().await.unwrap().len(), 5);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
