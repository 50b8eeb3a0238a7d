use std::{sync::Arc, time::SystemTime};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::ActivityEntity,
        room_store::{ActivityLog, RoomBackend},
    },
    state::{
        activity::{ActivityCategory, classify_transition},
        staff::Staff,
        status::CompositeStatus,
    },
};

/// Report entry for a status change, or `None` when the change is not reported.
pub fn status_change_entry(
    staff: &Staff,
    room_no: &str,
    from: CompositeStatus,
    to: CompositeStatus,
) -> Option<ActivityEntity> {
    let category = classify_transition(from, to)?;
    Some(ActivityEntity {
        id: Uuid::new_v4(),
        timestamp: SystemTime::now(),
        staff_name: staff.name.clone(),
        department: staff.department,
        room_no: room_no.to_owned(),
        category,
        old_status: Some(from),
        new_status: Some(to),
        detail: None,
    })
}

/// Report entry for an edit of the room notes.
pub fn note_change_entry(staff: &Staff, room_no: &str, old: &str, new: &str) -> ActivityEntity {
    ActivityEntity {
        id: Uuid::new_v4(),
        timestamp: SystemTime::now(),
        staff_name: staff.name.clone(),
        department: staff.department,
        room_no: room_no.to_owned(),
        category: ActivityCategory::NoteUpdate,
        old_status: None,
        new_status: None,
        detail: Some(format!("\"{old}\" → \"{new}\"")),
    }
}

/// Append `entries` to the activity log in the background.
///
/// The room change is already saved when this runs; a failed append is only logged.
pub fn record(store: Arc<dyn RoomBackend>, entries: Vec<ActivityEntity>) {
    if entries.is_empty() {
        return;
    }

    tokio::spawn(async move {
        for entry in entries {
            let room_no = entry.room_no.clone();
            let category = entry.category;
            match store.append_activity(entry).await {
                Ok(()) => debug!(room_no = %room_no, ?category, "activity recorded"),
                Err(err) => warn!(
                    room_no = %room_no,
                    ?category,
                    error = %err,
                    "failed to record activity"
                ),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::staff::Department;

    fn status(text: &str) -> CompositeStatus {
        text.parse().unwrap()
    }

    #[test]
    fn only_cleaning_changes_are_reported() {
        let staff = Staff::new("Hoa", Department::Hk);

        let entry = status_change_entry(&staff, "101", status("od"), status("oc")).unwrap();
        assert_eq!(entry.category, ActivityCategory::OccupiedCleaning);
        assert_eq!(entry.old_status, Some(status("od")));
        assert_eq!(entry.new_status, Some(status("oc")));
        assert_eq!(entry.staff_name, "Hoa");

        assert!(status_change_entry(&staff, "101", status("vc"), status("ip")).is_none());
        assert!(status_change_entry(&staff, "205", status("vd/arr"), status("vc/arr")).is_some());
    }

    #[test]
    fn note_changes_carry_both_texts() {
        let staff = Staff::new("Lan", Department::Fo);
        let entry = note_change_entry(&staff, "303", "", "extra towels");
        assert_eq!(entry.category, ActivityCategory::NoteUpdate);
        assert_eq!(entry.detail.as_deref(), Some("\"\" → \"extra towels\""));
        assert!(entry.old_status.is_none());
    }
}
