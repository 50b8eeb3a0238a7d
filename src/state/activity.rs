use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::{BaseStatus, CompositeStatus};

/// Kind of entry recorded in the activity report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    /// A vacant room was cleaned.
    VacantCleaning,
    /// An occupied room was serviced.
    OccupiedCleaning,
    /// The room notes were edited.
    NoteUpdate,
}

impl ActivityCategory {
    /// Every category, in report order.
    pub const ALL: [ActivityCategory; 3] = [
        ActivityCategory::VacantCleaning,
        ActivityCategory::OccupiedCleaning,
        ActivityCategory::NoteUpdate,
    ];

    /// Label used in the report statistics.
    pub fn label(self) -> &'static str {
        match self {
            ActivityCategory::VacantCleaning => "vacant cleaning",
            ActivityCategory::OccupiedCleaning => "occupied cleaning",
            ActivityCategory::NoteUpdate => "note update",
        }
    }
}

/// Report category of a status change, or `None` when it is not worth logging.
pub fn classify_transition(
    from: CompositeStatus,
    to: CompositeStatus,
) -> Option<ActivityCategory> {
    use BaseStatus::*;

    match (from.base(), to.base()) {
        (Vd, Vc) if from.has_arrival() == to.has_arrival() => {
            Some(ActivityCategory::VacantCleaning)
        }
        (Od, Oc | Dnd | Nn) => Some(ActivityCategory::OccupiedCleaning),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BaseStatus::*;

    fn status(text: &str) -> CompositeStatus {
        text.parse().unwrap()
    }

    #[test]
    fn noteworthy_transitions() {
        let cases = [
            ("vd", "vc", Some(ActivityCategory::VacantCleaning)),
            ("vd/arr", "vc/arr", Some(ActivityCategory::VacantCleaning)),
            ("od", "oc", Some(ActivityCategory::OccupiedCleaning)),
            ("od", "dnd", Some(ActivityCategory::OccupiedCleaning)),
            ("od", "nn", Some(ActivityCategory::OccupiedCleaning)),
            ("vd/arr", "vc", None),
            ("dnd", "oc", None),
            ("nn", "od", None),
            ("vc", "ip", None),
            ("do", "vd", None),
        ];

        for (from, to, expected) in cases {
            assert_eq!(
                classify_transition(status(from), status(to)),
                expected,
                "{from} -> {to}"
            );
        }
    }

    #[test]
    fn categories_serialize_snake_case() {
        let value = serde_json::to_value(ActivityCategory::OccupiedCleaning).unwrap();
        assert_eq!(value, "occupied_cleaning");
        assert_eq!(
            classify_transition(Od.into(), Oc.into()).map(ActivityCategory::label),
            Some("occupied cleaning")
        );
    }
}
