use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::{BaseStatus, can_transition};

/// Hotel department a staff member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Department {
    /// Housekeeping.
    #[serde(rename = "HK")]
    Hk,
    /// Front office.
    #[serde(rename = "FO")]
    Fo,
}

impl Department {
    /// Short code, as shown on the board.
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Hk => "HK",
            Department::Fo => "FO",
        }
    }

    /// Whether the department may refresh the room list and clear the activity log.
    pub fn can_manage(self) -> bool {
        matches!(self, Department::Fo)
    }

    /// Whether the department may move a room from `from` to `to`.
    ///
    /// Front office may use the whole transition table. Housekeeping never
    /// touches due-out or locked rooms and may not lock a room.
    pub fn allows(self, from: BaseStatus, to: BaseStatus) -> bool {
        if !can_transition(from, to) {
            return false;
        }
        match self {
            Department::Fo => true,
            Department::Hk => {
                !matches!(from, BaseStatus::Do | BaseStatus::Lock) && to != BaseStatus::Lock
            }
        }
    }
}

/// Person performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Staff {
    /// Display name.
    pub name: String,
    /// Department.
    pub department: Department,
}

impl Staff {
    /// Build a staff identity.
    pub fn new(name: impl Into<String>, department: Department) -> Self {
        Self {
            name: name.into(),
            department,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_front_office_manages() {
        assert!(Department::Fo.can_manage());
        assert!(!Department::Hk.can_manage());
    }

    #[test]
    fn housekeeping_works_a_subset_of_the_table() {
        use BaseStatus::*;

        assert!(Department::Hk.allows(Vd, Vc));
        assert!(Department::Hk.allows(Vc, Ip));
        assert!(Department::Hk.allows(Od, Nn));
        assert!(!Department::Hk.allows(Do, Vd));
        assert!(!Department::Hk.allows(Vd, Lock));
        assert!(!Department::Hk.allows(Lock, Vd));

        assert!(Department::Fo.allows(Do, Vd));
        assert!(Department::Fo.allows(Vd, Lock));
        assert!(Department::Fo.allows(Lock, Vd));
        assert!(!Department::Fo.allows(Oc, Vc));

        let all = [Do, Vd, Lock, Vc, Ip, Oc, Od, Dnd, Nn];
        for from in all {
            for to in all {
                if Department::Hk.allows(from, to) {
                    assert!(Department::Fo.allows(from, to), "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn department_codes_on_the_wire() {
        let staff: Staff = serde_json::from_str(r#"{"name":"Mai","department":"HK"}"#).unwrap();
        assert_eq!(staff, Staff::new("Mai", Department::Hk));
        assert!(serde_json::from_str::<Department>("\"hk\"").is_err());
    }
}
