use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use utoipa::ToSchema;

/// Suffix appended to the base status when an arrival is expected.
pub const ARRIVAL_SUFFIX: &str = "arr";

/// Housekeeping status of a room, without the arrival flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BaseStatus {
    /// Vacant dirty.
    Vd,
    /// Vacant clean.
    Vc,
    /// Due out: the resident guest leaves today.
    Do,
    /// Occupied dirty.
    Od,
    /// Occupied clean.
    Oc,
    /// Do not disturb.
    Dnd,
    /// No service requested.
    Nn,
    /// Locked, out of order.
    Lock,
    /// Inspected and ready for the arriving guest.
    Ip,
}

impl BaseStatus {
    /// Every base status, in dashboard display order.
    pub const ALL: [BaseStatus; 9] = [
        BaseStatus::Vd,
        BaseStatus::Vc,
        BaseStatus::Do,
        BaseStatus::Od,
        BaseStatus::Oc,
        BaseStatus::Dnd,
        BaseStatus::Nn,
        BaseStatus::Lock,
        BaseStatus::Ip,
    ];

    /// Wire code of the status (`vd`, `oc`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            BaseStatus::Vd => "vd",
            BaseStatus::Vc => "vc",
            BaseStatus::Do => "do",
            BaseStatus::Od => "od",
            BaseStatus::Oc => "oc",
            BaseStatus::Dnd => "dnd",
            BaseStatus::Nn => "nn",
            BaseStatus::Lock => "lock",
            BaseStatus::Ip => "ip",
        }
    }

    /// Human readable label shown next to transition buttons.
    pub fn label(self) -> &'static str {
        match self {
            BaseStatus::Vd => "Vacant Dirty",
            BaseStatus::Vc => "Vacant Clean",
            BaseStatus::Do => "Due Out",
            BaseStatus::Od => "Occupied Dirty",
            BaseStatus::Oc => "Occupied Clean",
            BaseStatus::Dnd => "Do Not Disturb",
            BaseStatus::Nn => "No Service",
            BaseStatus::Lock => "Lock",
            BaseStatus::Ip => "Inspected",
        }
    }

    /// Statuses reachable from `self` in a single step.
    pub fn targets(self) -> &'static [BaseStatus] {
        use BaseStatus::*;

        match self {
            Do => &[Vd],
            Vd => &[Vc, Lock],
            Lock => &[Vd],
            Vc => &[Vd, Ip],
            Ip => &[Vc],
            Oc => &[Od],
            Od => &[Oc, Dnd, Nn],
            Dnd => &[Nn, Oc, Od],
            Nn => &[Dnd, Oc, Od],
        }
    }

    /// Whether nobody resides in the room.
    pub fn is_vacant(self) -> bool {
        matches!(self, BaseStatus::Vd | BaseStatus::Vc)
    }

    /// Whether an arriving guest may be attached to a room in this status.
    pub fn can_have_arrival(self) -> bool {
        matches!(self, BaseStatus::Vd | BaseStatus::Vc | BaseStatus::Do)
    }
}

impl fmt::Display for BaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseStatus {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        BaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| EngineError::UnknownStatus(value.to_owned()))
    }
}

/// Return true iff `to` is listed as a successor of `from` in the transition table.
pub fn can_transition(from: BaseStatus, to: BaseStatus) -> bool {
    from.targets().contains(&to)
}

/// Base status paired with the arrival flag.
///
/// The flag can only be set on arrival-eligible statuses: [`CompositeStatus::new`]
/// drops it otherwise, so every value of this type is consistent. It serializes to
/// `base` or `base/arr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct CompositeStatus {
    base: BaseStatus,
    arrival: bool,
}

impl CompositeStatus {
    /// Compose a status, silently dropping the arrival flag when `base` cannot carry it.
    pub fn new(base: BaseStatus, arrival: bool) -> Self {
        Self {
            base,
            arrival: arrival && base.can_have_arrival(),
        }
    }

    /// Status without an expected arrival.
    pub fn plain(base: BaseStatus) -> Self {
        Self::new(base, false)
    }

    /// The underlying housekeeping status.
    pub fn base(&self) -> BaseStatus {
        self.base
    }

    /// Whether a guest is expected to arrive.
    pub fn has_arrival(&self) -> bool {
        self.arrival
    }
}

impl From<BaseStatus> for CompositeStatus {
    fn from(base: BaseStatus) -> Self {
        Self::plain(base)
    }
}

impl fmt::Display for CompositeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arrival {
            write!(f, "{}/{}", self.base, ARRIVAL_SUFFIX)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

impl FromStr for CompositeStatus {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((base, suffix)) => {
                if !suffix.trim().eq_ignore_ascii_case(ARRIVAL_SUFFIX) {
                    return Err(EngineError::InvalidSuffix(value.to_owned()));
                }
                Ok(Self::new(base.parse()?, true))
            }
            None => Ok(Self::plain(value.parse()?)),
        }
    }
}

/// Errors raised by the room status engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested target is not reachable from the current base status.
    #[error("invalid transition: {from} cannot move to {to}")]
    InvalidTransition {
        /// Base status the room was in.
        from: BaseStatus,
        /// Requested target status.
        to: BaseStatus,
    },
    /// The status code is not one of the known base statuses.
    #[error("unknown room status `{0}`")]
    UnknownStatus(String),
    /// The composite status carries a suffix other than `/arr`.
    #[error("invalid status suffix in `{0}`")]
    InvalidSuffix(String),
}
