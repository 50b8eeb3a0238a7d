use dashmap::{DashMap, mapref::entry::Entry};
use thiserror::Error;
use uuid::Uuid;

/// Registry of rooms currently being edited.
///
/// A room can be held by one editing context at a time; the claim is released when
/// the returned [`RoomClaim`] is dropped.
#[derive(Debug, Default)]
pub struct EditSessions {
    claims: DashMap<String, Uuid>,
}

/// Another editing context already holds the room.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("room {room_no} is being edited")]
pub struct RoomBusy {
    /// Room that could not be claimed.
    pub room_no: String,
}

impl EditSessions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim exclusive editing rights on `room_no`.
    pub fn claim(&self, room_no: &str) -> Result<RoomClaim<'_>, RoomBusy> {
        match self.claims.entry(room_no.to_owned()) {
            Entry::Occupied(_) => Err(RoomBusy {
                room_no: room_no.to_owned(),
            }),
            Entry::Vacant(slot) => {
                let id = Uuid::new_v4();
                slot.insert(id);
                Ok(RoomClaim {
                    sessions: self,
                    room_no: room_no.to_owned(),
                    id,
                })
            }
        }
    }

    /// Whether someone currently edits `room_no`.
    pub fn is_claimed(&self, room_no: &str) -> bool {
        self.claims.contains_key(room_no)
    }
}

/// Guard over a room claim; dropping it releases the room.
#[derive(Debug)]
pub struct RoomClaim<'a> {
    sessions: &'a EditSessions,
    room_no: String,
    id: Uuid,
}

impl RoomClaim<'_> {
    /// Claimed room.
    pub fn room_no(&self) -> &str {
        &self.room_no
    }

    /// Identifier of this editing context.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for RoomClaim<'_> {
    fn drop(&mut self) {
        self.sessions
            .claims
            .remove_if(&self.room_no, |_, holder| *holder == self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let sessions = EditSessions::new();
        let claim = sessions.claim("101").unwrap();
        assert_eq!(claim.room_no(), "101");
        assert!(sessions.is_claimed("101"));
        assert_eq!(
            sessions.claim("101").unwrap_err(),
            RoomBusy {
                room_no: "101".into()
            }
        );

        let other = sessions.claim("102").unwrap();
        assert_ne!(claim.id(), other.id());

        drop(claim);
        assert!(!sessions.is_claimed("101"));
        assert!(sessions.claim("101").is_ok());
    }
}
