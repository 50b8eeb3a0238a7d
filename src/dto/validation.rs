//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_ROOM_NO_LEN: usize = 8;
const MAX_STAFF_NAME_LEN: usize = 64;
/// Upper bound of rooms touched by one bulk edit.
pub const MAX_BULK_ROOMS: usize = 500;

/// Validates a room number: 1 to 8 ASCII letters or digits.
///
/// # Examples
///
/// ```ignore
/// validate_room_no("101")   // Ok
/// validate_room_no("12A")   // Ok
/// validate_room_no("1 01")  // Err - space
/// ```
pub fn validate_room_no(room_no: &str) -> Result<(), ValidationError> {
    if room_no.is_empty() || room_no.len() > MAX_ROOM_NO_LEN {
        let mut err = ValidationError::new("room_no_length");
        err.message = Some(
            format!(
                "Room number must be 1 to {MAX_ROOM_NO_LEN} characters (got {})",
                room_no.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !room_no.chars().all(|c| c.is_ascii_alphanumeric()) {
        let mut err = ValidationError::new("room_no_format");
        err.message = Some("Room number must contain only letters and digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates the room list of a bulk edit: not empty, bounded, every entry a room number.
pub fn validate_room_numbers(room_numbers: &[String]) -> Result<(), ValidationError> {
    if room_numbers.is_empty() {
        let mut err = ValidationError::new("room_numbers_empty");
        err.message = Some("Select at least one room".into());
        return Err(err);
    }
    if room_numbers.len() > MAX_BULK_ROOMS {
        let mut err = ValidationError::new("room_numbers_too_many");
        err.message = Some(format!("At most {MAX_BULK_ROOMS} rooms per bulk edit").into());
        return Err(err);
    }
    room_numbers
        .iter()
        .try_for_each(|room_no| validate_room_no(room_no))
}

/// Validates a staff name: not blank, at most 64 characters.
pub fn validate_staff_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("staff_name_blank");
        err.message = Some("Staff name is required".into());
        return Err(err);
    }
    if trimmed.chars().count() > MAX_STAFF_NAME_LEN {
        let mut err = ValidationError::new("staff_name_length");
        err.message =
            Some(format!("Staff name must be at most {MAX_STAFF_NAME_LEN} characters").into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_no() {
        assert!(validate_room_no("101").is_ok());
        assert!(validate_room_no("12A").is_ok());
        assert!(validate_room_no("").is_err());
        assert!(validate_room_no("123456789").is_err()); // too long
        assert!(validate_room_no("1 01").is_err());
        assert!(validate_room_no("10/1").is_err());
    }

    #[test]
    fn test_validate_room_numbers() {
        assert!(validate_room_numbers(&["101".into(), "102".into()]).is_ok());
        assert!(validate_room_numbers(&[]).is_err());
        assert!(validate_room_numbers(&["101".into(), "".into()]).is_err());
        let many: Vec<String> = (0..=MAX_BULK_ROOMS).map(|n| n.to_string()).collect();
        assert!(validate_room_numbers(&many).is_err());
    }

    #[test]
    fn test_validate_staff_name() {
        assert!(validate_staff_name("Linh").is_ok());
        assert!(validate_staff_name("   ").is_err());
        assert!(validate_staff_name(&"x".repeat(65)).is_err());
    }
}
