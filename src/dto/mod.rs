use std::time::SystemTime;
use time::{OffsetDateTime, UtcOffset, format_description::well_known::Rfc3339};

pub mod health;
pub mod report;
pub mod room;
pub mod sse;
pub mod staff;
pub mod validation;

/// RFC 3339 rendering of `time` in the hotel's local offset.
fn format_system_time(time: SystemTime, offset: UtcOffset) -> String {
    OffsetDateTime::from(time)
        .to_offset(offset)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn formats_in_local_offset() {
        let offset = UtcOffset::from_whole_seconds(7 * 3600).unwrap();
        let time = UNIX_EPOCH + Duration::from_secs(1_750_000_000);
        assert_eq!(format_system_time(time, offset), "2025-06-15T22:06:40+07:00");
    }
}
