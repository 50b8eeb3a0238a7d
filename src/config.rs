//! Application-level configuration loading: report window and seed source.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::UtcOffset;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ROOM_BOARD_CONFIG_PATH";
/// Hotel local time, UTC+7.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 7 * 60;
const DEFAULT_SEED_PATH: &str = "data/rooms.json";
const DEFAULT_ROOM_HISTORY_LIMIT: usize = 50;

/// Local time of day at which the daily activity report starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReportStart {
    /// Hour, 0 to 23.
    pub hour: u8,
    /// Minute, 0 to 59.
    pub minute: u8,
}

impl ReportStart {
    /// Offset of this time from local midnight, in seconds.
    pub fn seconds_from_midnight(&self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60
    }

    fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60
    }
}

impl Default for ReportStart {
    fn default() -> Self {
        Self { hour: 8, minute: 15 }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Start of the daily activity report window, local time.
    pub report_start: ReportStart,
    /// Offset of hotel local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// JSON file the room list is (re)loaded from.
    pub seed_path: PathBuf,
    /// Maximum number of entries returned by the room history.
    pub room_history_limit: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        seed = %app_config.seed_path.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Hotel local offset; UTC when the configured minutes are out of range.
    pub fn utc_offset(&self) -> UtcOffset {
        UtcOffset::from_whole_seconds(self.utc_offset_minutes * 60).unwrap_or(UtcOffset::UTC)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_start: ReportStart::default(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            seed_path: PathBuf::from(DEFAULT_SEED_PATH),
            room_history_limit: DEFAULT_ROOM_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    report_start: Option<ReportStart>,
    utc_offset_minutes: Option<i32>,
    seed_path: Option<PathBuf>,
    room_history_limit: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();

        let report_start = match value.report_start {
            Some(start) if start.is_valid() => start,
            Some(start) => {
                warn!(?start, "report start out of range; using default");
                defaults.report_start
            }
            None => defaults.report_start,
        };

        Self {
            report_start,
            utc_offset_minutes: value
                .utc_offset_minutes
                .filter(|offset| offset.abs() < 24 * 60)
                .unwrap_or(defaults.utc_offset_minutes),
            seed_path: value
                .seed_path
                .filter(|path| !path.as_os_str().is_empty())
                .unwrap_or(defaults.seed_path),
            room_history_limit: value
                .room_history_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.room_history_limit),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let raw: RawConfig = serde_json::from_str(r#"{"room_history_limit": 20}"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.room_history_limit, 20);
        assert_eq!(config.report_start, ReportStart { hour: 8, minute: 15 });
        assert_eq!(config.utc_offset_minutes, 420);
        assert_eq!(config.seed_path, PathBuf::from("data/rooms.json"));
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"report_start": {"hour": 25, "minute": 0}, "room_history_limit": 0, "utc_offset_minutes": -60}"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.report_start, ReportStart::default());
        assert_eq!(config.room_history_limit, 50);
        assert_eq!(config.utc_offset_minutes, -60);
    }
}
