use chrono::{DateTime, Utc};
use std::fmt;

/// Unix time of the GPS epoch, 1980-01-06T00:00:00Z
pub const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// Seconds in one GPS week
pub const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Convert seconds since the GPS epoch to UTC
///
/// Leap seconds are not applied, so the result is GPS time on a civil calendar.
pub fn gps_to_utc(gps_seconds: f64) -> Option<DateTime<Utc>> {
    if !gps_seconds.is_finite() {
        return None;
    }

    let whole = gps_seconds.floor();
    let nanos = ((gps_seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(GPS_EPOCH_UNIX.checked_add(whole as i64)?, nanos)
}

/// Convert a GPS week and seconds-of-week pair to seconds since the GPS epoch
pub fn week_seconds_to_gps(week: u32, seconds_of_week: f64) -> f64 {
    f64::from(week) * SECONDS_PER_WEEK + seconds_of_week
}

/// Format a GPS-epoch timestamp as `YYYY/MM/DD (JJJ) HH:MM:SS.ffffff`
pub fn format_gps_time(gps_seconds: f64) -> String {
    match gps_to_utc(gps_seconds) {
        Some(t) => t.format("%Y/%m/%d (%j) %H:%M:%S%.6f").to_string(),
        None => format!("<invalid time {}>", gps_seconds),
    }
}

/// Start and end of a recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Recording length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start time = {}", format_gps_time(self.start))?;
        write!(f, "End time   = {}", format_gps_time(self.end))
    }
}
