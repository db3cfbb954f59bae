use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::NavigationRecord;

/// Radians to degrees
pub const RAD_TO_DEG: f64 = 180.0 / PI;

/// Camera standoff added to the altitude of the overhead view (meters)
pub const OVERVIEW_ALTITUDE_OFFSET_M: f64 = 10_000.0;

/// Tilt of a level camera in the perspective convention (degrees)
const LEVEL_TILT_DEG: f64 = 90.0;

/// Camera description derived from one navigation record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude_deg: f64,
    pub latitude_deg: f64,

    /// Raw record altitude (meters)
    pub altitude_m: f64,

    /// Platform heading corrected for wander angle, not wrapped into [0, 360)
    pub heading_deg: f64,

    /// Positive banks right
    pub roll_deg: f64,

    /// 90 when the platform is level
    pub tilt_deg: f64,
}

impl ViewState {
    /// Derive the view-state for a record
    ///
    /// Pure numeric transform: non-finite inputs come out non-finite.
    pub fn from_record(record: &NavigationRecord) -> Self {
        Self {
            longitude_deg: record.longitude * RAD_TO_DEG,
            latitude_deg: record.latitude * RAD_TO_DEG,
            altitude_m: record.altitude,
            heading_deg: (record.platform_heading - record.wander_angle) * RAD_TO_DEG,
            roll_deg: -(record.roll * RAD_TO_DEG),
            tilt_deg: (record.pitch * RAD_TO_DEG) + LEVEL_TILT_DEG,
        }
    }

    /// Altitude of the overhead camera
    pub fn overview_altitude_m(&self) -> f64 {
        self.altitude_m + OVERVIEW_ALTITUDE_OFFSET_M
    }
}

impl From<&NavigationRecord> for ViewState {
    fn from(record: &NavigationRecord) -> Self {
        Self::from_record(record)
    }
}
