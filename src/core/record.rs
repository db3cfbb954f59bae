use serde::{Deserialize, Serialize};

/// A single decoded navigation sample
///
/// Angles are in radians and the timestamp is seconds since the GPS epoch.
/// Only the position/attitude fields feed the view-state; the dynamics
/// fields are carried for the per-tick record dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationRecord {
    /// Seconds since 1980-01-06T00:00:00Z
    pub timestamp: f64,

    /// Geodetic latitude (radians)
    pub latitude: f64,

    /// Geodetic longitude (radians)
    pub longitude: f64,

    /// Ellipsoidal altitude (meters, positive up)
    pub altitude: f64,

    pub x_velocity: f64,
    pub y_velocity: f64,
    pub z_velocity: f64,

    /// Roll (radians)
    pub roll: f64,

    /// Pitch (radians)
    pub pitch: f64,

    /// Platform heading relative to the wander frame (radians)
    pub platform_heading: f64,

    /// Wander angle (radians)
    pub wander_angle: f64,

    pub x_acceleration: f64,
    pub y_acceleration: f64,
    pub z_acceleration: f64,

    pub x_angular_rate: f64,
    pub y_angular_rate: f64,
    pub z_angular_rate: f64,
}

impl NavigationRecord {
    /// One-line dump of the record, in degrees where it helps reading
    pub fn summary(&self) -> String {
        format!(
            "t={:.6} lat={:.9} lon={:.9} alt={:.3} roll={:.4} pitch={:.4} hdg={:.4} wander={:.4} vel=({:.3},{:.3},{:.3})",
            self.timestamp,
            self.latitude.to_degrees(),
            self.longitude.to_degrees(),
            self.altitude,
            self.roll.to_degrees(),
            self.pitch.to_degrees(),
            self.platform_heading.to_degrees(),
            self.wander_angle.to_degrees(),
            self.x_velocity,
            self.y_velocity,
            self.z_velocity,
        )
    }
}
