//! Persisted profile model and display derivations.

use kv_core::TimeUnit;
use serde::{Deserialize, Serialize};

/// One control point of a firing schedule. Times are canonical seconds,
/// temperatures canonical degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub time_s: u32,
    pub temperature: i32,
}

impl Waypoint {
    pub fn new(time_s: u32, temperature: i32) -> Self {
        Self { time_s, temperature }
    }
}

/// A named, committed firing schedule. Construction goes through
/// [`crate::ProfileDraft::finalize`], so waypoint times are strictly
/// increasing in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub waypoints: Vec<Waypoint>,
}

impl Profile {
    /// Total job duration: the last waypoint's time, or 0 when empty.
    pub fn duration_s(&self) -> u32 {
        self.waypoints.last().map_or(0, |w| w.time_s)
    }
}

/// Direction of a schedule segment, for the waypoint-table trend marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

/// Slope of one segment, scaled to degrees per display time unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slope {
    pub degrees_per_unit: f64,
    pub trend: Trend,
}

/// Slopes between consecutive waypoints. Entry `i` covers the segment
/// ending at waypoint `i + 1`. Magnitudes are absolute; the sign lives in
/// `trend`. A zero-length segment (possible mid-edit) reads as flat.
pub fn slope_segments(waypoints: &[Waypoint], unit: TimeUnit) -> Vec<Slope> {
    waypoints
        .windows(2)
        .map(|pair| {
            let dt = pair[1].time_s as f64 - pair[0].time_s as f64;
            let dtemp = (pair[1].temperature - pair[0].temperature) as f64;
            if dt <= 0.0 || dtemp == 0.0 {
                return Slope {
                    degrees_per_unit: 0.0,
                    trend: Trend::Flat,
                };
            }
            let per_s = dtemp / dt;
            Slope {
                degrees_per_unit: per_s.abs() * unit.seconds_per_unit() as f64,
                trend: if per_s > 0.0 {
                    Trend::Rising
                } else {
                    Trend::Falling
                },
            }
        })
        .collect()
}
