//! Session configuration.
//!
//! Declared once by the controller on the config channel at bootstrap and
//! immutable for the session lifetime.

use serde::{Deserialize, Serialize};

use crate::units::{TempUnit, TimeUnit};

/// An independently monitored region of the kiln. A heated zone carries a
/// temperature time series; an unheated one only has a live reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub heated: bool,
}

/// Server-declared session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub temp_scale: TempUnit,
    /// Unit for slope readouts (degrees per this unit).
    pub time_scale_slope: TimeUnit,
    /// Unit for the profile time axis and waypoint table.
    pub time_scale_profile: TimeUnit,
    /// Electricity price per kWh, in `currency_type`.
    pub kwh_rate: f64,
    pub currency_type: String,
    /// Above this process temperature the hazard indicator lights.
    pub hazard_temp: f64,
    pub zones: Vec<Zone>,
}

impl Config {
    pub fn heated_zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| z.heated)
    }
}
