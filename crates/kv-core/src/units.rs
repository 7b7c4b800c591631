//! Display-unit conversions.
//!
//! Canonical storage units are integer seconds and degrees Celsius. The
//! server declares which units the operator display uses; everything here
//! converts at that boundary and nowhere else.

use serde::{Deserialize, Serialize};

/// Time unit used for the profile axis or slope display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Parse the wire string (`"s"`, `"m"`, `"h"`). Unknown strings fall
    /// back to seconds, matching the controller's own default.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "m" => TimeUnit::Minutes,
            "h" => TimeUnit::Hours,
            _ => TimeUnit::Seconds,
        }
    }

    /// Seconds per one unit of this scale.
    pub fn seconds_per_unit(self) -> u32 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3600,
        }
    }

    /// Convert canonical seconds into this display unit (integer division).
    pub fn to_display(self, seconds: u32) -> u32 {
        seconds / self.seconds_per_unit()
    }

    /// Convert a display value back into canonical seconds.
    pub fn to_canonical(self, display: u32) -> u32 {
        display.saturating_mul(self.seconds_per_unit())
    }

    /// Label for table headers ("Seconds", "Minutes", "Hours").
    pub fn long_name(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "Seconds",
            TimeUnit::Minutes => "Minutes",
            TimeUnit::Hours => "Hours",
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "m",
            TimeUnit::Hours => "h",
        }
    }
}

/// Temperature unit for operator displays. Stored values stay Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Parse the wire string (`"c"`, `"f"`); defaults to Celsius.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "f" => TempUnit::Fahrenheit,
            _ => TempUnit::Celsius,
        }
    }

    /// Map a stored Celsius value into this display unit.
    pub fn scale_celsius(self, celsius: f64) -> f64 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// Display symbol without the degree sign ("C" / "F").
    pub fn symbol(self) -> &'static str {
        match self {
            TempUnit::Celsius => "C",
            TempUnit::Fahrenheit => "F",
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Display -> canonical -> display is the identity for every
        // representable display value in every supported unit.
        #[test]
        fn display_roundtrip(v in 0u32..1_000_000, unit_ix in 0usize..3) {
            let unit = [TimeUnit::Seconds, TimeUnit::Minutes, TimeUnit::Hours][unit_ix];
            prop_assert_eq!(unit.to_display(unit.to_canonical(v)), v);
        }
    }
}
