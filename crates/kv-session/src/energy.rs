//! Energy and cost estimation for a selected profile.

use kv_profile::Profile;

/// Nominal kiln element power draw, watts. The controller assumes full
/// draw for the whole schedule, so this is an upper bound, not a forecast.
pub const KILN_POWER_W: f64 = 3850.0;

/// Estimated energy use and cost for running a profile to its last
/// waypoint. Both values carry two-decimal display rounding, and cost is
/// computed from the rounded kWh figure, matching the console's readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyEstimate {
    pub kwh: f64,
    pub cost: f64,
}

impl EnergyEstimate {
    pub fn for_profile(profile: &Profile, kwh_rate: f64) -> Self {
        let job_seconds = profile.duration_s() as f64;
        let kwh = round2(KILN_POWER_W * job_seconds / 3600.0 / 1000.0);
        Self {
            kwh,
            cost: round2(kwh * kwh_rate),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
