//! Derived run readouts.
//!
//! Recomputed from every live sample while a run is in progress: progress
//! percentage, remaining seconds, the ETA wall-clock timestamp, and the
//! hazard flag.

use chrono::{DateTime, Duration, Local};
use kv_protocol::LiveStatus;

/// Format whole seconds as `HH:MM:SS`.
pub fn format_hms(total_s: u64) -> String {
    let hours = total_s / 3600;
    let minutes = (total_s % 3600) / 60;
    let seconds = total_s % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReadout {
    /// Clamped to [0, 100]; 0 when totaltime is unknown.
    pub progress_pct: f64,
    pub remaining_s: u64,
    /// Wall-clock completion estimate.
    pub eta: DateTime<Local>,
    pub target: Option<f64>,
    pub hazard: bool,
}

impl RunReadout {
    pub fn derive(live: &LiveStatus, hazard: bool) -> Self {
        Self::derive_at(live, hazard, Local::now())
    }

    /// Deterministic variant for tests: `now` is injected.
    pub fn derive_at(live: &LiveStatus, hazard: bool, now: DateTime<Local>) -> Self {
        let progress_pct = if live.totaltime > 0.0 {
            (live.runtime / live.totaltime * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        let remaining_s = (live.totaltime - live.runtime).max(0.0) as u64;
        Self {
            progress_pct,
            remaining_s,
            eta: now + Duration::seconds(remaining_s as i64),
            target: live.target,
            hazard,
        }
    }

    /// Countdown readout, `HH:MM:SS`.
    pub fn remaining_hms(&self) -> String {
        format_hms(self.remaining_s)
    }

    /// ETA as a local clock time, `HH:MM:SS`.
    pub fn eta_clock(&self) -> String {
        self.eta.format("%H:%M:%S").to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Progress stays in [0, 100] under any runtime/totaltime skew.
        #[test]
        fn progress_always_clamped(runtime in -1.0e6..1.0e6f64, totaltime in -1.0e6..1.0e6f64) {
            let readout = RunReadout::derive(&live_with(runtime, totaltime), false);
            prop_assert!((0.0..=100.0).contains(&readout.progress_pct));
        }
    }

    fn live_with(runtime: f64, totaltime: f64) -> LiveStatus {
        LiveStatus {
            state: "RUNNING".to_string(),
            runtime,
            totaltime,
            temperature: 0.0,
            target: None,
            zones: vec![],
        }
    }
}
