//! Telemetry aggregation.
//!
//! The aggregator is registered with the zone set at bootstrap, before any
//! telemetry can arrive. Backlog samples are folded in arrival order with
//! no deduplication; the transport guarantees they are chronological and
//! disjoint from subsequent live samples.

use kv_core::Zone;
use kv_protocol::{LiveStatus, LogSample, SimSample, ZoneReading};
use tracing::debug;

use crate::series::TimeSeries;

/// Request to flash a zone's heat indicator for `duration_ms`. The
/// presentation layer schedules it; overlapping pulses for the same zone
/// stack rather than cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatPulse {
    pub zone: String,
    pub duration_ms: u64,
}

/// Live display state for one zone. Heated zones additionally own a series
/// in the aggregator; unheated zones only ever have this.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneState {
    pub zone: Zone,
    /// Latest instantaneous temperature, if any sample has arrived.
    pub reading: Option<f64>,
    /// Latest heat duty (seconds of on-time per sample window).
    pub heat_duty: f64,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    hazard_temp: f64,
    hazard: bool,
    process_temp: Option<f64>,
    live: TimeSeries,
    zones: Vec<ZoneState>,
    /// Heated zones, in declared order. Parallel to the subset of `zones`
    /// with `heated == true`.
    zone_series: Vec<TimeSeries>,
}

impl Aggregator {
    pub fn new(zones: &[Zone], hazard_temp: f64) -> Self {
        Self {
            hazard_temp,
            hazard: false,
            process_temp: None,
            live: TimeSeries::new("AVG"),
            zones: zones
                .iter()
                .map(|zone| ZoneState {
                    zone: zone.clone(),
                    reading: None,
                    heat_duty: 0.0,
                })
                .collect(),
            zone_series: zones
                .iter()
                .filter(|z| z.heated)
                .map(|z| TimeSeries::new(z.name.clone()))
                .collect(),
        }
    }

    pub fn live_series(&self) -> &TimeSeries {
        &self.live
    }

    pub fn zone_series(&self) -> &[TimeSeries] {
        &self.zone_series
    }

    pub fn zones(&self) -> &[ZoneState] {
        &self.zones
    }

    pub fn hazard(&self) -> bool {
        self.hazard
    }

    pub fn process_temperature(&self) -> Option<f64> {
        self.process_temp
    }

    /// Fold historical samples into the live and heated-zone series, in
    /// arrival order. Instantaneous readings are untouched; the next live
    /// sample refreshes those.
    pub fn apply_backlog(&mut self, log: &[LogSample]) {
        for sample in log {
            self.live.push(sample.runtime, sample.temperature);
            self.append_zone_points(sample.runtime, &sample.zones);
        }
    }

    /// Append one live sample to the series and refresh every zone's
    /// instantaneous state.
    pub fn apply_live(&mut self, live: &LiveStatus) -> Vec<HeatPulse> {
        self.live.push(live.runtime, live.temperature);
        self.append_zone_points(live.runtime, &live.zones);
        self.refresh_instantaneous(&live.zones, live.temperature)
    }

    /// Refresh instantaneous readings and the hazard flag without touching
    /// any series. Used while the operator is editing, so the draft's
    /// series can never be clobbered by concurrent telemetry.
    pub fn instantaneous_update(&mut self, zones: &[ZoneReading], temperature: f64) -> Vec<HeatPulse> {
        self.refresh_instantaneous(zones, temperature)
    }

    /// Simulation feedback from the control channel: live series only.
    pub fn apply_simulation(&mut self, sample: SimSample) {
        self.live.push(sample.runtime, sample.temperature);
    }

    /// Empty every non-profile series. Called when a run command is sent.
    pub fn clear_run_series(&mut self) {
        self.live.clear();
        for series in &mut self.zone_series {
            series.clear();
        }
    }

    /// Empty the live series only (simulation launch).
    pub fn clear_live_series(&mut self) {
        self.live.clear();
    }

    fn append_zone_points(&mut self, runtime: f64, readings: &[ZoneReading]) {
        for reading in readings.iter().filter(|r| r.heated) {
            match self
                .zone_series
                .iter_mut()
                .find(|s| s.label() == reading.name)
            {
                Some(series) => series.push(runtime, reading.temp),
                None => debug!(zone = %reading.name, "dropping sample for undeclared zone"),
            }
        }
    }

    fn refresh_instantaneous(
        &mut self,
        readings: &[ZoneReading],
        temperature: f64,
    ) -> Vec<HeatPulse> {
        let mut pulses = Vec::new();
        for reading in readings {
            let Some(state) = self
                .zones
                .iter_mut()
                .find(|z| z.zone.name == reading.name)
            else {
                debug!(zone = %reading.name, "dropping reading for undeclared zone");
                continue;
            };
            state.reading = Some(reading.temp);
            state.heat_duty = reading.heat;
            if state.zone.heated && reading.heat > 0.0 {
                pulses.push(HeatPulse {
                    zone: reading.name.clone(),
                    duration_ms: (reading.heat * 1000.0 - 5.0).max(0.0) as u64,
                });
            }
        }
        self.process_temp = Some(temperature);
        self.hazard = temperature > self.hazard_temp;
        pulses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> Vec<Zone> {
        vec![
            Zone {
                name: "top".to_string(),
                heated: true,
            },
            Zone {
                name: "bottom".to_string(),
                heated: true,
            },
            Zone {
                name: "exhaust".to_string(),
                heated: false,
            },
        ]
    }

    fn reading(name: &str, heated: bool, temp: f64, heat: f64) -> ZoneReading {
        ZoneReading {
            name: name.to_string(),
            heated,
            temp,
            heat,
        }
    }

    fn live(runtime: f64, temperature: f64, zone_readings: Vec<ZoneReading>) -> LiveStatus {
        LiveStatus {
            state: "RUNNING".to_string(),
            runtime,
            totaltime: 7200.0,
            temperature,
            target: None,
            zones: zone_readings,
        }
    }

    #[test]
    fn backlog_folds_in_order_without_dedup() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        let log = vec![
            LogSample {
                runtime: 0.0,
                temperature: 21.0,
                zones: vec![reading("top", true, 21.0, 0.0)],
            },
            LogSample {
                runtime: 2.0,
                temperature: 22.0,
                zones: vec![reading("top", true, 22.3, 0.0)],
            },
            LogSample {
                runtime: 2.0,
                temperature: 22.0,
                zones: vec![reading("top", true, 22.3, 0.0)],
            },
        ];
        agg.apply_backlog(&log);
        assert_eq!(agg.live_series().len(), 3);
        assert_eq!(agg.zone_series()[0].len(), 3);
        assert_eq!(agg.zone_series()[1].len(), 0);
        // backlog never touches instantaneous state
        assert_eq!(agg.zones()[0].reading, None);
    }

    #[test]
    fn live_appends_series_and_refreshes_instants() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        let pulses = agg.apply_live(&live(
            10.0,
            250.0,
            vec![
                reading("top", true, 251.0, 0.8),
                reading("exhaust", false, 90.0, 0.0),
            ],
        ));
        assert_eq!(agg.live_series().len(), 1);
        assert_eq!(agg.zone_series()[0].len(), 1);
        assert_eq!(agg.zones()[0].reading, Some(251.0));
        assert_eq!(agg.zones()[2].reading, Some(90.0));
        assert_eq!(
            pulses,
            vec![HeatPulse {
                zone: "top".to_string(),
                duration_ms: 795,
            }]
        );
    }

    #[test]
    fn unheated_zone_never_accumulates_a_series() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        agg.apply_live(&live(5.0, 100.0, vec![reading("exhaust", false, 80.0, 0.0)]));
        assert!(agg.zone_series().iter().all(|s| s.label() != "exhaust"));
        assert_eq!(agg.zones()[2].reading, Some(80.0));
    }

    #[test]
    fn instantaneous_update_leaves_series_alone() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        let pulses =
            agg.instantaneous_update(&[reading("top", true, 400.0, 0.5)], 398.0);
        assert!(agg.live_series().is_empty());
        assert!(agg.zone_series()[0].is_empty());
        assert_eq!(agg.zones()[0].reading, Some(400.0));
        assert_eq!(pulses.len(), 1);
    }

    #[test]
    fn hazard_flag_tracks_threshold() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        agg.instantaneous_update(&[], 1200.0);
        assert!(!agg.hazard());
        agg.instantaneous_update(&[], 1200.5);
        assert!(agg.hazard());
    }

    #[test]
    fn undeclared_zone_is_dropped() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        agg.apply_live(&live(1.0, 25.0, vec![reading("mystery", true, 25.0, 0.2)]));
        assert!(agg.zones().iter().all(|z| z.reading.is_none()));
        assert_eq!(agg.zone_series()[0].len(), 0);
    }

    #[test]
    fn clear_run_series_keeps_nothing() {
        let mut agg = Aggregator::new(&zones(), 1200.0);
        agg.apply_live(&live(1.0, 25.0, vec![reading("top", true, 25.0, 0.0)]));
        agg.apply_simulation(SimSample {
            runtime: 2.0,
            temperature: 26.0,
        });
        agg.clear_run_series();
        assert!(agg.live_series().is_empty());
        assert!(agg.zone_series().iter().all(TimeSeries::is_empty));
    }
}
