//! kv-telemetry: per-zone time-series aggregation.
//!
//! Folds backlog and live status samples into the live (average) series and
//! one series per heated zone, keeps instantaneous readings for every zone,
//! and derives the run readouts (progress, remaining time, ETA, hazard).

pub mod aggregator;
pub mod readout;
pub mod series;

pub use aggregator::{Aggregator, HeatPulse, ZoneState};
pub use readout::{format_hms, RunReadout};
pub use series::{Point, TimeSeries};
