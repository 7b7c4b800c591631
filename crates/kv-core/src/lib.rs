//! kv-core: stable foundation for kilnview.
//!
//! Contains:
//! - units (display-unit conversions for time and temperature)
//! - config (session configuration and zone declarations)

pub mod config;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use config::{Config, Zone};
pub use units::{TempUnit, TimeUnit};
