//! Config channel schema.
//!
//! The client opens with the literal string `"GET"`; the controller answers
//! once with the session configuration. Zone keys are PascalCase on the
//! wire; they are normalized into [`kv_core::Zone`] here.

use kv_core::{Config, TempUnit, TimeUnit, Zone};
use serde::Deserialize;

use crate::ProtocolResult;

/// The only thing the client ever sends on the config channel.
pub const CONFIG_REQUEST: &str = "GET";

#[derive(Debug, Deserialize)]
struct ConfigWire {
    temp_scale: String,
    time_scale_slope: String,
    time_scale_profile: String,
    kwh_rate: f64,
    currency_type: String,
    hazard_temp: f64,
    #[serde(default)]
    zones: Vec<ZoneWire>,
}

#[derive(Debug, Deserialize)]
struct ZoneWire {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Heated")]
    heated: bool,
}

/// Decode the configuration payload.
pub fn decode_config(text: &str) -> ProtocolResult<Config> {
    let wire: ConfigWire = serde_json::from_str(text)?;
    Ok(Config {
        temp_scale: TempUnit::from_wire(&wire.temp_scale),
        time_scale_slope: TimeUnit::from_wire(&wire.time_scale_slope),
        time_scale_profile: TimeUnit::from_wire(&wire.time_scale_profile),
        kwh_rate: wire.kwh_rate,
        currency_type: wire.currency_type,
        hazard_temp: wire.hazard_temp,
        zones: wire
            .zones
            .into_iter()
            .map(|z| Zone {
                name: z.name,
                heated: z.heated,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_payload() {
        let text = r#"{
            "temp_scale": "f",
            "time_scale_slope": "h",
            "time_scale_profile": "m",
            "kwh_rate": 0.26,
            "currency_type": "EUR",
            "hazard_temp": 1200,
            "zones": [
                {"Name": "top", "Heated": true},
                {"Name": "exhaust", "Heated": false}
            ]
        }"#;
        let cfg = decode_config(text).unwrap();
        assert_eq!(cfg.temp_scale, TempUnit::Fahrenheit);
        assert_eq!(cfg.time_scale_slope, TimeUnit::Hours);
        assert_eq!(cfg.time_scale_profile, TimeUnit::Minutes);
        assert_eq!(cfg.zones.len(), 2);
        assert!(cfg.zones[0].heated);
        assert_eq!(cfg.zones[1].name, "exhaust");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_config("not json").is_err());
        assert!(decode_config(r#"{"zones": []}"#).is_err());
    }
}
