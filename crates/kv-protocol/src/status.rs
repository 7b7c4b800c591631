//! Status channel schema.
//!
//! Subscribe-only. Two shapes arrive: a one-shot backlog replaying the
//! history of an in-progress or just-finished run, and the repeating live
//! status sample. Classification happens here; handlers never sniff raw
//! JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::{ProtocolError, ProtocolResult};

/// One per-zone reading inside a status payload. `Heat` (duty fraction as
/// seconds of on-time per 1 s window) is absent in backlog entries.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ZoneReading {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Heated")]
    pub heated: bool,
    #[serde(rename = "Temp")]
    pub temp: f64,
    #[serde(rename = "Heat", default)]
    pub heat: f64,
}

/// One historical sample from a backlog message.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogSample {
    pub runtime: f64,
    pub temperature: f64,
    #[serde(default)]
    pub zones: Vec<ZoneReading>,
}

/// The repeating live status sample.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LiveStatus {
    /// Authoritative controller state, compared literally (`"RUNNING"` is
    /// the only value with transition semantics).
    pub state: String,
    #[serde(default)]
    pub runtime: f64,
    #[serde(default)]
    pub totaltime: f64,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub zones: Vec<ZoneReading>,
}

#[derive(Debug, Clone, Deserialize)]
struct BacklogWire {
    #[serde(default)]
    profile: Option<ProfileRef>,
    #[serde(default)]
    log: Vec<LogSample>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileRef {
    name: String,
}

/// Classified status payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    /// Historical samples replayed on (re)connect. `profile` pre-selects
    /// the profile the run was started with.
    Backlog {
        profile: Option<String>,
        log: Vec<LogSample>,
    },
    Live(LiveStatus),
}

/// Classify and decode a status payload.
pub fn decode_status(text: &str) -> ProtocolResult<StatusMessage> {
    let value: Value = serde_json::from_str(text)?;
    if value.get("type").and_then(Value::as_str) == Some("backlog") {
        let wire: BacklogWire = serde_json::from_value(value)?;
        return Ok(StatusMessage::Backlog {
            profile: wire.profile.map(|p| p.name),
            log: wire.log,
        });
    }
    if value.get("state").is_some() {
        return Ok(StatusMessage::Live(serde_json::from_value(value)?));
    }
    Err(ProtocolError::UnknownShape { channel: "status" })
}
