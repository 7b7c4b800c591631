//! Control channel schema.
//!
//! Client sends run commands; the only traffic back is simulation
//! feedback samples.

use serde::{Deserialize, Serialize};

use crate::storage::ProfileRecord;
use crate::ProtocolResult;

/// Operator command to the controller. RUN and SIMULATE carry the full
/// selected profile so the controller needs no storage lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ControlCommand {
    #[serde(rename = "RUN")]
    Run { profile: ProfileRecord },
    #[serde(rename = "SIMULATE")]
    Simulate { profile: ProfileRecord },
    #[serde(rename = "STOP")]
    Stop,
}

impl ControlCommand {
    pub fn encode(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Simulation feedback: one synthetic sample per message.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SimSample {
    pub runtime: f64,
    pub temperature: f64,
}

pub fn decode_control_feedback(text: &str) -> ProtocolResult<SimSample> {
    Ok(serde_json::from_str(text)?)
}
