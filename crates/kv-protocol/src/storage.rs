//! Storage channel schema.
//!
//! Request/response, request-initiated only. Requests are the literal
//! string `"GET"` or a JSON command object; responses are either the full
//! profile list (a bare array) or a conflict echo carrying
//! `resp: "FAIL"`. No request identifiers exist on the wire; correlation
//! is by shape, so the client keeps at most one mutating round trip in
//! flight (enforced in kv-storage, not here).

use kv_profile::{Profile, Waypoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ProtocolError, ProtocolResult};

/// Wire request for the full profile list.
pub const STORAGE_LIST_REQUEST: &str = "GET";

/// A persisted profile as the storage channel carries it: waypoint data as
/// `[seconds, celsius]` integer pairs in canonical units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    #[serde(default)]
    pub data: Vec<(u32, i32)>,
}

impl ProfileRecord {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            data: profile
                .waypoints
                .iter()
                .map(|w| (w.time_s, w.temperature))
                .collect(),
        }
    }

    pub fn to_profile(&self) -> Profile {
        Profile {
            name: self.name.clone(),
            waypoints: self
                .data
                .iter()
                .map(|&(t, temp)| Waypoint::new(t, temp))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredProfileWire {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
    name: String,
}

/// Mutating storage requests. List refresh is [`STORAGE_LIST_REQUEST`],
/// a bare string rather than JSON, hence not part of this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageRequest {
    Put { record: ProfileRecord, force: bool },
    Delete { name: String },
}

#[derive(Debug, Serialize)]
struct CommandWire {
    cmd: &'static str,
    profile: StoredProfileWire,
    #[serde(skip_serializing_if = "Option::is_none")]
    force: Option<bool>,
}

impl StorageRequest {
    /// Encode to the wire. PUT carries the waypoint pairs; DELETE carries
    /// an empty-string data field, which the server ignores.
    pub fn encode(&self) -> ProtocolResult<String> {
        let wire = match self {
            StorageRequest::Put { record, force } => CommandWire {
                cmd: "PUT",
                profile: StoredProfileWire {
                    kind: "profile".to_string(),
                    data: serde_json::to_value(&record.data)?,
                    name: record.name.clone(),
                },
                force: force.then_some(true),
            },
            StorageRequest::Delete { name } => CommandWire {
                cmd: "DELETE",
                profile: StoredProfileWire {
                    kind: "profile".to_string(),
                    data: Value::String(String::new()),
                    name: name.clone(),
                },
                force: None,
            },
        };
        Ok(serde_json::to_string(&wire)?)
    }
}

/// Classified storage response.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageResponse {
    /// The authoritative profile list; always replaces the cache wholesale.
    ProfileList(Vec<ProfileRecord>),
    /// A PUT hit an existing name without the force flag. Carries the name
    /// of the rejected profile from the echoed request.
    Conflict { name: String },
}

/// Classify and decode a storage payload.
pub fn decode_storage(text: &str) -> ProtocolResult<StorageResponse> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_array() {
        return Ok(StorageResponse::ProfileList(serde_json::from_value(
            value,
        )?));
    }
    if value.get("resp").and_then(Value::as_str) == Some("FAIL") {
        let name = value
            .get("profile")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or(ProtocolError::UnknownShape { channel: "storage" })?;
        return Ok(StorageResponse::Conflict {
            name: name.to_string(),
        });
    }
    Err(ProtocolError::UnknownShape { channel: "storage" })
}
