//! kv-protocol: JSON wire schemas for the four controller channels.
//!
//! Each channel gets a decode step that classifies the raw payload into a
//! closed set of message kinds before anything is dispatched on it. A
//! payload that fits no known shape decodes to an error; callers drop it
//! rather than crash the session.

pub mod config;
pub mod control;
pub mod status;
pub mod storage;

pub use config::{decode_config, CONFIG_REQUEST};
pub use control::{decode_control_feedback, ControlCommand, SimSample};
pub use status::{decode_status, LiveStatus, LogSample, StatusMessage, ZoneReading};
pub use storage::{
    decode_storage, ProfileRecord, StorageRequest, StorageResponse, STORAGE_LIST_REQUEST,
};

pub type ProtocolResult<T> = Result<T, ProtocolError>;

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized payload shape on {channel} channel")]
    UnknownShape { channel: &'static str },
}
