//! kv-storage: profile storage synchronization.
//!
//! Owns the cached list of persisted profiles and the current selection.
//! The cache is only ever replaced wholesale by a GET response; PUT and
//! DELETE completion is inferred from the follow-up GET, never confirmed
//! directly.

pub mod sync;

pub use sync::{StorageOutcome, StorageSync};

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// The storage channel has no request IDs, so responses correlate by
    /// shape only. A second mutating round trip before the first resolves
    /// would make responses ambiguous.
    #[error("A storage mutation is already in flight")]
    RequestInFlight,

    #[error("No profile is selected")]
    NoSelection,

    #[error("Profile index out of bounds (index={index}, len={len})")]
    IndexOob { index: usize, len: usize },

    #[error("No overwrite conflict is awaiting a decision")]
    NoConflictPending,

    #[error("Protocol error: {0}")]
    Protocol(#[from] kv_protocol::ProtocolError),
}
