//! Error types for profile operations.

use thiserror::Error;

/// Result type for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A waypoint's time is not strictly greater than its predecessor's.
    /// Raised at commit time only; drafts may pass through this freely.
    #[error("Non-monotonic profile: waypoint {index} does not advance in time")]
    NonMonotonic { index: usize },

    /// A profile cannot be persisted without a name.
    #[error("Profile name is empty")]
    EmptyName,

    #[error("Waypoint index out of bounds (index={index}, len={len})")]
    IndexOob { index: usize, len: usize },
}
