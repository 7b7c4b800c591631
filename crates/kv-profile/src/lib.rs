//! kv-profile: firing-profile data model.
//!
//! A `Profile` is a named, ordered firing schedule of (time, temperature)
//! waypoints with strictly increasing times. Interactive editing happens on
//! a `ProfileDraft`, which accepts any intermediate ordering and validates
//! monotonicity only at `finalize()`, the commit boundary.

pub mod draft;
pub mod error;
pub mod profile;

pub use draft::ProfileDraft;
pub use error::{ProfileError, ProfileResult};
pub use profile::{slope_segments, Profile, Slope, Trend, Waypoint};
