//! Mutable profile draft.
//!
//! The draft is the working copy behind the interactive editor. Edits are
//! deliberately unchecked: dragging a point through another point's time is
//! a legal intermediate state. `finalize()` is the only place the
//! strictly-increasing-time invariant is enforced; it either produces a
//! committed [`Profile`] or fails with nothing persisted.

use kv_core::TimeUnit;

use crate::error::{ProfileError, ProfileResult};
use crate::profile::{Profile, Waypoint};

/// Fixed time step appended beyond the last waypoint by [`ProfileDraft::push_point`].
pub const NEW_POINT_STEP_S: u32 = 15;

/// Default-temperature range for a freshly added waypoint, degrees Celsius.
pub const NEW_POINT_TEMP_MIN: i32 = 25;
pub const NEW_POINT_TEMP_MAX: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    name: String,
    waypoints: Vec<Waypoint>,
}

impl ProfileDraft {
    /// Empty draft for the "new profile" path.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waypoints: Vec::new(),
        }
    }

    /// Draft seeded from a persisted profile (the "edit selected" path).
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            waypoints: profile.waypoints.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Append a waypoint 15 s past the last one (time 0 when empty) with a
    /// randomized default temperature in [25, 255). The step saturates at
    /// `u32::MAX`; a draft pinned there is still caught by `finalize()`.
    pub fn push_point(&mut self) -> Waypoint {
        let time_s = self
            .waypoints
            .last()
            .map_or(0, |w| w.time_s.saturating_add(NEW_POINT_STEP_S));
        let wp = Waypoint::new(time_s, fastrand::i32(NEW_POINT_TEMP_MIN..NEW_POINT_TEMP_MAX));
        self.waypoints.push(wp);
        wp
    }

    /// Remove the final waypoint; no-op on an empty draft.
    pub fn pop_point(&mut self) -> Option<Waypoint> {
        self.waypoints.pop()
    }

    /// Set a waypoint's time from a display-unit value. The value itself is
    /// never rejected; only the index is checked.
    pub fn set_time(&mut self, index: usize, display_value: u32, unit: TimeUnit) -> ProfileResult<()> {
        let len = self.waypoints.len();
        let wp = self
            .waypoints
            .get_mut(index)
            .ok_or(ProfileError::IndexOob { index, len })?;
        wp.time_s = unit.to_canonical(display_value);
        Ok(())
    }

    /// Set a waypoint's temperature (canonical Celsius). Unchecked value,
    /// checked index, same policy as [`Self::set_time`].
    pub fn set_temperature(&mut self, index: usize, temperature: i32) -> ProfileResult<()> {
        let len = self.waypoints.len();
        let wp = self
            .waypoints
            .get_mut(index)
            .ok_or(ProfileError::IndexOob { index, len })?;
        wp.temperature = temperature;
        Ok(())
    }

    /// Commit the draft. Walks waypoints in order: the first one whose time
    /// is not strictly greater than its predecessor's fails the whole
    /// commit. The draft is left untouched either way, so the editor can
    /// keep going after a failure.
    pub fn finalize(&self) -> ProfileResult<Profile> {
        if self.name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let mut last: Option<u32> = None;
        for (index, wp) in self.waypoints.iter().enumerate() {
            if let Some(prev) = last {
                if wp.time_s <= prev {
                    return Err(ProfileError::NonMonotonic { index });
                }
            }
            last = Some(wp.time_s);
        }
        Ok(Profile {
            name: self.name.clone(),
            waypoints: self.waypoints.clone(),
        })
    }
}
