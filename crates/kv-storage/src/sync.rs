//! The storage synchronization state machine.

use kv_profile::Profile;
use kv_protocol::{
    ProfileRecord, StorageRequest, StorageResponse, STORAGE_LIST_REQUEST,
};
use tracing::debug;
use uuid::Uuid;

use crate::{StorageError, StorageResult};

/// A mutating round trip we have sent and not yet seen resolved. The token
/// never goes on the wire (the legacy protocol has no request IDs); it only
/// correlates log lines and the conflict continuation.
#[derive(Debug, Clone)]
struct InFlight {
    token: Uuid,
    request: StorageRequest,
}

/// Outcome of one storage channel response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOutcome {
    /// The cached list was replaced wholesale.
    ListReplaced { selection_changed: bool },
    /// A PUT hit an existing name; the operator must confirm or decline
    /// the overwrite via [`StorageSync::resolve_conflict`].
    ConflictPending { name: String },
    /// A conflict arrived with no matching outstanding PUT; dropped.
    StrayConflict { name: String },
}

/// Client-side owner of the persisted profile list and selection.
#[derive(Debug, Default)]
pub struct StorageSync {
    profiles: Vec<Profile>,
    /// Selection is tracked by name: the list can be reordered or replaced
    /// under us, and name is the storage identity.
    selected: Option<String>,
    in_flight: Option<InFlight>,
    conflict: Option<InFlight>,
}

impl StorageSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn selected(&self) -> Option<&Profile> {
        let name = self.selected.as_deref()?;
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn has_pending_mutation(&self) -> bool {
        self.in_flight.is_some() || self.conflict.is_some()
    }

    /// Select by position in the cached list.
    pub fn select(&mut self, index: usize) -> StorageResult<&Profile> {
        let len = self.profiles.len();
        let profile = self
            .profiles
            .get(index)
            .ok_or(StorageError::IndexOob { index, len })?;
        self.selected = Some(profile.name.clone());
        Ok(profile)
    }

    /// Select by name if present (backlog pre-selection path). Returns
    /// whether the name was found.
    pub fn select_by_name(&mut self, name: &str) -> bool {
        if self.profiles.iter().any(|p| p.name == name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    /// Wire text for a full list refresh.
    pub fn refresh(&self) -> String {
        STORAGE_LIST_REQUEST.to_string()
    }

    /// Upsert a committed profile: PUT (no force) followed by GET. The
    /// saved profile becomes the preferred selection once the refreshed
    /// list lands.
    pub fn save(&mut self, profile: &Profile) -> StorageResult<Vec<String>> {
        self.ensure_idle()?;
        let request = StorageRequest::Put {
            record: ProfileRecord::from_profile(profile),
            force: false,
        };
        let sends = vec![request.encode()?, self.refresh()];
        let token = Uuid::new_v4();
        debug!(%token, name = %profile.name, "storage PUT round trip");
        self.in_flight = Some(InFlight { token, request });
        self.selected = Some(profile.name.clone());
        Ok(sends)
    }

    /// Remove a profile by name: DELETE followed by GET. Selection resets
    /// through the GET path when the deleted profile was selected.
    pub fn delete(&mut self, name: &str) -> StorageResult<Vec<String>> {
        self.ensure_idle()?;
        let request = StorageRequest::Delete {
            name: name.to_string(),
        };
        let sends = vec![request.encode()?, self.refresh()];
        let token = Uuid::new_v4();
        debug!(%token, %name, "storage DELETE round trip");
        self.in_flight = Some(InFlight { token, request });
        Ok(sends)
    }

    pub fn delete_selected(&mut self) -> StorageResult<Vec<String>> {
        let name = self
            .selected
            .clone()
            .ok_or(StorageError::NoSelection)?;
        self.delete(&name)
    }

    /// Apply one classified response from the storage channel.
    pub fn handle_response(&mut self, response: StorageResponse) -> StorageOutcome {
        match response {
            StorageResponse::ProfileList(records) => self.replace_list(records),
            StorageResponse::Conflict { name } => match self.in_flight.take() {
                Some(pending) => {
                    debug!(token = %pending.token, %name, "PUT rejected, awaiting overwrite decision");
                    self.conflict = Some(pending);
                    StorageOutcome::ConflictPending { name }
                }
                None => {
                    debug!(%name, "conflict with no outstanding PUT, dropped");
                    StorageOutcome::StrayConflict { name }
                }
            },
        }
    }

    /// Resolve an overwrite conflict. Confirming resends the identical PUT
    /// with the force flag set (plus a refresh); declining abandons the
    /// write with no retry and no state change.
    pub fn resolve_conflict(&mut self, overwrite: bool) -> StorageResult<Vec<String>> {
        let pending = self.conflict.take().ok_or(StorageError::NoConflictPending)?;
        if !overwrite {
            debug!(token = %pending.token, "overwrite declined, write abandoned");
            return Ok(Vec::new());
        }
        let request = match pending.request {
            StorageRequest::Put { record, .. } => StorageRequest::Put {
                record,
                force: true,
            },
            // Conflicts only ever answer PUTs; a stored DELETE here would
            // be a bug on our side, not the server's.
            other => other,
        };
        let sends = vec![request.encode()?, self.refresh()];
        debug!(token = %pending.token, "overwrite confirmed, forced PUT resent");
        self.in_flight = Some(InFlight {
            token: pending.token,
            request,
        });
        Ok(sends)
    }

    fn ensure_idle(&self) -> StorageResult<()> {
        if self.has_pending_mutation() {
            return Err(StorageError::RequestInFlight);
        }
        Ok(())
    }

    fn replace_list(&mut self, records: Vec<ProfileRecord>) -> StorageOutcome {
        let before = self.selected.clone();
        self.profiles = records.iter().map(ProfileRecord::to_profile).collect();
        // The list response is the tail of any mutating round trip.
        self.in_flight = None;

        let still_present = self
            .selected
            .as_deref()
            .is_some_and(|name| self.profiles.iter().any(|p| p.name == name));
        if !still_present {
            self.selected = self.profiles.first().map(|p| p.name.clone());
        }
        StorageOutcome::ListReplaced {
            selection_changed: before != self.selected,
        }
    }
}
