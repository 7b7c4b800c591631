//! The run/edit state machine.

use thiserror::Error;
use tracing::debug;

use crate::state::RunState;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot start editing while {state}")]
    EditUnavailable { state: RunState },

    #[error("Not in edit mode")]
    NotEditing,
}

/// Outcome of reconciling one authoritative state report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    /// The report was applied; no transition of note.
    Applied,
    /// The previous authoritative state was RUNNING and this one is not:
    /// the run finished (or was stopped). Raised exactly once per
    /// transition.
    RunCompleted,
    /// Local state is EDIT; the report was dropped to protect the edit.
    IgnoredWhileEditing,
}

/// Reconciles local operator state with the controller's reported state.
#[derive(Debug, Clone, Default)]
pub struct SessionMachine {
    local: RunState,
    /// Authoritative state string from the previous non-edit observation.
    last_observed: Option<String>,
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.local
    }

    /// Raw authoritative state from the last applied observation, for
    /// display of states the machine has no transition for.
    pub fn last_authoritative(&self) -> Option<&str> {
        self.last_observed.as_deref()
    }

    /// Operator enters edit mode (new or existing profile). Only legal
    /// from IDLE; the controls are unavailable mid-run.
    pub fn begin_edit(&mut self) -> SessionResult<()> {
        if self.local != RunState::Idle {
            return Err(SessionError::EditUnavailable { state: self.local });
        }
        self.local = RunState::Edit;
        Ok(())
    }

    /// Operator leaves edit mode (save or cancel).
    pub fn end_edit(&mut self) -> SessionResult<()> {
        if self.local != RunState::Edit {
            return Err(SessionError::NotEditing);
        }
        self.local = RunState::Idle;
        Ok(())
    }

    /// Reconcile one authoritative state report. Only the literal string
    /// `"RUNNING"` maps to a running local state; anything else reads as
    /// idle. While editing, reports are dropped entirely so a stray
    /// telemetry message cannot snap the operator out of edit mode. The
    /// previous-observation memory is also left alone, so a run that ends
    /// during an edit still raises its completion event afterwards.
    pub fn observe(&mut self, server_state: &str) -> StateEvent {
        if self.local == RunState::Edit {
            debug!(state = server_state, "authoritative state ignored during edit");
            return StateEvent::IgnoredWhileEditing;
        }
        let was_running = self.last_observed.as_deref() == Some("RUNNING");
        let now_running = server_state == "RUNNING";
        self.local = if now_running {
            RunState::Running
        } else {
            RunState::Idle
        };
        self.last_observed = Some(server_state.to_string());
        if was_running && !now_running {
            StateEvent::RunCompleted
        } else {
            StateEvent::Applied
        }
    }
}
