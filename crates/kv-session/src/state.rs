//! Local session state.

use std::fmt;

/// The operator console's local state. `Running` is only ever entered on
/// the controller's say-so; a local "start" sends a command and waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Edit,
    Running,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "IDLE",
            RunState::Edit => "EDIT",
            RunState::Running => "RUNNING",
        };
        f.write_str(s)
    }
}
