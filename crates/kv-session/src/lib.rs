//! kv-session: run/edit state reconciliation.
//!
//! Local operator intent (editing, intending to run) is reconciled against
//! the controller's authoritative run state as reported on the status
//! channel. The server wins everywhere except while the operator is
//! editing, where local state is protected from being clobbered by
//! concurrent telemetry.

pub mod energy;
pub mod machine;
pub mod state;

pub use energy::{EnergyEstimate, KILN_POWER_W};
pub use machine::{SessionError, SessionMachine, SessionResult, StateEvent};
pub use state::RunState;
