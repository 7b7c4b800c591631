//! kv-console: the operator console's synchronization engine.
//!
//! Composes the profile model, telemetry aggregator, run/edit state machine
//! and storage sync behind one session-context object, and sequences the
//! channel bootstrap (configuration strictly first). The engine owns no
//! I/O: inbound channel events and operator actions go in, and explicit
//! [`Effect`] values (sends, channel opens, UI notices) come out, which
//! keeps every flow testable without a socket.

pub mod channel;
pub mod console;
pub mod effect;

pub use channel::{endpoint_url, ChannelKind};
pub use console::{Console, ConsoleError, ConsoleResult, Phase};
pub use effect::{Effect, Notice};
