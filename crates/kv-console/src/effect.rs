//! Effects the engine asks its embedder to perform.

use kv_profile::ProfileError;
use kv_telemetry::HeatPulse;

use crate::channel::ChannelKind;

/// Non-blocking operator notices. How they surface (toast, status line,
/// dialog) is the presentation layer's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The config channel never delivered a payload; the session is dead.
    Offline,
    /// A non-config channel dropped. No retry; that functionality is gone
    /// until the session is reloaded externally.
    ChannelLost(ChannelKind),
    /// Status channel is up and history is on its way.
    StatusOnline,
    RunCompleted,
    /// Commit failed validation; nothing was sent, the edit continues.
    SaveRejected(ProfileError),
    /// A PUT hit an existing name; ask the operator whether to overwrite.
    OverwritePrompt { name: String },
}

/// One instruction to the embedder. Handlers return these instead of doing
/// I/O, so message ordering and sends stay visible to tests.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenChannel(ChannelKind),
    Send { channel: ChannelKind, text: String },
    /// Flash a zone's heat indicator. Overlapping pulses stack; see
    /// kv-telemetry.
    SchedulePulse(HeatPulse),
    Notify(Notice),
}

impl Effect {
    pub fn send(channel: ChannelKind, text: impl Into<String>) -> Self {
        Effect::Send {
            channel,
            text: text.into(),
        }
    }
}
