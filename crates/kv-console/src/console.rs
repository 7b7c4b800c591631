//! The session context and bootstrap sequencer.

use kv_core::Config;
use kv_profile::{ProfileDraft, ProfileError};
use kv_protocol::{
    decode_config, decode_control_feedback, decode_status, ControlCommand, ProfileRecord,
    StatusMessage, CONFIG_REQUEST,
};
use kv_session::{EnergyEstimate, RunState, SessionError, SessionMachine, StateEvent};
use kv_storage::{StorageError, StorageOutcome, StorageSync};
use kv_telemetry::{Aggregator, RunReadout};
use tracing::{debug, info, warn};

use crate::channel::ChannelKind;
use crate::effect::{Effect, Notice};

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The config payload has not arrived; nothing else can happen yet.
    #[error("Session is not configured")]
    NotReady,

    #[error("No profile is selected")]
    NoSelection,

    #[error("No draft is being edited")]
    NoDraft,

    #[error("Run commands are unavailable while editing")]
    EditingInProgress,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Protocol(#[from] kv_protocol::ProtocolError),
}

/// Bootstrap phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Config channel open (or opening); no other channel may exist yet.
    AwaitingConfig,
    /// Configuration received; all channels live.
    Ready,
    /// The config channel failed before delivering a payload. Fatal: no
    /// retry, no other channel is ever attempted.
    Offline,
}

/// The one explicit session-context object: configuration, telemetry,
/// run/edit state, storage cache and the draft under edit. Everything the
/// renderer reads lives behind an accessor here; there are no globals.
#[derive(Debug)]
pub struct Console {
    phase: Phase,
    config: Option<Config>,
    aggregator: Option<Aggregator>,
    machine: SessionMachine,
    storage: StorageSync,
    draft: Option<ProfileDraft>,
    readout: Option<RunReadout>,
    estimate: Option<EnergyEstimate>,
}

impl Console {
    /// Create the session and open the config channel. Nothing else opens
    /// until its payload has been parsed.
    pub fn start() -> (Self, Vec<Effect>) {
        let console = Self {
            phase: Phase::AwaitingConfig,
            config: None,
            aggregator: None,
            machine: SessionMachine::new(),
            storage: StorageSync::new(),
            draft: None,
            readout: None,
            estimate: None,
        };
        (console, vec![Effect::OpenChannel(ChannelKind::Config)])
    }

    // ---- accessors for the presentation layer ----

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> Option<&Config> {
        self.config.as_ref()
    }

    pub fn run_state(&self) -> RunState {
        self.machine.state()
    }

    /// Raw controller state string for display of states the machine has
    /// no transition for.
    pub fn server_state(&self) -> Option<&str> {
        self.machine.last_authoritative()
    }

    pub fn aggregator(&self) -> Option<&Aggregator> {
        self.aggregator.as_ref()
    }

    pub fn readout(&self) -> Option<&RunReadout> {
        self.readout.as_ref()
    }

    pub fn estimate(&self) -> Option<EnergyEstimate> {
        self.estimate
    }

    pub fn profiles(&self) -> &[kv_profile::Profile] {
        self.storage.profiles()
    }

    pub fn selected_profile(&self) -> Option<&kv_profile::Profile> {
        self.storage.selected()
    }

    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    // ---- channel lifecycle ----

    pub fn on_channel_open(&mut self, kind: ChannelKind) -> Vec<Effect> {
        match kind {
            ChannelKind::Config => vec![Effect::send(kind, CONFIG_REQUEST)],
            ChannelKind::Storage => vec![Effect::send(kind, self.storage.refresh())],
            ChannelKind::Status => vec![Effect::Notify(Notice::StatusOnline)],
            ChannelKind::Control => Vec::new(),
        }
    }

    pub fn on_channel_closed(&mut self, kind: ChannelKind) -> Vec<Effect> {
        if kind == ChannelKind::Config && self.phase == Phase::AwaitingConfig {
            warn!("config channel lost before a payload arrived; session offline");
            self.phase = Phase::Offline;
            return vec![Effect::Notify(Notice::Offline)];
        }
        warn!(channel = %kind, "channel lost; no reconnection is attempted");
        vec![Effect::Notify(Notice::ChannelLost(kind))]
    }

    /// Dispatch one inbound message. Malformed payloads are logged and
    /// dropped; nothing on this path is fatal except by doing nothing.
    pub fn on_message(&mut self, kind: ChannelKind, text: &str) -> Vec<Effect> {
        if self.phase == Phase::Offline {
            return Vec::new();
        }
        if self.phase == Phase::AwaitingConfig {
            if kind == ChannelKind::Config {
                return self.handle_config(text);
            }
            debug!(channel = %kind, "message before configuration, dropped");
            return Vec::new();
        }
        match kind {
            // configuration is immutable for the session
            ChannelKind::Config => Vec::new(),
            ChannelKind::Status => self.handle_status(text),
            ChannelKind::Control => self.handle_control(text),
            ChannelKind::Storage => self.handle_storage(text),
        }
    }

    fn handle_config(&mut self, text: &str) -> Vec<Effect> {
        let config = match decode_config(text) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "bad config payload, dropped");
                return Vec::new();
            }
        };
        info!(zones = config.zones.len(), "session configured");
        // zone registration happens before any other channel can open, so
        // telemetry can never name an unknown zone under this sequencing
        self.aggregator = Some(Aggregator::new(&config.zones, config.hazard_temp));
        self.config = Some(config);
        self.phase = Phase::Ready;
        vec![
            Effect::OpenChannel(ChannelKind::Status),
            Effect::OpenChannel(ChannelKind::Control),
            Effect::OpenChannel(ChannelKind::Storage),
        ]
    }

    fn handle_status(&mut self, text: &str) -> Vec<Effect> {
        let message = match decode_status(text) {
            Ok(message) => message,
            Err(err) => {
                debug!(%err, "unrecognized status payload, dropped");
                return Vec::new();
            }
        };
        let Some(aggregator) = self.aggregator.as_mut() else {
            return Vec::new();
        };
        match message {
            StatusMessage::Backlog { profile, log } => {
                aggregator.apply_backlog(&log);
                if let Some(name) = profile {
                    if self.storage.select_by_name(&name) {
                        self.refresh_estimate();
                    }
                }
                Vec::new()
            }
            StatusMessage::Live(live) => {
                let mut effects = Vec::new();
                let event = self.machine.observe(&live.state);
                let pulses = match event {
                    StateEvent::IgnoredWhileEditing => {
                        // readings keep flowing, the draft's series does not
                        aggregator.instantaneous_update(&live.zones, live.temperature)
                    }
                    _ => {
                        if self.machine.state() == RunState::Running {
                            let pulses = aggregator.apply_live(&live);
                            self.readout =
                                Some(RunReadout::derive(&live, aggregator.hazard()));
                            pulses
                        } else {
                            self.readout = None;
                            aggregator.instantaneous_update(&live.zones, live.temperature)
                        }
                    }
                };
                if event == StateEvent::RunCompleted {
                    effects.push(Effect::Notify(Notice::RunCompleted));
                }
                effects.extend(pulses.into_iter().map(Effect::SchedulePulse));
                effects
            }
        }
    }

    fn handle_control(&mut self, text: &str) -> Vec<Effect> {
        match decode_control_feedback(text) {
            Ok(sample) => {
                if let Some(aggregator) = self.aggregator.as_mut() {
                    aggregator.apply_simulation(sample);
                }
            }
            Err(err) => debug!(%err, "unrecognized control payload, dropped"),
        }
        Vec::new()
    }

    fn handle_storage(&mut self, text: &str) -> Vec<Effect> {
        let response = match kv_protocol::decode_storage(text) {
            Ok(response) => response,
            Err(err) => {
                debug!(%err, "unrecognized storage payload, dropped");
                return Vec::new();
            }
        };
        match self.storage.handle_response(response) {
            StorageOutcome::ListReplaced { .. } => {
                self.refresh_estimate();
                Vec::new()
            }
            StorageOutcome::ConflictPending { name } => {
                vec![Effect::Notify(Notice::OverwritePrompt { name })]
            }
            StorageOutcome::StrayConflict { .. } => Vec::new(),
        }
    }

    // ---- operator actions ----

    pub fn select_profile(&mut self, index: usize) -> ConsoleResult<()> {
        self.storage.select(index)?;
        self.refresh_estimate();
        Ok(())
    }

    /// Enter profile-creation mode with an empty, unnamed draft.
    pub fn enter_new_mode(&mut self) -> ConsoleResult<()> {
        self.ensure_ready()?;
        self.machine.begin_edit()?;
        self.draft = Some(ProfileDraft::new(""));
        Ok(())
    }

    /// Enter edit mode on the selected profile.
    pub fn enter_edit_mode(&mut self) -> ConsoleResult<()> {
        self.ensure_ready()?;
        let profile = self.storage.selected().ok_or(ConsoleError::NoSelection)?;
        let draft = ProfileDraft::from_profile(profile);
        self.machine.begin_edit()?;
        self.draft = Some(draft);
        Ok(())
    }

    pub fn add_point(&mut self) -> ConsoleResult<()> {
        self.draft_mut()?.push_point();
        Ok(())
    }

    pub fn remove_point(&mut self) -> ConsoleResult<()> {
        self.draft_mut()?.pop_point();
        Ok(())
    }

    /// Set a waypoint time from a value in the configured profile display
    /// unit.
    pub fn edit_point_time(&mut self, index: usize, display_value: u32) -> ConsoleResult<()> {
        let unit = self
            .config
            .as_ref()
            .ok_or(ConsoleError::NotReady)?
            .time_scale_profile;
        self.draft_mut()?.set_time(index, display_value, unit)?;
        Ok(())
    }

    pub fn edit_point_temperature(&mut self, index: usize, temperature: i32) -> ConsoleResult<()> {
        self.draft_mut()?.set_temperature(index, temperature)?;
        Ok(())
    }

    pub fn rename_draft(&mut self, name: &str) -> ConsoleResult<()> {
        self.draft_mut()?.rename(name);
        Ok(())
    }

    /// Commit the draft and persist it. Validation failure raises a notice
    /// and keeps the editor open with nothing sent; success sends
    /// PUT-then-GET and leaves edit mode.
    pub fn save_draft(&mut self) -> ConsoleResult<Vec<Effect>> {
        let draft = self.draft.as_ref().ok_or(ConsoleError::NoDraft)?;
        let profile = match draft.finalize() {
            Ok(profile) => profile,
            Err(err) => {
                debug!(%err, "commit rejected, edit continues");
                return Ok(vec![Effect::Notify(Notice::SaveRejected(err))]);
            }
        };
        let sends = self.storage.save(&profile)?;
        self.machine.end_edit()?;
        self.draft = None;
        Ok(sends
            .into_iter()
            .map(|text| Effect::send(ChannelKind::Storage, text))
            .collect())
    }

    /// Abandon the draft and refresh the persisted list.
    pub fn cancel_edit(&mut self) -> ConsoleResult<Vec<Effect>> {
        self.machine.end_edit()?;
        self.draft = None;
        Ok(vec![Effect::send(
            ChannelKind::Storage,
            self.storage.refresh(),
        )])
    }

    /// Ask the controller to fire the selected profile. Local state stays
    /// put; the controller's status reports drive the transition to
    /// RUNNING. All non-profile series are cleared up front.
    pub fn start_run(&mut self) -> ConsoleResult<Vec<Effect>> {
        let record = self.selected_record()?;
        let text = ControlCommand::Run { profile: record }.encode()?;
        if let Some(aggregator) = self.aggregator.as_mut() {
            aggregator.clear_run_series();
        }
        Ok(vec![Effect::send(ChannelKind::Control, text)])
    }

    /// Dry-run the selected profile. Only the live series resets; zone
    /// history stays.
    pub fn start_simulation(&mut self) -> ConsoleResult<Vec<Effect>> {
        let record = self.selected_record()?;
        let text = ControlCommand::Simulate { profile: record }.encode()?;
        if let Some(aggregator) = self.aggregator.as_mut() {
            aggregator.clear_live_series();
        }
        Ok(vec![Effect::send(ChannelKind::Control, text)])
    }

    pub fn stop_run(&mut self) -> ConsoleResult<Vec<Effect>> {
        self.ensure_ready()?;
        let text = ControlCommand::Stop.encode()?;
        Ok(vec![Effect::send(ChannelKind::Control, text)])
    }

    /// Delete the selected profile (DELETE then GET; the refreshed list
    /// resets the selection to the first remaining profile).
    pub fn delete_selected(&mut self) -> ConsoleResult<Vec<Effect>> {
        self.ensure_ready()?;
        let sends = self.storage.delete_selected()?;
        Ok(sends
            .into_iter()
            .map(|text| Effect::send(ChannelKind::Storage, text))
            .collect())
    }

    /// Answer the overwrite prompt raised by a storage conflict.
    pub fn resolve_conflict(&mut self, overwrite: bool) -> ConsoleResult<Vec<Effect>> {
        let sends = self.storage.resolve_conflict(overwrite)?;
        Ok(sends
            .into_iter()
            .map(|text| Effect::send(ChannelKind::Storage, text))
            .collect())
    }

    // ---- internals ----

    fn ensure_ready(&self) -> ConsoleResult<()> {
        if self.phase != Phase::Ready {
            return Err(ConsoleError::NotReady);
        }
        Ok(())
    }

    fn draft_mut(&mut self) -> ConsoleResult<&mut ProfileDraft> {
        self.draft.as_mut().ok_or(ConsoleError::NoDraft)
    }

    fn selected_record(&self) -> ConsoleResult<ProfileRecord> {
        self.ensure_ready()?;
        if self.machine.state() == RunState::Edit {
            return Err(ConsoleError::EditingInProgress);
        }
        let profile = self.storage.selected().ok_or(ConsoleError::NoSelection)?;
        Ok(ProfileRecord::from_profile(profile))
    }

    fn refresh_estimate(&mut self) {
        let rate = self.config.as_ref().map(|c| c.kwh_rate);
        self.estimate = match (self.storage.selected(), rate) {
            (Some(profile), Some(rate)) => Some(EnergyEstimate::for_profile(profile, rate)),
            _ => None,
        };
    }
}
