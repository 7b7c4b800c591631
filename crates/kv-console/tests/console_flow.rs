//! End-to-end session flows against a scripted controller.
//!
//! The engine is sans-IO, so a "server" here is just the test feeding
//! channel events in the order the transport would deliver them (FIFO per
//! channel) and inspecting the effects that come back.

use kv_console::{ChannelKind, Console, Effect, Notice, Phase};
use kv_profile::ProfileError;
use kv_session::RunState;
use serde_json::Value;

const CONFIG: &str = r#"{
    "temp_scale": "c",
    "time_scale_slope": "s",
    "time_scale_profile": "s",
    "kwh_rate": 0.26,
    "currency_type": "EUR",
    "hazard_temp": 1200,
    "zones": [
        {"Name": "top", "Heated": true},
        {"Name": "bottom", "Heated": true},
        {"Name": "exhaust", "Heated": false}
    ]
}"#;

fn init_logging() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Boot through the config handshake and deliver the initial profile list.
fn booted_console(list_json: &str) -> Console {
    init_logging();
    let (mut console, effects) = Console::start();
    assert_eq!(effects, vec![Effect::OpenChannel(ChannelKind::Config)]);
    console.on_channel_open(ChannelKind::Config);
    console.on_message(ChannelKind::Config, CONFIG);
    assert_eq!(console.phase(), Phase::Ready);
    console.on_channel_open(ChannelKind::Storage);
    console.on_message(ChannelKind::Storage, list_json);
    console
}

fn live_msg(state: &str, runtime: f64, totaltime: f64, temp: f64) -> String {
    serde_json::json!({
        "state": state,
        "runtime": runtime,
        "totaltime": totaltime,
        "temperature": temp,
        "target": temp + 5.0,
        "zones": [
            {"Name": "top", "Heated": true, "Temp": temp, "Heat": 0.5},
            {"Name": "exhaust", "Heated": false, "Temp": temp / 4.0}
        ]
    })
    .to_string()
}

fn sent_texts(effects: &[Effect], channel: ChannelKind) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send { channel: c, text } if *c == channel => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn backlog_then_live_reconstructs_a_run_in_progress() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20], [7200, 1000]]}]"#);

    let backlog = serde_json::json!({
        "type": "backlog",
        "profile": {"name": "bisque"},
        "log": [
            {"runtime": 0, "temperature": 21.0,
             "zones": [{"Name": "top", "Heated": true, "Temp": 21.0}]},
            {"runtime": 2, "temperature": 24.0,
             "zones": [{"Name": "top", "Heated": true, "Temp": 24.5}]}
        ]
    });
    console.on_message(ChannelKind::Status, &backlog.to_string());

    let agg = console.aggregator().unwrap();
    assert_eq!(agg.live_series().len(), 2);
    assert_eq!(agg.zone_series()[0].len(), 2);
    assert_eq!(console.selected_profile().unwrap().name, "bisque");

    let effects = console.on_message(ChannelKind::Status, &live_msg("RUNNING", 1800.0, 7200.0, 400.0));
    assert_eq!(console.run_state(), RunState::Running);
    let readout = console.readout().unwrap();
    assert_eq!(readout.progress_pct, 25.0);
    assert_eq!(readout.remaining_s, 5400);
    assert!(!readout.hazard);
    // one heat pulse for the duty-cycling heated zone
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::SchedulePulse(p) if p.zone == "top" && p.duration_ms == 495)));
    assert_eq!(console.aggregator().unwrap().live_series().len(), 3);
}

#[test]
fn run_completed_notice_fires_once_and_resets_progress() {
    let mut console = booted_console("[]");
    console.on_message(ChannelKind::Status, &live_msg("RUNNING", 10.0, 100.0, 500.0));
    assert!(console.readout().is_some());

    let effects = console.on_message(ChannelKind::Status, &live_msg("IDLE", 0.0, 0.0, 480.0));
    assert!(effects.contains(&Effect::Notify(Notice::RunCompleted)));
    assert_eq!(console.run_state(), RunState::Idle);
    assert!(console.readout().is_none());

    let effects = console.on_message(ChannelKind::Status, &live_msg("IDLE", 0.0, 0.0, 470.0));
    assert!(!effects.contains(&Effect::Notify(Notice::RunCompleted)));
}

#[test]
fn editing_is_shielded_from_live_telemetry() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20], [60, 100]]}]"#);
    console.enter_edit_mode().unwrap();
    assert_eq!(console.run_state(), RunState::Edit);
    let draft_before = console.draft().unwrap().waypoints().to_vec();

    console.on_message(ChannelKind::Status, &live_msg("RUNNING", 5.0, 100.0, 900.0));

    // still editing, draft untouched, no series accumulation
    assert_eq!(console.run_state(), RunState::Edit);
    assert_eq!(console.draft().unwrap().waypoints(), &draft_before[..]);
    let agg = console.aggregator().unwrap();
    assert!(agg.live_series().is_empty());
    assert!(agg.zone_series().iter().all(|s| s.is_empty()));
    // but instantaneous zone readings did refresh
    assert_eq!(agg.zones()[0].reading, Some(900.0));
}

#[test]
fn save_flow_validates_then_persists() {
    let mut console = booted_console("[]");
    console.enter_new_mode().unwrap();
    console.add_point().unwrap();
    console.add_point().unwrap();
    console.rename_draft("raku").unwrap();

    // drag the second point back in time: commit must fail, nothing sent
    console.edit_point_time(1, 0).unwrap();
    let effects = console.save_draft().unwrap();
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::SaveRejected(
            ProfileError::NonMonotonic { index: 1 }
        ))]
    );
    assert_eq!(console.run_state(), RunState::Edit);

    // fix it and save for real: PUT then GET on the storage channel
    console.edit_point_time(1, 30).unwrap();
    let effects = console.save_draft().unwrap();
    let sends = sent_texts(&effects, ChannelKind::Storage);
    assert_eq!(sends.len(), 2);
    let put: Value = serde_json::from_str(&sends[0]).unwrap();
    assert_eq!(put["cmd"], "PUT");
    assert_eq!(put["profile"]["name"], "raku");
    assert_eq!(sends[1], "GET");
    assert_eq!(console.run_state(), RunState::Idle);
    assert!(console.draft().is_none());

    // the cooperating server stores the profile and answers the GET
    let stored = serde_json::json!([{
        "name": "raku",
        "data": put["profile"]["data"],
    }]);
    console.on_message(ChannelKind::Storage, &stored.to_string());
    let saved = console.selected_profile().unwrap();
    assert_eq!(saved.name, "raku");
    assert_eq!(saved.waypoints.len(), 2);
    assert_eq!(saved.waypoints[1].time_s, 30);
}

#[test]
fn conflict_declined_leaves_store_untouched() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20]]}]"#);
    console.enter_new_mode().unwrap();
    console.rename_draft("bisque").unwrap();
    console.add_point().unwrap();
    let effects = console.save_draft().unwrap();
    let put_text = sent_texts(&effects, ChannelKind::Storage).remove(0);

    // server rejects the PUT and echoes the request, then answers the GET
    // with the unchanged list
    let fail = serde_json::json!({
        "resp": "FAIL",
        "cmd": "PUT",
        "profile": serde_json::from_str::<Value>(&put_text).unwrap()["profile"],
    });
    let effects = console.on_message(ChannelKind::Storage, &fail.to_string());
    assert_eq!(
        effects,
        vec![Effect::Notify(Notice::OverwritePrompt {
            name: "bisque".to_string()
        })]
    );
    console.on_message(ChannelKind::Storage, r#"[{"name": "bisque", "data": [[0, 20]]}]"#);

    let effects = console.resolve_conflict(false).unwrap();
    assert!(effects.is_empty());
    assert_eq!(console.profiles().len(), 1);
    assert_eq!(console.profiles()[0].waypoints.len(), 1);
}

#[test]
fn conflict_confirmed_resends_with_force() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20]]}]"#);
    console.enter_new_mode().unwrap();
    console.rename_draft("bisque").unwrap();
    console.add_point().unwrap();
    console.save_draft().unwrap();

    console.on_message(
        ChannelKind::Storage,
        r#"{"resp": "FAIL", "cmd": "PUT",
            "profile": {"type": "profile", "data": [[0, 150]], "name": "bisque"}}"#,
    );
    let effects = console.resolve_conflict(true).unwrap();
    let sends = sent_texts(&effects, ChannelKind::Storage);
    let put: Value = serde_json::from_str(&sends[0]).unwrap();
    assert_eq!(put["force"], true);
    assert_eq!(put["profile"]["name"], "bisque");
    assert_eq!(sends[1], "GET");
}

#[test]
fn deleting_the_only_profile_empties_the_selection() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20]]}]"#);
    assert_eq!(console.selected_profile().unwrap().name, "bisque");

    let effects = console.delete_selected().unwrap();
    let sends = sent_texts(&effects, ChannelKind::Storage);
    let del: Value = serde_json::from_str(&sends[0]).unwrap();
    assert_eq!(del["cmd"], "DELETE");
    assert_eq!(del["profile"]["name"], "bisque");
    assert_eq!(sends[1], "GET");

    console.on_message(ChannelKind::Storage, "[]");
    assert!(console.selected_profile().is_none());
    assert!(console.profiles().is_empty());
    assert!(console.estimate().is_none());
}

#[test]
fn simulation_feedback_lands_in_the_live_series() {
    let mut console = booted_console(r#"[{"name": "bisque", "data": [[0, 20], [60, 100]]}]"#);
    let effects = console.start_simulation().unwrap();
    let cmd: Value =
        serde_json::from_str(&sent_texts(&effects, ChannelKind::Control)[0]).unwrap();
    assert_eq!(cmd["cmd"], "SIMULATE");

    console.on_message(ChannelKind::Control, r#"{"runtime": 1, "temperature": 25.5}"#);
    console.on_message(ChannelKind::Control, r#"{"runtime": 2, "temperature": 27.0}"#);
    let agg = console.aggregator().unwrap();
    assert_eq!(agg.live_series().len(), 2);
    assert_eq!(agg.live_series().last().unwrap().value, 27.0);
}

#[test]
fn stop_sends_a_bare_stop_command() {
    let mut console = booted_console("[]");
    let effects = console.stop_run().unwrap();
    let cmd: Value =
        serde_json::from_str(&sent_texts(&effects, ChannelKind::Control)[0]).unwrap();
    assert_eq!(cmd, serde_json::json!({"cmd": "STOP"}));
}
