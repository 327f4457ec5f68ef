//! Integration tests for the LinkSession → link → UI pipeline.
//!
//! Time is driven explicitly through `tick(now_ms, ..)`, so reconnect and
//! poller intervals are exact.

use super::mock_link::{MockHttp, MockTransport, RecordingUi, UiCall};

use carlink::app::commands::{Command, ConsoleRequest, PidController, PidPair, PidParameters};
use carlink::app::ports::{NotifyLevel, TelemetrySource};
use carlink::app::session::{Flow, LinkSession};
use carlink::config::LinkConfig;
use carlink::error::DispatchError;
use carlink::link::codec;
use carlink::link::connection::LinkState;
use carlink::link::transport::TransportEvent;

type Session = LinkSession<MockTransport, MockHttp>;

fn session_with(transport: MockTransport) -> (Session, RecordingUi) {
    let session = LinkSession::new(LinkConfig::default(), transport, MockHttp::new());
    (session, RecordingUi::new())
}

/// Open and reach `Connected` at t=10.
fn connected() -> (Session, RecordingUi) {
    let (mut s, mut ui) = session_with(MockTransport::new());
    s.open(0, &mut ui);
    s.tick(10, &mut ui);
    assert_eq!(s.state(), LinkState::Connected);
    ui.clear();
    (s, ui)
}

fn sent(s: &Session) -> &[String] {
    &s.connection().transport().sent
}

// ── Lifecycle ────────────────────────────────────────────────

#[test]
fn open_reports_every_transition() {
    let (mut s, mut ui) = session_with(MockTransport::new());
    s.open(0, &mut ui);
    assert_eq!(s.state(), LinkState::Connecting);
    s.tick(10, &mut ui);
    assert_eq!(
        ui.transitions(),
        vec![
            (LinkState::Disconnected, LinkState::Connecting),
            (LinkState::Connecting, LinkState::Connected),
        ]
    );
    assert_eq!(s.connection().transport().urls, vec!["ws://127.0.0.1:8765/".to_owned()]);
    assert!(s.is_open());
}

#[test]
fn open_twice_is_noop() {
    let (mut s, mut ui) = connected();
    s.open(20, &mut ui);
    assert_eq!(s.connection().transport().opens(), 1);
    assert!(ui.transitions().is_empty());
}

#[test]
fn close_cancels_reconnect_and_is_idempotent() {
    let (mut s, mut ui) = connected();
    s.connection_mut().transport_mut().push(TransportEvent::Closed);
    s.tick(100, &mut ui);
    assert_eq!(s.state(), LinkState::Reconnecting);

    s.close(&mut ui);
    s.close(&mut ui);
    assert_eq!(s.state(), LinkState::Disconnected);
    assert!(!s.is_open());
    assert!(!s.is_fallback_active());
    assert!(!s.is_status_poll_active());

    s.tick(60_000, &mut ui);
    assert_eq!(s.connection().transport().opens(), 1);
    assert_eq!(
        ui.transitions(),
        vec![
            (LinkState::Connected, LinkState::Reconnecting),
            (LinkState::Reconnecting, LinkState::Disconnected),
        ]
    );
}

// ── Reconnect ────────────────────────────────────────────────

#[test]
fn close_event_reconnects_after_backoff() {
    let (mut s, mut ui) = connected();
    s.connection_mut().transport_mut().push(TransportEvent::Closed);
    s.tick(1000, &mut ui);
    assert_eq!(s.state(), LinkState::Reconnecting);

    // Not before the delay...
    for t in (1010..4000).step_by(250) {
        s.tick(t, &mut ui);
        assert_eq!(s.state(), LinkState::Reconnecting, "early reconnect at {t}");
    }
    // ...but at it.
    s.tick(4000, &mut ui);
    assert_eq!(s.state(), LinkState::Connecting);
    s.tick(4010, &mut ui);
    assert_eq!(s.state(), LinkState::Connected);
    assert_eq!(s.connection().transport().opens(), 2);
}

#[test]
fn unreachable_peer_retries_forever() {
    let (mut s, mut ui) = session_with(MockTransport::unreachable());
    s.open(0, &mut ui);
    for i in 1..=10u64 {
        s.tick(i * 3000, &mut ui);
    }
    assert_eq!(s.state(), LinkState::Reconnecting);
    assert_eq!(s.connection().transport().opens(), 11);
}

#[test]
fn send_failure_drops_link_and_notifies() {
    let (mut s, mut ui) = connected();
    s.connection_mut().transport_mut().fail_send = true;
    let err = s.dispatch(&Command::Beep, &mut ui).unwrap_err();
    assert!(matches!(err, DispatchError::Link(_)));
    assert_eq!(s.state(), LinkState::Reconnecting);
    assert_eq!(
        ui.transitions(),
        vec![(LinkState::Connected, LinkState::Reconnecting)]
    );
    assert_eq!(ui.notifications(NotifyLevel::Error).len(), 1);
}

#[test]
fn send_failure_after_idle_gap_waits_full_delay() {
    let (mut s, mut ui) = connected();
    s.connection_mut().transport_mut().fail_send = true;

    // Last tick was at 10; the failed send happens around 2500.
    assert!(s.dispatch(&Command::Beep, &mut ui).is_err());
    assert_eq!(s.connection().reconnect_deadline(), None);

    s.tick(2500, &mut ui);
    assert_eq!(s.connection().reconnect_deadline(), Some(5500));

    s.tick(3010, &mut ui);
    s.tick(5499, &mut ui);
    assert_eq!(s.state(), LinkState::Reconnecting);
    assert_eq!(s.connection().transport().opens(), 1);

    s.connection_mut().transport_mut().fail_send = false;
    s.tick(5500, &mut ui);
    assert_eq!(s.state(), LinkState::Connecting);
    assert_eq!(s.connection().transport().opens(), 2);
}

// ── Dispatch ─────────────────────────────────────────────────

#[test]
fn move_while_connected_sends_one_frame_without_error() {
    let (mut s, mut ui) = connected();
    let cmd = Command::Move {
        turn_angle_deg: 0,
        left_speed: 50,
        right_speed: 50,
    };
    s.dispatch(&cmd, &mut ui).unwrap();

    assert_eq!(sent(&s).len(), 1);
    let frame: serde_json::Value = serde_json::from_str(&sent(&s)[0]).unwrap();
    assert_eq!(frame["type"], "move");
    assert_eq!(frame["turn_angle"], 0);
    assert_eq!(frame["left_speed"], 50);
    assert_eq!(frame["right_speed"], 50);

    // No ack arrives; nothing complains.
    for t in (20..3000).step_by(100) {
        s.tick(t, &mut ui);
    }
    assert_eq!(ui.error_count(), 0);
}

#[test]
fn dispatch_while_down_never_sends() {
    let (mut s, mut ui) = session_with(MockTransport::unreachable());
    s.open(0, &mut ui);
    for cmd in [Command::Start, Command::EmergencyStop, Command::Beep] {
        assert_eq!(s.dispatch(&cmd, &mut ui), Err(DispatchError::LinkDown));
    }
    assert!(sent(&s).is_empty());
    assert_eq!(ui.notifications(NotifyLevel::Error).len(), 3);
}

#[test]
fn two_emergency_stops_both_reach_transport() {
    let (mut s, mut ui) = connected();
    s.dispatch(&Command::EmergencyStop, &mut ui).unwrap();
    s.dispatch(&Command::EmergencyStop, &mut ui).unwrap();
    assert_eq!(
        sent(&s),
        [
            r#"{"type":"emergency_stop"}"#.to_owned(),
            r#"{"type":"emergency_stop"}"#.to_owned()
        ]
    );
}

#[test]
fn outbound_order_matches_call_order() {
    let (mut s, mut ui) = connected();
    let cmds = [Command::Start, Command::Beep, Command::Stop];
    for c in &cmds {
        s.dispatch(c, &mut ui).unwrap();
    }
    let decoded: Vec<Command> = sent(&s)
        .iter()
        .map(|f| codec::decode_command(f).unwrap())
        .collect();
    assert_eq!(decoded, cmds);
}

// ── Inbound ──────────────────────────────────────────────────

#[test]
fn inbound_frames_route_in_arrival_order() {
    let (mut s, mut ui) = connected();
    {
        let t = s.connection_mut().transport_mut();
        t.push_text(r#"{"type":"connected","message":"car ready"}"#);
        t.push_text(r#"{"type":"move_ack"}"#);
        t.push_text(r#"{"type":"emergency_alert","message":"obstacle"}"#);
        t.push_text(r#"{"type":"error","message":"left motor stalled"}"#);
    }
    s.tick(20, &mut ui);
    assert_eq!(
        ui.calls,
        vec![
            UiCall::Connected("car ready".into()),
            UiCall::MoveAck,
            UiCall::Emergency(Some("obstacle".into())),
            UiCall::Error("left motor stalled".into()),
        ]
    );
}

#[test]
fn malformed_and_unknown_frames_are_contained() {
    let (mut s, mut ui) = connected();
    {
        let t = s.connection_mut().transport_mut();
        t.push_text("{{{{");
        t.push_text(r#"{"type":"holo_map","cells":[]}"#);
        t.push_text(r#"{"no_type":true}"#);
        t.push_text(r#"{"type":"status_update","battery_level":"lots"}"#);
        t.push_text(r#"{"type":"move_ack"}"#);
    }
    s.tick(20, &mut ui);
    assert_eq!(s.state(), LinkState::Connected);
    assert_eq!(ui.calls, vec![UiCall::MoveAck]);
}

#[test]
fn partial_status_updates_merge_into_snapshot() {
    let (mut s, mut ui) = connected();
    s.connection_mut()
        .transport_mut()
        .push_text(r#"{"type":"status_update","battery_level":77.5,"uptime":"00:10:00"}"#);
    s.tick(20, &mut ui);
    s.connection_mut()
        .transport_mut()
        .push_text(r#"{"type":"status_update","current_speed":12}"#);
    s.tick(30, &mut ui);

    let snap = s.snapshot();
    assert_eq!(snap.battery_level, Some(77.5));
    assert_eq!(snap.uptime_seconds, Some(600));
    assert_eq!(snap.current_speed, Some(12.0));
    assert_eq!(ui.statuses(TelemetrySource::Live).len(), 2);
}

// ── Telemetry links ──────────────────────────────────────────

#[test]
fn status_poller_requests_while_connected() {
    let (mut s, mut ui) = connected();
    assert!(s.is_status_poll_active());
    assert!(!s.is_fallback_active());

    s.tick(5009, &mut ui);
    assert!(sent(&s).is_empty());
    s.tick(5010, &mut ui);
    assert_eq!(sent(&s), [r#"{"type":"get_status"}"#.to_owned()]);
}

#[test]
fn fallback_ticks_while_down_then_stops_on_connect() {
    let (mut s, mut ui) = session_with(MockTransport::unreachable());
    s.open(0, &mut ui);
    assert!(s.is_fallback_active());

    for i in 1..=5u64 {
        s.tick(i * 1000, &mut ui);
    }
    let sim = ui.statuses(TelemetrySource::Simulated);
    assert_eq!(sim.len(), 5);
    for pair in sim.windows(2) {
        assert!(pair[1].uptime_seconds > pair[0].uptime_seconds);
        assert!(pair[1].battery_level <= pair[0].battery_level);
    }

    // Peer comes back; next reconnect attempt at 6000 succeeds.
    s.connection_mut().transport_mut().fail_open = false;
    s.tick(6000, &mut ui);
    s.tick(6010, &mut ui);
    assert_eq!(s.state(), LinkState::Connected);
    assert!(!s.is_fallback_active());

    ui.clear();
    for t in (7000..20_000).step_by(500) {
        s.tick(t, &mut ui);
    }
    assert!(ui.statuses(TelemetrySource::Simulated).is_empty());
}

#[test]
fn fallback_continues_from_last_live_values() {
    let (mut s, mut ui) = connected();
    s.connection_mut()
        .transport_mut()
        .push_text(r#"{"type":"status_data","battery_level":85,"uptime":120}"#);
    s.tick(20, &mut ui);

    s.connection_mut().transport_mut().push(TransportEvent::Error("reset".into()));
    s.tick(100, &mut ui);
    assert!(s.is_fallback_active());

    ui.clear();
    s.tick(1100, &mut ui);
    let sim = ui.statuses(TelemetrySource::Simulated);
    assert_eq!(sim.len(), 1);
    assert_eq!(sim[0].uptime_seconds, Some(121));
    assert!((sim[0].battery_level.unwrap() - 84.9).abs() < 1e-3);
}

// ── Console requests ─────────────────────────────────────────

#[test]
fn pid_form_edit_then_send() {
    let (mut s, mut ui) = connected();
    let mut form = PidPair::default();
    let params = PidParameters {
        kp: 2.5,
        ki: 0.05,
        kd: 0.75,
    };
    assert_eq!(
        s.handle(ConsoleRequest::EditPid(PidController::Speed, params), &mut form, &mut ui),
        Flow::Continue
    );
    assert!(sent(&s).is_empty());

    s.handle(ConsoleRequest::SendPid(PidController::Speed), &mut form, &mut ui);
    assert_eq!(
        codec::decode_command(&sent(&s)[0]),
        Ok(Command::set_pid(PidController::Speed, params))
    );

    s.handle(ConsoleRequest::ResetPid, &mut form, &mut ui);
    assert_eq!(form, PidPair::default());
}

#[test]
fn quit_closes_session() {
    let (mut s, mut ui) = connected();
    let mut form = PidPair::default();
    assert_eq!(s.handle(ConsoleRequest::Quit, &mut form, &mut ui), Flow::Quit);
    assert!(!s.is_open());
    assert_eq!(s.state(), LinkState::Disconnected);
}
