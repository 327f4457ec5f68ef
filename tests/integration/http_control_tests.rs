//! HTTP control surface driven through the session.

use super::mock_link::{MockHttp, MockTransport, RecordingUi, UiCall};

use carlink::app::commands::{ControlAction, PidController, PidPair, PidParameters};
use carlink::app::events::RunState;
use carlink::app::ports::NotifyLevel;
use carlink::app::session::LinkSession;
use carlink::config::LinkConfig;
use carlink::error::HttpControlError;

type Session = LinkSession<MockTransport, MockHttp>;

fn session(http: MockHttp) -> Session {
    LinkSession::new(LinkConfig::default(), MockTransport::new(), http)
}

#[test]
fn start_confirmed_sets_running() {
    let mut s = session(MockHttp::answering(&[200]));
    let mut ui = RecordingUi::new();

    s.http_control(ControlAction::Start, 50, &mut ui).unwrap();

    assert_eq!(s.run_state(), RunState::Running);
    assert_eq!(s.http().paths(), vec!["/control"]);
    assert_eq!(s.http().param(0, "command"), Some("start"));
    assert_eq!(s.http().param(0, "speed"), Some("50"));
    assert_eq!(
        ui.calls,
        vec![
            UiCall::RunState(RunState::Running),
            UiCall::Notify(NotifyLevel::Success, "start command sent".into()),
        ]
    );
}

#[test]
fn non_2xx_leaves_run_state_and_reports() {
    let mut s = session(MockHttp::answering(&[500]));
    let mut ui = RecordingUi::new();

    let err = s.http_control(ControlAction::Start, 50, &mut ui).unwrap_err();

    assert_eq!(err, HttpControlError::Status(500));
    assert_eq!(s.run_state(), RunState::Idle);
    assert_eq!(ui.notifications(NotifyLevel::Error).len(), 1);
    assert!(ui.notifications(NotifyLevel::Success).is_empty());
}

#[test]
fn request_failure_is_not_retried() {
    let mut http = MockHttp::new();
    http.responses
        .push_back(Err(HttpControlError::Request("connection refused".into())));
    let mut s = session(http);
    let mut ui = RecordingUi::new();

    let err = s.http_control(ControlAction::Stop, 0, &mut ui).unwrap_err();

    assert!(matches!(err, HttpControlError::Request(_)));
    assert_eq!(s.http().requests.len(), 1);
    assert_eq!(s.run_state(), RunState::Idle);
    let errors = ui.notifications(NotifyLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("connection refused"));
}

#[test]
fn stop_sets_stopped_and_beep_changes_nothing() {
    let mut s = session(MockHttp::new());
    let mut ui = RecordingUi::new();

    s.http_control(ControlAction::Start, 30, &mut ui).unwrap();
    s.http_control(ControlAction::Stop, 30, &mut ui).unwrap();
    assert_eq!(s.run_state(), RunState::Stopped);

    ui.clear();
    s.http_control(ControlAction::Beep, 30, &mut ui).unwrap();
    assert_eq!(s.run_state(), RunState::Stopped);
    assert_eq!(
        ui.calls,
        vec![UiCall::Notify(NotifyLevel::Success, "beep command sent".into())]
    );
}

#[test]
fn set_pid_sends_all_gains() {
    let mut s = session(MockHttp::new());
    let mut ui = RecordingUi::new();
    let params = PidParameters {
        kp: 2.0,
        ki: 0.5,
        kd: 0.25,
    };

    s.http_set_pid(PidController::Direction, params, &mut ui).unwrap();

    assert_eq!(s.http().paths(), vec!["/pid"]);
    assert_eq!(s.http().param(0, "direction"), Some("direction"));
    assert_eq!(s.http().param(0, "kp"), Some("2"));
    assert_eq!(s.http().param(0, "ki"), Some("0.5"));
    assert_eq!(s.http().param(0, "kd"), Some("0.25"));
}

#[test]
fn apply_pair_sends_direction_then_speed() {
    let mut s = session(MockHttp::new());
    let mut ui = RecordingUi::new();
    let pair = PidPair::default();

    s.http_apply_pid_pair(&pair, &mut ui).unwrap();

    assert_eq!(s.http().paths(), vec!["/pid", "/pid"]);
    assert_eq!(s.http().param(0, "direction"), Some("direction"));
    assert_eq!(s.http().param(1, "direction"), Some("speed"));
    assert_eq!(
        ui.notifications(NotifyLevel::Success),
        vec!["PID parameters updated".to_owned()]
    );
}

#[test]
fn apply_pair_stops_after_direction_failure() {
    let mut s = session(MockHttp::answering(&[503]));
    let mut ui = RecordingUi::new();

    let err = s
        .http_apply_pid_pair(&PidPair::default(), &mut ui)
        .unwrap_err();

    assert_eq!(err, HttpControlError::Status(503));
    assert_eq!(s.http().requests.len(), 1);
    assert!(ui.notifications(NotifyLevel::Success).is_empty());
    assert_eq!(ui.notifications(NotifyLevel::Error).len(), 1);
}

#[test]
fn http_path_ignores_link_state() {
    // Never opened: the duplex link is down but HTTP still works.
    let mut s = session(MockHttp::new());
    let mut ui = RecordingUi::new();
    s.http_control(ControlAction::Start, 10, &mut ui).unwrap();
    assert_eq!(s.run_state(), RunState::Running);
    assert!(s.connection().transport().sent.is_empty());
}
