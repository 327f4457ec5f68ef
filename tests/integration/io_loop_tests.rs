//! The async link loop end to end, fed through the console channel.
//!
//! Only one test in this binary may touch `CONSOLE_CHANNEL`, since it is a
//! process-wide static.

use super::mock_link::{MockHttp, MockTransport, RecordingUi};

use carlink::adapters::time::MonotonicClock;
use carlink::app::commands::{ConsoleRequest, PidController, PidParameters};
use carlink::app::ports::NotifyLevel;
use carlink::app::session::LinkSession;
use carlink::config::LinkConfig;
use carlink::link::connection::LinkState;
use carlink::link::{channels, io_task};

#[test]
fn queued_requests_run_until_quit() {
    let mut session = LinkSession::new(LinkConfig::default(), MockTransport::new(), MockHttp::new());
    let mut ui = RecordingUi::new();

    let params = PidParameters {
        kp: 3.0,
        ki: 0.2,
        kd: 0.4,
    };
    assert!(channels::submit(ConsoleRequest::EditPid(PidController::Direction, params)));
    assert!(channels::submit(ConsoleRequest::ResetPid));
    assert!(channels::submit(ConsoleRequest::Quit));

    io_task::run(&mut session, &mut ui, MonotonicClock::new());

    assert!(!session.is_open());
    assert_eq!(session.state(), LinkState::Disconnected);
    assert!(session.connection().transport().opens() >= 1);
    assert!(session.connection().transport().closes >= 1);
    assert_eq!(
        ui.notifications(NotifyLevel::Info),
        vec![
            "direction PID form: kp=3 ki=0.2 kd=0.4".to_owned(),
            "PID form reset to defaults".to_owned(),
        ]
    );
    let last = ui.transitions().last().copied();
    assert_eq!(last.map(|(_, to)| to), Some(LinkState::Disconnected));
}
