//! Async link loop: one thread, cooperative tasks.
//!
//! Uses `edge-executor` for task scheduling and `async-io-mini` for
//! reactor-driven timers (no busy-spinning).  Two concurrent futures:
//!
//! 1. **Tick**: drives [`LinkSession::tick`] on a reactor timer (10 ms by
//!    default): transport reads, reconnect timer, status/fallback pollers.
//! 2. **Console**: truly async via `CONSOLE_CHANNEL.receive().await`;
//!    wakes as soon as the reader thread submits a request.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                    │
//!  │  ┌──────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                │  │
//!  │  │   ┌────────────┐      ┌──────────────────┐   │  │
//!  │  │   │ Tick       │      │ Console          │   │  │
//!  │  │   │ 10ms ⏱     │      │ wake-on-request  │   │  │
//!  │  │   └────────────┘      └──────────────────┘   │  │
//!  │  └──────────────────────────────────────────────┘  │
//!  └────────────────────────────────────────────────────┘
//! ```
//!
//! The session is shared through a `RefCell` borrowed by both tasks.  No
//! borrow is held across an `.await`, so the two tasks never observe each
//! other mid-step.

use core::cell::RefCell;
use core::time::Duration;

use log::info;

use super::channels::{CONSOLE_CHANNEL, SHUTDOWN, request_shutdown};
use super::transport::Transport;
use crate::adapters::time::MonotonicClock;
use crate::app::commands::PidPair;
use crate::app::ports::{ConsoleUi, HttpControlPort};
use crate::app::session::{Flow, LinkSession};

async fn tick_loop<T, H, U>(
    session: &RefCell<&mut LinkSession<T, H>>,
    ui: &RefCell<&mut U>,
    clock: MonotonicClock,
    interval: Duration,
) where
    T: Transport,
    H: HttpControlPort,
    U: ConsoleUi,
{
    loop {
        {
            let mut s = session.borrow_mut();
            let mut u = ui.borrow_mut();
            s.tick(clock.now_ms(), &mut **u);
        }
        async_io_mini::Timer::after(interval).await;
    }
}

async fn console_loop<T, H, U>(session: &RefCell<&mut LinkSession<T, H>>, ui: &RefCell<&mut U>)
where
    T: Transport,
    H: HttpControlPort,
    U: ConsoleUi,
{
    let mut form = PidPair::default();
    loop {
        let request = CONSOLE_CHANNEL.receive().await;
        let flow = {
            let mut s = session.borrow_mut();
            let mut u = ui.borrow_mut();
            s.handle(request, &mut form, &mut **u)
        };
        if flow == Flow::Quit {
            request_shutdown();
            return;
        }
    }
}

/// Open the session and run it until a `Quit` request or
/// [`request_shutdown`].  The session is closed on return.
pub fn run<T, H, U>(session: &mut LinkSession<T, H>, ui: &mut U, clock: MonotonicClock)
where
    T: Transport,
    H: HttpControlPort,
    U: ConsoleUi,
{
    let interval = Duration::from_millis(session.config().transport_poll_interval_ms.max(1));
    SHUTDOWN.reset();
    session.open(clock.now_ms(), ui);

    let session = RefCell::new(session);
    let ui = RefCell::new(ui);
    {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        executor
            .spawn(tick_loop(&session, &ui, clock, interval))
            .detach();
        executor.spawn(console_loop(&session, &ui)).detach();

        info!("Link loop started (tick {} ms)", interval.as_millis());

        // async_io_mini drives the timers while the executor drives the
        // spawned tasks.
        futures_lite::future::block_on(executor.run(SHUTDOWN.wait()));
    }

    let session = session.into_inner();
    let ui = ui.into_inner();
    session.close(ui);
    info!("Link loop stopped");
}
