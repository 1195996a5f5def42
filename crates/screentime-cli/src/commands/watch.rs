//! Long-running host loop.
//!
//! Drives the periodic stimuli on a single-threaded runtime: the countdown
//! tick, the rollover check and the alarm repeat. Every stimulus is a plain
//! call into the session, so nothing here owns any countdown state.

use chrono::Utc;
use screentime_core::{CivilCalendar, ALARM_REPEAT_INTERVAL, ROLLOVER_CHECK_INTERVAL, TICK_INTERVAL};
use tokio::time::{interval, MissedTickBehavior};

use super::{open_session, print_event};

pub fn run(calendar: CivilCalendar, snapshots: bool) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(calendar, snapshots))
}

async fn watch(calendar: CivilCalendar, snapshots: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(calendar)?;
    print_event(&session.snapshot(Utc::now()))?;

    // Late ticks are harmless: the countdown measures wall time from its
    // anchor, so there is nothing to replay.
    let mut tick = interval(TICK_INTERVAL);
    let mut rollover = interval(ROLLOVER_CHECK_INTERVAL);
    let mut alarm = interval(ALARM_REPEAT_INTERVAL);
    for timer in [&mut tick, &mut rollover, &mut alarm] {
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = Utc::now();
                // Pick up commands issued from other invocations.
                session.reload(now);
                if let Some(event) = session.tick(now) {
                    print_event(&event)?;
                }
                if snapshots {
                    print_event(&session.snapshot(now))?;
                }
            }
            _ = rollover.tick() => {
                if let Some(event) = session.check_rollover(Utc::now()) {
                    print_event(&event)?;
                }
            }
            _ = alarm.tick() => {
                if let Some(event) = session.alarm_tick(Utc::now()) {
                    print_event(&event)?;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("watch stopped");
                break;
            }
        }
    }
    Ok(())
}
