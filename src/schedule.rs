//! Timers that drive the daily rollover and the date display.
//!
//! Timers never touch checklist state themselves: they post a [`TimerEvent`]
//! to a channel and the event loop that owns the `Session` handles it, so all
//! mutations stay serialized on one thread.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime};

/// Interval between rollover checks once the first midnight has passed
pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Interval for refreshing the displayed date
pub const CLOCK_REFRESH: Duration = Duration::from_secs(60);

/// What a timer fired for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The one-shot timer at local midnight
    Midnight,
    /// The recurring 24 hour timer armed after the first midnight
    Daily,
    /// Refresh the date display
    ClockTick,
}

/// Capability to run callbacks later. Both timers run for the life of the
/// process; there is no cancellation.
pub trait Scheduler {
    fn schedule_once(&mut self, delay: Duration, event: TimerEvent);
    fn schedule_every(&mut self, interval: Duration, event: TimerEvent);
}

/// Time remaining until the next local midnight after `now`.
pub fn until_next_midnight(now: NaiveDateTime) -> Duration {
    let tomorrow = now.date().checked_add_days(Days::new(1)).unwrap_or(now.date());
    let midnight = tomorrow.and_time(NaiveTime::MIN);
    (midnight - now).to_std().unwrap_or(Duration::ZERO)
}

/// Arm the timers a long-running front end needs: the midnight one-shot and
/// the once-a-minute clock refresh.
pub fn arm_daily_timers(scheduler: &mut dyn Scheduler, now: NaiveDateTime) {
    scheduler.schedule_once(until_next_midnight(now), TimerEvent::Midnight);
    scheduler.schedule_every(CLOCK_REFRESH, TimerEvent::ClockTick);
}

/// Follow-up for a fired timer: after the first midnight the 24 hour interval
/// takes over.
pub fn on_timer(scheduler: &mut dyn Scheduler, event: TimerEvent) {
    if event == TimerEvent::Midnight {
        scheduler.schedule_every(DAY, TimerEvent::Daily);
    }
}

/// Whether a fired timer should run the rollover check
pub fn triggers_rollover(event: TimerEvent) -> bool {
    matches!(event, TimerEvent::Midnight | TimerEvent::Daily)
}

// ---------------------------------------------------------------------------
// Thread-backed scheduler
// ---------------------------------------------------------------------------

/// Runs each timer on its own sleeping thread and posts events to a channel.
/// A timer thread exits once the receiving side is gone.
pub struct ThreadScheduler {
    tx: Sender<TimerEvent>,
}

impl ThreadScheduler {
    pub fn new(tx: Sender<TimerEvent>) -> Self {
        ThreadScheduler { tx }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_once(&mut self, delay: Duration, event: TimerEvent) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(event);
        });
    }

    fn schedule_every(&mut self, interval: Duration, event: TimerEvent) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
    }
}
