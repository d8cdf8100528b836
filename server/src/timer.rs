//! Per-session countdown timers
//!
//! Every active session owns one [`SessionTimer`]: a spawned task that emits a
//! [`TimerEvent`] once per tick period into the game loop's channel. The timer
//! never touches session state itself; the game loop applies each event and
//! discards it when the epoch it carries is no longer the session's current one.
//!
//! Cancelling aborts the task, so no further events are produced. An event that
//! was already queued before the abort is rejected by the epoch check.

use log::debug;
use shared::PlayerId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One elapsed tick for the round identified by `epoch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEvent {
    pub player_id: PlayerId,
    pub epoch: u64,
}

/// Handle to a running countdown. Dropping the handle cancels the countdown.
#[derive(Debug)]
pub struct SessionTimer {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl SessionTimer {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Stops the countdown. Calling this more than once is harmless.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns session timers that all report into the same channel
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    period: Duration,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerScheduler {
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (Self { period, events }, receiver)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts a countdown whose first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, player_id: &str, epoch: u64) -> SessionTimer {
        let event = TimerEvent {
            player_id: player_id.to_string(),
            epoch,
        };
        let events = self.events.clone();
        let period = self.period;
        // Taken before spawning so the first tick does not drift with task start-up.
        let first_tick = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if events.send(event.clone()).is_err() {
                    debug!("Timer for {} stopped: game loop is gone", event.player_id);
                    break;
                }
            }
        });

        SessionTimer { epoch, handle }
    }
}
