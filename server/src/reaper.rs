//! Eviction of idle sessions

use crate::session::{SessionError, SessionStore};
use log::{debug, info, warn};
use shared::PlayerId;
use std::time::Duration;
use tokio::time::Instant;

/// Removes sessions that have been idle for longer than the inactivity timeout
#[derive(Debug, Clone, Copy)]
pub struct Reaper {
    timeout: Duration,
}

impl Reaper {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sweeps the store once and returns the ids that were removed.
    ///
    /// A failure on one session is logged and the sweep moves on to the next.
    pub fn sweep(&self, store: &mut SessionStore, now: Instant) -> Vec<PlayerId> {
        let expired = store.inactive_ids(now, self.timeout);
        self.reap_all(store, expired)
    }

    /// Removes every id in `expired`, skipping ids that are already gone.
    pub fn reap_all(&self, store: &mut SessionStore, expired: Vec<PlayerId>) -> Vec<PlayerId> {
        let mut reaped = Vec::with_capacity(expired.len());

        for player_id in expired {
            match Self::reap(store, &player_id) {
                Ok(()) => {
                    info!("Cleaned up inactive player: {}", player_id);
                    reaped.push(player_id);
                }
                Err(err) => warn!("Error cleaning player {}: {}", player_id, err),
            }
        }

        reaped
    }

    fn reap(store: &mut SessionStore, player_id: &str) -> Result<(), SessionError> {
        let mut session = store.remove(player_id)?;
        if session.cancel_timer() {
            debug!("Cancelled countdown of reaped player {}", player_id);
        }
        Ok(())
    }
}
