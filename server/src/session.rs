//! Player session state and the in-memory session store
//!
//! This module holds everything the server remembers about a player:
//! - Round progress (score, remaining time, the problem on screen)
//! - Best score across rounds
//! - Activity tracking used by the reaper
//! - The handle of the countdown driving the current round
//!
//! The store is owned by the game loop and never shared across tasks, so it
//! needs no locking.

use crate::problem::GeneratedProblem;
use crate::timer::SessionTimer;
use log::info;
use shared::PlayerId;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Player not found: {0}")]
    NotFound(PlayerId),
}

/// State of a single player
///
/// A session is either active, in which case `round` holds the problem on
/// screen together with its hidden answer, or ended, in which case `round` is
/// `None`. Scores survive round boundaries; `top_score` only ever grows.
#[derive(Debug)]
pub struct Session {
    pub id: PlayerId,
    pub score: u32,
    pub top_score: u32,
    pub time_left: u32,
    /// Problem currently shown to the player; present only while a round runs
    pub round: Option<GeneratedProblem>,
    /// Incremented on every round start; ticks from older rounds are ignored
    pub epoch: u64,
    pub last_activity: Instant,
    timer: Option<SessionTimer>,
}

impl Session {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            score: 0,
            top_score: 0,
            time_left: 0,
            round: None,
            epoch: 0,
            last_activity: Instant::now(),
            timer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.round.is_some()
    }

    pub fn current_problem(&self) -> Option<String> {
        self.round.map(|round| round.text())
    }

    /// Whole seconds since the last request or tick
    pub fn idle_secs(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.last_activity).as_secs()
    }

    /// Marks the session as used right now
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Returns true if the session has been idle for longer than `timeout` at `now`.
    pub fn is_inactive(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > timeout
    }

    /// Installs the countdown for the current round, cancelling any previous one.
    pub fn replace_timer(&mut self, timer: SessionTimer) {
        if let Some(previous) = self.timer.replace(timer) {
            previous.cancel();
        }
    }

    /// Cancels the running countdown. Returns false if there was none.
    pub fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer_epoch(&self) -> Option<u64> {
        self.timer.as_ref().map(SessionTimer::epoch)
    }

    /// Ends the current round: no problem on screen, no countdown.
    pub fn end_round(&mut self) {
        self.round = None;
        self.cancel_timer();
    }
}

/// All known sessions indexed by player id
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<PlayerId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player_id: &str) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    pub fn get_mut(&mut self, player_id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.sessions.contains_key(player_id)
    }

    /// Returns the session for `player_id`, creating an empty one on first use.
    pub fn get_or_create(&mut self, player_id: &str) -> &mut Session {
        self.sessions
            .entry(player_id.to_string())
            .or_insert_with(|| {
                info!("New player created: {}", player_id);
                Session::new(player_id.to_string())
            })
    }

    /// Removes a session, handing it back so the caller can release its timer.
    pub fn remove(&mut self, player_id: &str) -> Result<Session, SessionError> {
        self.sessions
            .remove(player_id)
            .ok_or_else(|| SessionError::NotFound(player_id.to_string()))
    }

    /// Snapshot of the ids idle for longer than `timeout` at `now`.
    ///
    /// The snapshot lets callers delete entries while walking the list.
    pub fn inactive_ids(&self, now: Instant, timeout: Duration) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|session| session.is_inactive(now, timeout))
            .map(|session| session.id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Cancels every running countdown. Returns how many were running.
    pub fn cancel_all_timers(&mut self) -> usize {
        self.sessions
            .values_mut()
            .map(Session::cancel_timer)
            .filter(|cancelled| *cancelled)
            .count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemGenerator;
    use crate::timer::TimerScheduler;

    const TIMEOUT: Duration = Duration::from_secs(600);

    #[test]
    fn test_session_creation() {
        let session = Session::new("p1".into());

        assert_eq!(session.id, "p1");
        assert_eq!(session.score, 0);
        assert_eq!(session.top_score, 0);
        assert!(!session.is_active());
        assert!(session.current_problem().is_none());
        assert!(!session.has_timer());
    }

    #[test]
    fn test_round_exposes_problem_text() {
        let mut session = Session::new("p1".into());
        let generated = ProblemGenerator::seeded(1).generate();
        session.round = Some(generated);

        assert!(session.is_active());
        assert_eq!(session.current_problem(), Some(generated.text()));
    }

    #[test]
    fn test_inactivity() {
        let session = Session::new("p1".into());
        let now = session.last_activity;

        assert!(!session.is_inactive(now, TIMEOUT));
        assert!(!session.is_inactive(now + TIMEOUT, TIMEOUT));
        assert!(session.is_inactive(now + TIMEOUT + Duration::from_secs(1), TIMEOUT));
    }

    #[test]
    fn test_idle_secs() {
        let session = Session::new("p1".into());
        let seen = session.last_activity;

        assert_eq!(session.idle_secs(seen), 0);
        assert_eq!(session.idle_secs(seen + Duration::from_millis(2500)), 2);
    }

    #[test]
    fn test_get_or_create_is_lazy_and_stable() {
        let mut store = SessionStore::new();
        assert!(store.is_empty());

        store.get_or_create("p1").top_score = 9;
        assert_eq!(store.len(), 1);

        let again = store.get_or_create("p1");
        assert_eq!(again.top_score, 9);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = SessionStore::new();
        store.get_or_create("p1");

        let removed = store.remove("p1").unwrap();
        assert_eq!(removed.id, "p1");
        assert!(!store.contains("p1"));
        assert_eq!(
            store.remove("p1").unwrap_err(),
            SessionError::NotFound("p1".into())
        );
    }

    #[test]
    fn test_inactive_ids() {
        let mut store = SessionStore::new();
        store.get_or_create("old");
        store.get_or_create("fresh");

        let now = Instant::now() + TIMEOUT + Duration::from_secs(1);
        store.get_mut("fresh").unwrap().last_activity = now;

        assert_eq!(store.inactive_ids(now, TIMEOUT), vec!["old".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_timer_keeps_one() {
        let (scheduler, _events) = TimerScheduler::new(Duration::from_secs(1));
        let mut session = Session::new("p1".into());

        session.replace_timer(scheduler.schedule("p1", 1));
        session.replace_timer(scheduler.schedule("p1", 2));
        assert_eq!(session.timer_epoch(), Some(2));

        assert!(session.cancel_timer());
        assert!(!session.cancel_timer());
        assert_eq!(session.timer_epoch(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_timers() {
        let (scheduler, _events) = TimerScheduler::new(Duration::from_secs(1));
        let mut store = SessionStore::new();
        store
            .get_or_create("a")
            .replace_timer(scheduler.schedule("a", 1));
        store
            .get_or_create("b")
            .replace_timer(scheduler.schedule("b", 1));
        store.get_or_create("idle");

        assert_eq!(store.cancel_all_timers(), 2);
        assert!(store.iter().all(|session| !session.has_timer()));
    }
}
