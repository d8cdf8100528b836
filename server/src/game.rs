//! Round orchestration: starting rounds, judging answers, scoring and expiry

use crate::config::GameConfig;
use crate::problem::ProblemGenerator;
use crate::reaper::Reaper;
use crate::session::{Session, SessionStore};
use crate::timer::{TimerEvent, TimerScheduler};
use log::{debug, error, info, warn};
use shared::{
    AnswerReply, Feedback, LeaderboardEntry, LeaderboardReply, PlayerId, StartReply, StatusReply,
};
use std::cmp::Reverse;
use thiserror::Error;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Player not found. Start a new game.")]
    NotFound(PlayerId),
    #[error("Score overflow for player {0}")]
    ScoreOverflow(PlayerId),
}

pub struct GameController {
    sessions: SessionStore,
    generator: ProblemGenerator,
    scheduler: TimerScheduler,
    reaper: Reaper,
    config: GameConfig,
}

impl GameController {
    pub fn new(config: GameConfig, scheduler: TimerScheduler) -> Self {
        let generator = match config.seed {
            Some(seed) => ProblemGenerator::seeded(seed),
            None => ProblemGenerator::new(),
        };

        Self {
            sessions: SessionStore::new(),
            generator,
            scheduler,
            reaper: Reaper::new(config.inactivity_timeout),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_count(&self) -> usize {
        self.sessions.len()
    }

    pub(crate) fn session(&self, player_id: &str) -> Option<&Session> {
        self.sessions.get(player_id)
    }

    /// Starts a new round, creating the player on first use.
    ///
    /// A missing or blank id gets a fresh UUID. Any countdown from an earlier
    /// round is cancelled, the previous score is folded into `top_score`, and the
    /// new round is fully prepared before the session is touched.
    pub fn start(&mut self, player_id: Option<PlayerId>) -> StartReply {
        let player_id = match player_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };
        let round_time = self.config.round_time;
        let generated = self.generator.generate();

        let session = self.sessions.get_or_create(&player_id);
        session.cancel_timer();
        session.top_score = session.top_score.max(session.score);
        session.score = 0;
        session.time_left = round_time;
        session.epoch = session.epoch.wrapping_add(1);
        session.round = Some(generated);
        session.touch();
        session.replace_timer(self.scheduler.schedule(&player_id, session.epoch));

        info!("Game started for {}", player_id);

        StartReply::Success {
            problem: generated.text(),
            time_left: session.time_left,
            score: session.score,
            game_active: true,
            player_id,
        }
    }

    /// Judges an answer to the problem on screen.
    ///
    /// Once a round has ended every further answer reports the same final score.
    pub fn answer(&mut self, player_id: &str, answer: bool) -> AnswerReply {
        match self.try_answer(player_id, answer) {
            Ok(reply) => reply,
            Err(err @ GameError::NotFound(_)) => {
                warn!("Answer from unknown player {}", player_id);
                AnswerReply::Error {
                    message: err.to_string(),
                }
            }
            Err(err) => {
                error!("Check answer error: {}", err);
                AnswerReply::Error {
                    message: err.to_string(),
                }
            }
        }
    }

    fn try_answer(&mut self, player_id: &str, answer: bool) -> Result<AnswerReply, GameError> {
        let GameConfig {
            round_time,
            correct_bonus,
            wrong_penalty,
            ..
        } = self.config;

        let session = self
            .sessions
            .get_mut(player_id)
            .ok_or_else(|| GameError::NotFound(player_id.to_string()))?;
        session.touch();

        let Some(round) = session.round else {
            return Ok(AnswerReply::GameOver {
                final_score: session.score,
            });
        };

        let correct = answer == round.is_correct;
        let (time_left, score) = if correct {
            let score = session
                .score
                .checked_add(1)
                .ok_or_else(|| GameError::ScoreOverflow(player_id.to_string()))?;
            (
                session.time_left.saturating_add(correct_bonus).min(round_time),
                score,
            )
        } else {
            (session.time_left.saturating_sub(wrong_penalty), session.score)
        };

        session.time_left = time_left;
        session.score = score;
        session.top_score = session.top_score.max(score);

        if time_left == 0 {
            session.end_round();
            info!("Player {} game over - out of time, score {}", player_id, score);
            return Ok(AnswerReply::GameOver { final_score: score });
        }

        let next = self.generator.generate();
        session.round = Some(next);

        Ok(AnswerReply::Continue {
            problem: next.text(),
            time_left,
            score,
            feedback: if correct {
                Feedback::Correct
            } else {
                Feedback::Wrong
            },
            game_active: true,
        })
    }

    pub fn status(&self, player_id: &str) -> StatusReply {
        match self.sessions.get(player_id) {
            Some(session) => StatusReply::Success {
                game_active: session.is_active(),
                time_left: session.time_left,
                score: session.score,
                top_score: session.top_score,
                current_problem: session.current_problem(),
                idle_secs: session.idle_secs(Instant::now()),
            },
            None => StatusReply::Error {
                message: GameError::NotFound(player_id.to_string()).to_string(),
            },
        }
    }

    /// Players ordered by best score, highest first
    pub fn leaderboard(&self) -> LeaderboardReply {
        let mut players: Vec<LeaderboardEntry> = self
            .sessions
            .iter()
            .map(|session| LeaderboardEntry {
                player_id: session.id.clone(),
                score: session.top_score,
                active: session.is_active(),
            })
            .collect();
        players.sort_by(|a, b| {
            Reverse(a.score)
                .cmp(&Reverse(b.score))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        LeaderboardReply::Success { players }
    }

    /// Applies one countdown tick. Ticks from a replaced round, for an ended
    /// round or for a reaped player are dropped.
    pub fn on_timer_tick(&mut self, event: TimerEvent) {
        let Some(session) = self.sessions.get_mut(&event.player_id) else {
            debug!("Dropping tick for unknown player {}", event.player_id);
            return;
        };
        if session.epoch != event.epoch || !session.is_active() {
            debug!(
                "Dropping stale tick for {} (epoch {}, current {})",
                event.player_id, event.epoch, session.epoch
            );
            return;
        }

        session.time_left = session.time_left.saturating_sub(1);
        session.touch();

        if session.time_left == 0 {
            session.end_round();
            info!(
                "Player {} game over - time expired, score {}",
                event.player_id, session.score
            );
        }
    }

    /// Removes idle players. Returns the ids that were removed.
    pub fn reap_inactive(&mut self, now: Instant) -> Vec<PlayerId> {
        self.reaper.sweep(&mut self.sessions, now)
    }

    /// Cancels every running countdown. Returns how many were running.
    pub fn shutdown(&mut self) -> usize {
        self.sessions.cancel_all_timers()
    }
}
