//! Game loop coordinating requests, countdown ticks and session cleanup
//!
//! The [`GameServer`] owns the [`GameController`] and is the only place where
//! session state changes. Everything else talks to it through messages:
//! - HTTP handlers send a [`ServerMessage`] with a oneshot reply channel via a
//!   cloneable [`GameHandle`]
//! - Session timers send [`TimerEvent`]s
//! - A cleanup interval inside the loop triggers the reaper
//!
//! Messages are handled one at a time in arrival order.

use crate::config::GameConfig;
use crate::game::GameController;
use crate::timer::{TimerEvent, TimerScheduler};
use log::{debug, info};
use shared::{AnswerReply, HealthReply, LeaderboardReply, PlayerId, StartReply, StatusReply};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Instant, MissedTickBehavior};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("game loop is not running")]
    Closed,
}

/// Requests handled by the game loop
#[derive(Debug)]
pub enum ServerMessage {
    Start {
        player_id: Option<PlayerId>,
        reply: oneshot::Sender<StartReply>,
    },
    Answer {
        player_id: PlayerId,
        answer: bool,
        reply: oneshot::Sender<AnswerReply>,
    },
    Status {
        player_id: PlayerId,
        reply: oneshot::Sender<StatusReply>,
    },
    Leaderboard {
        reply: oneshot::Sender<LeaderboardReply>,
    },
    Health {
        reply: oneshot::Sender<HealthReply>,
    },
    Shutdown,
}

/// Cloneable entry point into a running [`GameServer`]
#[derive(Debug, Clone)]
pub struct GameHandle {
    server_tx: mpsc::UnboundedSender<ServerMessage>,
}

impl GameHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ServerMessage,
    ) -> Result<T, ServerError> {
        let (reply, response) = oneshot::channel();
        self.server_tx
            .send(build(reply))
            .map_err(|_| ServerError::Closed)?;
        response.await.map_err(|_| ServerError::Closed)
    }

    pub async fn start(&self, player_id: Option<PlayerId>) -> Result<StartReply, ServerError> {
        self.request(|reply| ServerMessage::Start { player_id, reply })
            .await
    }

    pub async fn answer(
        &self,
        player_id: PlayerId,
        answer: bool,
    ) -> Result<AnswerReply, ServerError> {
        self.request(|reply| ServerMessage::Answer {
            player_id,
            answer,
            reply,
        })
        .await
    }

    pub async fn status(&self, player_id: PlayerId) -> Result<StatusReply, ServerError> {
        self.request(|reply| ServerMessage::Status { player_id, reply })
            .await
    }

    pub async fn leaderboard(&self) -> Result<LeaderboardReply, ServerError> {
        self.request(|reply| ServerMessage::Leaderboard { reply })
            .await
    }

    pub async fn health(&self) -> Result<HealthReply, ServerError> {
        self.request(|reply| ServerMessage::Health { reply }).await
    }

    /// Asks the game loop to stop. Returns false if it already stopped.
    pub fn shutdown(&self) -> bool {
        self.server_tx.send(ServerMessage::Shutdown).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.server_tx.is_closed()
    }
}

/// Owner of all session state
pub struct GameServer {
    controller: GameController,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    started_at: Instant,
}

impl GameServer {
    pub fn new(config: GameConfig) -> (Self, GameHandle) {
        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (scheduler, timer_rx) = TimerScheduler::new(config.tick_period);

        let server = Self {
            controller: GameController::new(config, scheduler),
            server_rx,
            timer_rx,
            started_at: Instant::now(),
        };
        (server, GameHandle { server_tx })
    }

    /// Runs until a shutdown message arrives or every handle is dropped, then
    /// cancels all countdowns.
    pub async fn run(mut self) {
        let mut cleanup = interval(self.controller.config().cleanup_interval);
        cleanup.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Skip the first tick since it fires immediately
        cleanup.tick().await;

        info!("Game loop started");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Game loop shutting down");
                            break;
                        }
                        Some(message) => self.handle_message(message),
                    }
                },

                Some(event) = self.timer_rx.recv() => {
                    self.controller.on_timer_tick(event);
                },

                _ = cleanup.tick() => {
                    let reaped = self.controller.reap_inactive(Instant::now());
                    debug!(
                        "Cleanup sweep removed {} players, {} remain",
                        reaped.len(),
                        self.controller.player_count()
                    );
                },
            }
        }

        let cancelled = self.controller.shutdown();
        info!("Cancelled {} running rounds", cancelled);
    }

    fn handle_message(&mut self, message: ServerMessage) {
        // A send error only means the requester stopped waiting.
        let delivered = match message {
            ServerMessage::Start { player_id, reply } => {
                reply.send(self.controller.start(player_id)).is_ok()
            }
            ServerMessage::Answer {
                player_id,
                answer,
                reply,
            } => reply
                .send(self.controller.answer(&player_id, answer))
                .is_ok(),
            ServerMessage::Status { player_id, reply } => {
                reply.send(self.controller.status(&player_id)).is_ok()
            }
            ServerMessage::Leaderboard { reply } => {
                reply.send(self.controller.leaderboard()).is_ok()
            }
            ServerMessage::Health { reply } => reply.send(self.health()).is_ok(),
            ServerMessage::Shutdown => true,
        };

        if !delivered {
            debug!("Requester went away before the reply was sent");
        }
    }

    fn health(&self) -> HealthReply {
        HealthReply {
            status: "healthy".to_string(),
            players: self.controller.player_count(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}
