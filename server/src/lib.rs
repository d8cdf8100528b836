//! # Math Quiz Server Library
//!
//! This library provides the authoritative server for the timed true/false
//! arithmetic quiz. Players are shown statements such as `"12 = 7 + 5"` and
//! answer whether they hold. Every correct answer adds a point and time to the
//! clock, every wrong one costs time, and the round ends when the clock runs
//! out.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Game State
//! The server owns every session. Scores, remaining time and the hidden truth
//! of each problem never leave the process; clients only see the problem text
//! and the outcome of their answers.
//!
//! ### Round Timing
//! Each running round has its own countdown that removes one second per tick.
//! Starting a new round replaces the previous countdown, so a player never has
//! two clocks draining the same round.
//!
//! ### Session Lifecycle
//! Sessions are created on first start, kept across rounds so the best score
//! survives, and reaped after a period without any request.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! All state lives inside [`GameServer`], which processes HTTP requests,
//! countdown ticks and cleanup sweeps one at a time. Handlers never lock
//! anything; they send a message through a [`GameHandle`] and await the reply.
//! A tick and an answer for the same player therefore can never interleave.
//!
//! ### Stale Tick Protection
//! Every round start bumps a per-session epoch. Countdown ticks carry the
//! epoch they were scheduled for, and ticks from an earlier round are dropped.
//!
//! ## Module Organization
//!
//! ### Problem Module (`problem`)
//! Random problem generation:
//! - Operator and operand selection
//! - Perturbation of the displayed result for false statements
//!
//! ### Session Module (`session`)
//! Per-player state and the in-memory store keyed by player id.
//!
//! ### Timer Module (`timer`)
//! Cancellable per-session countdown tasks.
//!
//! ### Reaper Module (`reaper`)
//! Periodic eviction of idle sessions.
//!
//! ### Game Module (`game`)
//! The [`GameController`] implementing start, answer, status and leaderboard.
//!
//! ### Network Module (`network`)
//! The event loop and the handle used to talk to it.
//!
//! ### HTTP Module (`http`)
//! JSON routes in front of the event loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::{http, GameConfig, GameServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (game, handle) = GameServer::new(GameConfig::default());
//!     tokio::spawn(game.run());
//!
//!     let shutdown = async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     };
//!     let (address, serve) = http::bind(([127, 0, 0, 1], 10000).into(), handle, shutdown)?;
//!     println!("Listening on {}", address);
//!     serve.await;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod game;
pub mod http;
pub mod network;
pub mod problem;
pub mod reaper;
pub mod session;
pub mod timer;

pub use config::{ConfigError, GameConfig, ServerConfig};
pub use game::GameController;
pub use network::{GameHandle, GameServer, ServerError};
