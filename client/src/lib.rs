//! # Math Quiz Client Library
//!
//! This library provides a command line client for the quiz server. It can be
//! played by a person at the terminal or by a bot with a configurable accuracy,
//! which is handy for load testing and for checking a deployment end to end.
//!
//! ## Module Organization
//!
//! ### API Module (`api`)
//! Typed wrapper around the JSON endpoints:
//! - Request encoding and reply decoding using the shared wire types
//! - Transport errors kept apart from game level error replies
//!
//! ### Game Module (`game`)
//! Drives a single round from start to game over:
//! - The [`AnswerSource`](game::AnswerSource) seam between the round loop and
//!   whoever is answering
//! - Per-round statistics in a [`RoundSummary`](game::RoundSummary)
//!
//! ### Input Module (`input`)
//! Reads `y`/`n`/`q` answers from the terminal.
//!
//! ### Bot Module (`bot`)
//! Evaluates each problem locally and answers correctly with a given
//! probability.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::{api::QuizClient, bot::Bot, game::play_round};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QuizClient::new("http://127.0.0.1:10000");
//!     let mut bot = Bot::new(0.9);
//!
//!     let summary = play_round(&client, None, &mut bot).await?;
//!     println!("{} scored {}", summary.player_id, summary.final_score);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod game;
pub mod input;

pub use api::{ClientError, QuizClient};
