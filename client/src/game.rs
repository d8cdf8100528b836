//! Client side round driver
//!
//! A round is a loop of prompt, answer and server verdict. Who answers is up to
//! the [`AnswerSource`]: a person at the terminal or a [`Bot`](crate::bot::Bot).

use crate::api::{ClientError, QuizClient};
use log::{debug, info};
use shared::{AnswerReply, Feedback, PlayerId, StartReply};
use std::future::Future;

/// What the player sees before answering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub problem: String,
    pub time_left: u32,
    pub score: u32,
    /// Verdict on the previous answer, absent for the first problem
    pub feedback: Option<Feedback>,
}

/// Supplies answers to prompts.
///
/// `Ok(None)` means the player gave up; the round is left to run out on the
/// server.
pub trait AnswerSource {
    fn answer(
        &mut self,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<Option<bool>, ClientError>>;
}

/// Outcome of one round as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub player_id: PlayerId,
    pub final_score: u32,
    pub answered: u32,
    pub correct: u32,
    /// False if the player quit before the clock ran out
    pub finished: bool,
}

/// Starts a round and plays it to the end.
///
/// Passing the id returned by an earlier round keeps the best score; `None`
/// lets the server assign a fresh id.
pub async fn play_round<S>(
    client: &QuizClient,
    player_id: Option<&str>,
    source: &mut S,
) -> Result<RoundSummary, ClientError>
where
    S: AnswerSource,
{
    let (player_id, mut prompt) = match client.start(player_id).await? {
        StartReply::Success {
            player_id,
            problem,
            time_left,
            score,
            ..
        } => (
            player_id,
            Prompt {
                problem,
                time_left,
                score,
                feedback: None,
            },
        ),
        StartReply::Error { message } => return Err(ClientError::Server(message)),
    };
    info!("Round started for {}", player_id);

    let mut summary = RoundSummary {
        player_id,
        final_score: 0,
        answered: 0,
        correct: 0,
        finished: false,
    };

    loop {
        let Some(answer) = source.answer(&prompt).await? else {
            info!("Player {} left the round", summary.player_id);
            summary.final_score = prompt.score;
            return Ok(summary);
        };

        let reply = client.answer(&summary.player_id, answer).await?;
        summary.answered += 1;

        match reply {
            AnswerReply::Continue {
                problem,
                time_left,
                score,
                feedback,
                ..
            } => {
                debug!("{:?}, score {}, {}s left", feedback, score, time_left);
                if feedback == Feedback::Correct {
                    summary.correct += 1;
                }
                prompt = Prompt {
                    problem,
                    time_left,
                    score,
                    feedback: Some(feedback),
                };
            }
            AnswerReply::GameOver { final_score } => {
                info!("Game over for {}: {}", summary.player_id, final_score);
                summary.final_score = final_score;
                summary.finished = true;
                return Ok(summary);
            }
            AnswerReply::Error { message } => return Err(ClientError::Server(message)),
        }
    }
}
