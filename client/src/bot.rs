//! Automated player with configurable accuracy

use crate::api::ClientError;
use crate::game::{AnswerSource, Prompt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Problem, ProblemParseError};
use std::time::Duration;

/// Answers by evaluating the problem, then flips the answer with
/// probability `1 - accuracy`.
pub struct Bot<R = StdRng> {
    rng: R,
    accuracy: f64,
    think_time: Duration,
}

impl Bot<StdRng> {
    pub fn new(accuracy: f64) -> Self {
        Self::from_rng(StdRng::from_entropy(), accuracy)
    }

    pub fn seeded(seed: u64, accuracy: f64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), accuracy)
    }
}

impl<R: Rng> Bot<R> {
    pub fn from_rng(rng: R, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() {
            0.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };

        Self {
            rng,
            accuracy,
            think_time: Duration::ZERO,
        }
    }

    /// Delay before each answer
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Picks an answer for `problem`.
    pub fn decide(&mut self, problem: &str) -> Result<bool, ProblemParseError> {
        let truth = problem.parse::<Problem>()?.holds();
        if self.rng.gen_bool(self.accuracy) {
            Ok(truth)
        } else {
            Ok(!truth)
        }
    }
}

impl<R: Rng> AnswerSource for Bot<R> {
    async fn answer(&mut self, prompt: &Prompt) -> Result<Option<bool>, ClientError> {
        if !self.think_time.is_zero() {
            tokio::time::sleep(self.think_time).await;
        }
        Ok(Some(self.decide(&prompt.problem)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_bot_is_always_right() {
        let mut bot = Bot::seeded(3, 1.0);
        assert!(bot.decide("12 = 7 + 5").unwrap());
        assert!(!bot.decide("13 = 7 + 5").unwrap());
        assert!(bot.decide("4 = 9 ÷ 2").unwrap());
    }

    #[test]
    fn test_hopeless_bot_is_always_wrong() {
        let mut bot = Bot::seeded(3, 0.0);
        for _ in 0..100 {
            assert!(!bot.decide("12 = 7 + 5").unwrap());
            assert!(bot.decide("-1 = 3 - 5").unwrap());
        }
    }

    #[test]
    fn test_accuracy_is_clamped() {
        assert_eq!(Bot::seeded(0, 1.7).accuracy(), 1.0);
        assert_eq!(Bot::seeded(0, -0.2).accuracy(), 0.0);
        assert_eq!(Bot::seeded(0, f64::NAN).accuracy(), 0.0);
    }

    #[test]
    fn test_partial_accuracy_is_roughly_respected() {
        let mut bot = Bot::seeded(42, 0.8);
        let right = (0..2000)
            .filter(|_| bot.decide("6 = 2 × 3").unwrap())
            .count();

        assert!((1400..1800).contains(&right), "right answers: {}", right);
    }

    #[test]
    fn test_garbage_problem_is_rejected() {
        let mut bot = Bot::seeded(0, 1.0);
        assert!(bot.decide("what is love").is_err());
    }

    #[tokio::test]
    async fn test_bot_as_answer_source() {
        let mut bot = Bot::seeded(1, 1.0);
        let prompt = Prompt {
            problem: "20 = 4 × 5".to_string(),
            time_left: 40,
            score: 0,
            feedback: None,
        };

        assert_eq!(bot.answer(&prompt).await.unwrap(), Some(true));
    }
}
