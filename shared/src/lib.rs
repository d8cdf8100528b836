//! Game rules, problem statements and the JSON wire protocol shared by the
//! quiz server and its clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a round in seconds; also the ceiling for `time_left`.
pub const ROUND_TIME_SECS: u32 = 40;
/// Seconds added for a correct answer.
pub const CORRECT_BONUS_SECS: u32 = 5;
/// Seconds removed for a wrong answer.
pub const WRONG_PENALTY_SECS: u32 = 10;
/// Sessions untouched for longer than this are reaped.
pub const INACTIVITY_TIMEOUT_SECS: u64 = 600;
/// Interval between reaper sweeps.
pub const CLEANUP_INTERVAL_SECS: u64 = 600;

pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "×" | "*" | "x" => Some(Operator::Multiply),
            "÷" | "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Applies the operator, returning `None` on overflow or division by zero.
    /// Division rounds towards negative infinity.
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => {
                let quotient = a.checked_div(b)?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Some(quotient - 1)
                } else {
                    Some(quotient)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A quiz statement `"<displayed> = <lhs> <op> <rhs>"`.
///
/// The statement may be true or false; the player has to decide which.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    pub displayed: i64,
    pub lhs: i64,
    pub op: Operator,
    pub rhs: i64,
}

impl Problem {
    pub fn new(displayed: i64, lhs: i64, op: Operator, rhs: i64) -> Self {
        Self {
            displayed,
            lhs,
            op,
            rhs,
        }
    }

    /// The true value of the expression on the right-hand side.
    pub fn evaluate(&self) -> Option<i64> {
        self.op.apply(self.lhs, self.rhs)
    }

    /// Whether the displayed value equals the expression.
    pub fn holds(&self) -> bool {
        self.evaluate() == Some(self.displayed)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} {} {}",
            self.displayed, self.lhs, self.op, self.rhs
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemParseError {
    #[error("statement has no ' = ' separator")]
    MissingEquals,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("expected '<a> <op> <b>' after '=', got: {0}")]
    MalformedExpression(String),
}

impl FromStr for Problem {
    type Err = ProblemParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (displayed, expression) = s
            .split_once(" = ")
            .ok_or(ProblemParseError::MissingEquals)?;

        let parts: Vec<&str> = expression.split_whitespace().collect();
        let [lhs, op, rhs] = parts.as_slice() else {
            return Err(ProblemParseError::MalformedExpression(
                expression.to_string(),
            ));
        };

        let op = Operator::from_symbol(op)
            .ok_or_else(|| ProblemParseError::UnknownOperator(op.to_string()))?;

        Ok(Problem {
            displayed: parse_number(displayed)?,
            lhs: parse_number(lhs)?,
            op,
            rhs: parse_number(rhs)?,
        })
    }
}

fn parse_number(token: &str) -> Result<i64, ProblemParseError> {
    let token = token.trim();
    token
        .parse()
        .map_err(|_| ProblemParseError::InvalidNumber(token.to_string()))
}

// Requests

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<PlayerId>,
}

/// Both fields are optional on the wire so the server can answer a missing
/// field with a validation error instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub answer: Option<bool>,
}

// Replies

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartReply {
    Success {
        player_id: PlayerId,
        problem: String,
        time_left: u32,
        score: u32,
        game_active: bool,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerReply {
    Continue {
        problem: String,
        time_left: u32,
        score: u32,
        feedback: Feedback,
        game_active: bool,
    },
    GameOver {
        final_score: u32,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusReply {
    Success {
        game_active: bool,
        time_left: u32,
        score: u32,
        top_score: u32,
        current_problem: Option<String>,
        /// Seconds since the player's last request or countdown tick
        idle_secs: u64,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    /// Best score of the player, not the score of the current round.
    pub score: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeaderboardReply {
    Success { players: Vec<LeaderboardEntry> },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReply {
    pub status: String,
    pub players: usize,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_apply() {
        assert_eq!(Operator::Add.apply(20, 22), Some(42));
        assert_eq!(Operator::Subtract.apply(20, 22), Some(-2));
        assert_eq!(Operator::Multiply.apply(6, 7), Some(42));
        assert_eq!(Operator::Divide.apply(84, 2), Some(42));
    }

    #[test]
    fn test_divide_floors() {
        assert_eq!(Operator::Divide.apply(7, 2), Some(3));
        assert_eq!(Operator::Divide.apply(-7, 2), Some(-4));
        assert_eq!(Operator::Divide.apply(7, 0), None);
    }

    #[test]
    fn test_operator_symbols() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol("*"), Some(Operator::Multiply));
        assert_eq!(Operator::from_symbol("%"), None);
    }

    #[test]
    fn test_problem_display() {
        let problem = Problem::new(12, 3, Operator::Multiply, 4);
        assert_eq!(problem.to_string(), "12 = 3 × 4");
        assert!(problem.holds());
    }

    #[test]
    fn test_problem_parse() {
        let problem: Problem = "55 = 120 - 65".parse().unwrap();
        assert_eq!(problem, Problem::new(55, 120, Operator::Subtract, 65));
        assert!(problem.holds());

        let wrong: Problem = "-3 = 20 - 20".parse().unwrap();
        assert_eq!(wrong.displayed, -3);
        assert!(!wrong.holds());
    }

    #[test]
    fn test_problem_parse_errors() {
        assert_eq!(
            "12 3 × 4".parse::<Problem>(),
            Err(ProblemParseError::MissingEquals)
        );
        assert_eq!(
            "x = 3 × 4".parse::<Problem>(),
            Err(ProblemParseError::InvalidNumber("x".into()))
        );
        assert_eq!(
            "12 = 3 % 4".parse::<Problem>(),
            Err(ProblemParseError::UnknownOperator("%".into()))
        );
        assert!(matches!(
            "12 = 3 ×".parse::<Problem>(),
            Err(ProblemParseError::MalformedExpression(_))
        ));
    }

    #[test]
    fn test_answer_reply_wire_format() {
        let reply = AnswerReply::Continue {
            problem: "4 = 2 + 2".into(),
            time_left: 35,
            score: 1,
            feedback: Feedback::Correct,
            game_active: true,
        };
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["status"], "continue");
        assert_eq!(value["feedback"], "correct");

        let over = serde_json::to_value(AnswerReply::GameOver { final_score: 7 }).unwrap();
        assert_eq!(over, json!({"status": "game_over", "final_score": 7}));
    }

    #[test]
    fn test_requests_tolerate_missing_fields() {
        let start: StartRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(start.player_id, None);

        let answer: AnswerRequest = serde_json::from_str(r#"{"player_id": "p1"}"#).unwrap();
        assert_eq!(answer.player_id.as_deref(), Some("p1"));
        assert_eq!(answer.answer, None);
    }

    #[test]
    fn test_start_reply_decodes_error() {
        let reply: StartReply =
            serde_json::from_value(json!({"status": "error", "message": "boom"})).unwrap();
        assert_eq!(
            reply,
            StartReply::Error {
                message: "boom".into()
            }
        );
    }
}
