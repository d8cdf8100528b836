//! Terminal input for human players

use crate::api::ClientError;
use crate::game::{AnswerSource, Prompt};
use shared::Feedback;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// A single line of player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Answer(bool),
    Quit,
}

/// Interprets a line typed by the player. Case and surrounding whitespace are
/// ignored.
pub fn parse_choice(line: &str) -> Option<Choice> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "1" => Some(Choice::Answer(true)),
        "n" | "no" | "f" | "false" | "0" => Some(Choice::Answer(false)),
        "q" | "quit" | "exit" => Some(Choice::Quit),
        _ => None,
    }
}

/// Reads answers line by line and prints prompts to stdout
pub struct TerminalInput<R = BufReader<Stdin>> {
    lines: Lines<R>,
}

impl TerminalInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> TerminalInput<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Next valid choice, or `None` once input is exhausted.
    pub async fn next_choice(&mut self) -> Result<Option<Choice>, ClientError> {
        while let Some(line) = self.lines.next_line().await? {
            match parse_choice(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => println!("Please type y (true), n (false) or q (quit)"),
            }
        }
        Ok(None)
    }
}

impl<R: AsyncBufRead + Unpin> AnswerSource for TerminalInput<R> {
    async fn answer(&mut self, prompt: &Prompt) -> Result<Option<bool>, ClientError> {
        match prompt.feedback {
            Some(Feedback::Correct) => println!("Correct!"),
            Some(Feedback::Wrong) => println!("Wrong!"),
            None => {}
        }
        println!(
            "[score {} | {}s left]  {}   true or false? [y/n/q]",
            prompt.score, prompt.time_left, prompt.problem
        );

        match self.next_choice().await? {
            Some(Choice::Answer(answer)) => Ok(Some(answer)),
            Some(Choice::Quit) | None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio_test::assert_ok;

    fn prompt() -> Prompt {
        Prompt {
            problem: "3 = 1 + 2".to_string(),
            time_left: 40,
            score: 0,
            feedback: None,
        }
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("y"), Some(Choice::Answer(true)));
        assert_eq!(parse_choice("  TRUE "), Some(Choice::Answer(true)));
        assert_eq!(parse_choice("1"), Some(Choice::Answer(true)));
        assert_eq!(parse_choice("n"), Some(Choice::Answer(false)));
        assert_eq!(parse_choice("False"), Some(Choice::Answer(false)));
        assert_eq!(parse_choice("q"), Some(Choice::Quit));
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("maybe"), None);
    }

    #[tokio::test]
    async fn test_invalid_lines_are_skipped() {
        let mut input = TerminalInput::from_reader(Cursor::new("huh\n\ny\nn\n"));

        assert_eq!(assert_ok!(input.answer(&prompt()).await), Some(true));
        assert_eq!(assert_ok!(input.answer(&prompt()).await), Some(false));
        assert_eq!(assert_ok!(input.answer(&prompt()).await), None);
    }

    #[tokio::test]
    async fn test_quit_ends_input() {
        let mut input = TerminalInput::from_reader(Cursor::new("q\ny\n"));
        assert_eq!(assert_ok!(input.answer(&prompt()).await), None);
    }
}
