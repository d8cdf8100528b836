//! Random quiz statement generation
//!
//! Each call yields a statement `"<value> = <a> <op> <b>"` together with the
//! ground truth of that statement. Roughly 60% of statements are true; the
//! rest show a value close enough to the real result to be plausible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Operator, Problem};

/// Probability that a generated statement shows the true result.
const TRUE_STATEMENT_PROBABILITY: f64 = 0.6;

/// A statement plus whether it is true. The flag never leaves the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratedProblem {
    pub problem: Problem,
    pub is_correct: bool,
}

impl GeneratedProblem {
    pub fn text(&self) -> String {
        self.problem.to_string()
    }
}

/// Problem source driven by an injectable random number generator
#[derive(Debug)]
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    /// Creates a generator seeded from the operating system
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates a reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ProblemGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> GeneratedProblem {
        let op = Operator::ALL[self.rng.gen_range(0..Operator::ALL.len())];
        let (a, b) = self.pick_operands(op);

        // Operands are small and the divisor is never zero.
        let answer = op.apply(a, b).unwrap_or_default();

        if self.rng.gen_bool(TRUE_STATEMENT_PROBABILITY) {
            return GeneratedProblem {
                problem: Problem::new(answer, a, op, b),
                is_correct: true,
            };
        }

        GeneratedProblem {
            problem: Problem::new(self.perturb(answer, op), a, op, b),
            is_correct: false,
        }
    }

    fn pick_operands(&mut self, op: Operator) -> (i64, i64) {
        match op {
            Operator::Multiply => (self.rng.gen_range(2..=12), self.rng.gen_range(2..=12)),
            Operator::Divide => {
                let quotient = self.rng.gen_range(2..=12);
                let divisor = self.rng.gen_range(2..=12);
                (quotient * divisor, divisor)
            }
            Operator::Add => (self.rng.gen_range(20..=120), self.rng.gen_range(1..=120)),
            Operator::Subtract => {
                let a = self.rng.gen_range(20..=120);
                let b = self.rng.gen_range(1..=120);
                if b > a {
                    (b, a)
                } else {
                    (a, b)
                }
            }
        }
    }

    /// Moves the answer by a nonzero amount that scales with its magnitude.
    fn perturb(&mut self, answer: i64, op: Operator) -> i64 {
        let bound = ((answer.abs() + 3) / 4).max(3);
        let delta = self.rng.gen_range(1..=bound);

        let mut displayed = if self.rng.gen_bool(0.5) {
            answer - delta
        } else {
            answer + delta
        };

        if op == Operator::Divide && displayed == 0 {
            displayed += 1;
        }
        displayed
    }
}
