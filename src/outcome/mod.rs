//! Match outcome providers.
//!
//! A provider decides how a match ends. The director does not care whether
//! results are simulated, replayed from a script, or typed in by the
//! arbiter; all of them implement `OutcomeProvider`.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;
use tracing::debug;

use crate::models::{Match, Outcome, Player, PlayerId};

/// Errors that can occur while obtaining an outcome.
#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("Result input closed before a result was entered")]
    InputClosed,

    #[error("No scripted outcome left for {0} vs {1}")]
    Exhausted(PlayerId, PlayerId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of match results.
pub trait OutcomeProvider {
    /// Provider identifier for logging.
    fn name(&self) -> &'static str;

    /// Decide the outcome of an unplayed match.
    fn decide(&mut self, game: &Match, roster: &[Player]) -> Result<Outcome, OutcomeError>;
}

/// Uniformly random outcomes, for simulated tournaments.
pub struct RandomOutcomes {
    rng: StdRng,
}

impl RandomOutcomes {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl OutcomeProvider for RandomOutcomes {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, _game: &Match, _roster: &[Player]) -> Result<Outcome, OutcomeError> {
        const CHOICES: [Outcome; 3] = [Outcome::FirstWins, Outcome::SecondWins, Outcome::Draw];
        Ok(CHOICES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Outcome::Draw))
    }
}

/// Pre-recorded outcomes, consumed in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOutcomes {
    queue: VecDeque<Outcome>,
}

impl ScriptedOutcomes {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            queue: outcomes.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl OutcomeProvider for ScriptedOutcomes {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn decide(&mut self, game: &Match, _roster: &[Player]) -> Result<Outcome, OutcomeError> {
        self.queue
            .pop_front()
            .ok_or_else(|| OutcomeError::Exhausted(game.first().clone(), game.second().clone()))
    }
}

/// Results typed in by the arbiter.
///
/// Malformed input is answered with a hint and asked again; it never
/// surfaces as an error. Only a closed input stream does.
pub struct PromptOutcomes<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptOutcomes<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

fn display_name(id: &PlayerId, roster: &[Player]) -> String {
    roster
        .iter()
        .find(|p| &p.id == id)
        .map(|p| format!("{} ({})", p.full_name(), id))
        .unwrap_or_else(|| id.to_string())
}

/// Parse an arbiter's answer: `1` first wins, `2` second wins, `d`/`0`/`=` draw.
pub fn parse_outcome(answer: &str) -> Option<Outcome> {
    match answer.trim().to_lowercase().as_str() {
        "1" | "1-0" => Some(Outcome::FirstWins),
        "2" | "0-1" => Some(Outcome::SecondWins),
        "d" | "0" | "=" | "draw" | "1/2" => Some(Outcome::Draw),
        _ => None,
    }
}

impl<R: BufRead, W: Write> OutcomeProvider for PromptOutcomes<R, W> {
    fn name(&self) -> &'static str {
        "prompt"
    }

    fn decide(&mut self, game: &Match, roster: &[Player]) -> Result<Outcome, OutcomeError> {
        let first = display_name(game.first(), roster);
        let second = display_name(game.second(), roster);

        loop {
            write!(
                self.output,
                "{} vs {} - result? [1] {} wins, [2] {} wins, [d] draw: ",
                first, second, first, second
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(OutcomeError::InputClosed);
            }

            match parse_outcome(&line) {
                Some(outcome) => return Ok(outcome),
                None => {
                    debug!("Rejected result input {:?}", line.trim());
                    writeln!(self.output, "Please answer 1, 2 or d.")?;
                }
            }
        }
    }
}
