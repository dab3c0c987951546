//! Model-level errors.

use thiserror::Error;

use super::PlayerId;
use crate::outcome::OutcomeError;

/// Fatal configuration problems, raised before any pairing attempt.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("Invalid national chess ID: {0:?} (expected two letters and five digits)")]
    InvalidPlayerId(String),

    #[error("Roster has an odd number of players ({0})")]
    OddRoster(usize),

    #[error("Roster has {found} players, at least {required} are required")]
    TooFewPlayers { found: usize, required: usize },

    #[error("Player {0} is registered twice")]
    DuplicatePlayer(PlayerId),

    #[error("Invalid match: {0}")]
    InvalidMatch(String),

    #[error("A tournament needs at least one round")]
    NoRounds,
}

/// Errors raised while playing a match.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match {0} vs {1} has already been played")]
    AlreadyPlayed(PlayerId, PlayerId),

    #[error("Outcome unavailable: {0}")]
    Outcome(#[from] OutcomeError),
}
