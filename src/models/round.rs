//! Round model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Match;

/// One stage of a tournament: an ordered list of matches.
///
/// Timestamps are stamped by the tournament director, never by the round itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Round {
    /// Display name ("Round 1", "Round 2", ...)
    pub name: String,

    /// When pairing for this round was committed
    pub start_time: Option<DateTime<Utc>>,

    /// When the last match of this round was recorded
    pub end_time: Option<DateTime<Utc>>,

    matches: Vec<Match>,
}

impl Round {
    /// Create an empty round.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_time: None,
            end_time: None,
            matches: Vec::new(),
        }
    }

    /// Name for the round at a zero-based index.
    pub fn name_for(index: usize) -> String {
        format!("Round {}", index + 1)
    }

    pub fn add_match(&mut self, game: Match) {
        self.matches.push(game);
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    #[cfg(test)]
    pub(crate) fn matches_mut(&mut self) -> &mut [Match] {
        &mut self.matches
    }

    /// Every match has a recorded result.
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_played)
    }
}
