//! Match model: a single game between two players within a round.

use serde::{Deserialize, Serialize};

use super::{ConfigurationError, MatchError, Player, PlayerId};
use crate::outcome::OutcomeProvider;

/// Result of a match, from the first player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
    Unplayed,
}

/// Decided outcome of a game, as reported by an outcome provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Draw,
}

impl From<Outcome> for MatchResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::FirstWins => MatchResult::Win,
            Outcome::SecondWins => MatchResult::Loss,
            Outcome::Draw => MatchResult::Draw,
        }
    }
}

/// One side of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchSide {
    pub player: PlayerId,
    pub points: f64,
}

/// A game between exactly two players.
///
/// Created unplayed by the pairing engine and recorded exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Match {
    players: [MatchSide; 2],
    result: MatchResult,
}

impl Match {
    /// Create an unplayed match between two distinct players.
    pub fn new(first: PlayerId, second: PlayerId) -> Result<Self, ConfigurationError> {
        if first == second {
            return Err(ConfigurationError::InvalidMatch(format!(
                "player {} cannot play against themselves",
                first
            )));
        }

        Ok(Self {
            players: [
                MatchSide {
                    player: first,
                    points: 0.0,
                },
                MatchSide {
                    player: second,
                    points: 0.0,
                },
            ],
            result: MatchResult::Unplayed,
        })
    }

    /// Create an unplayed match from a player list that must hold exactly two entries.
    pub fn from_players(players: Vec<PlayerId>) -> Result<Self, ConfigurationError> {
        let count = players.len();
        let [first, second]: [PlayerId; 2] = players.try_into().map_err(|_| {
            ConfigurationError::InvalidMatch(format!(
                "a match needs exactly two players, got {}",
                count
            ))
        })?;
        Self::new(first, second)
    }

    pub fn first(&self) -> &PlayerId {
        &self.players[0].player
    }

    pub fn second(&self) -> &PlayerId {
        &self.players[1].player
    }

    pub fn sides(&self) -> &[MatchSide; 2] {
        &self.players
    }

    pub fn result(&self) -> MatchResult {
        self.result
    }

    pub fn is_played(&self) -> bool {
        self.result != MatchResult::Unplayed
    }

    /// Points awarded to a player, or `None` if they are not in this match.
    pub fn points_for(&self, player: &PlayerId) -> Option<f64> {
        self.players
            .iter()
            .find(|side| &side.player == player)
            .map(|side| side.points)
    }

    /// Sum of points awarded across both sides.
    pub fn total_points(&self) -> f64 {
        self.players.iter().map(|side| side.points).sum()
    }

    /// Ask the outcome provider for a result and record it.
    pub fn play(
        &mut self,
        provider: &mut dyn OutcomeProvider,
        roster: &[Player],
    ) -> Result<MatchResult, MatchError> {
        self.ensure_unplayed()?;
        let outcome = provider.decide(self, roster)?;
        self.record(outcome)
    }

    /// Record a decided outcome. A match can only be recorded once.
    pub fn record(&mut self, outcome: Outcome) -> Result<MatchResult, MatchError> {
        self.ensure_unplayed()?;

        let (first, second) = match outcome {
            Outcome::FirstWins => (1.0, 0.0),
            Outcome::SecondWins => (0.0, 1.0),
            Outcome::Draw => (0.5, 0.5),
        };
        self.players[0].points += first;
        self.players[1].points += second;
        self.result = outcome.into();

        Ok(self.result)
    }

    /// Check that the recorded points agree with the result.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let expected = match self.result {
            MatchResult::Win => (1.0, 0.0),
            MatchResult::Loss => (0.0, 1.0),
            MatchResult::Draw => (0.5, 0.5),
            MatchResult::Unplayed => (0.0, 0.0),
        };
        let actual = (self.players[0].points, self.players[1].points);

        if actual != expected {
            return Err(ConfigurationError::InvalidMatch(format!(
                "{} vs {} is {:?} but scored {}-{}",
                self.first(),
                self.second(),
                self.result,
                actual.0,
                actual.1
            )));
        }
        if self.first() == self.second() {
            return Err(ConfigurationError::InvalidMatch(format!(
                "player {} cannot play against themselves",
                self.first()
            )));
        }
        Ok(())
    }

    fn ensure_unplayed(&self) -> Result<(), MatchError> {
        if self.is_played() {
            return Err(MatchError::AlreadyPlayed(
                self.first().clone(),
                self.second().clone(),
            ));
        }
        Ok(())
    }
}
