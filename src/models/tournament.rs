//! Tournament model.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ConfigurationError, PlayedPairs, Player, PlayerId, Round, TournamentId};
use crate::calculate::{self, Standing};

/// Smallest roster a tournament may start with.
pub const MIN_PLAYERS: usize = 6;

/// Lifecycle state derived from the round cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    NotStarted,
    InProgress,
    Complete,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentStatus::NotStarted => write!(f, "not started"),
            TournamentStatus::InProgress => write!(f, "in progress"),
            TournamentStatus::Complete => write!(f, "complete"),
        }
    }
}

/// Status plus round counters, for display by a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: TournamentStatus,
    /// Zero-based index of the next round to play
    pub current_round: usize,
    pub total_rounds: usize,
}

/// A Swiss-style tournament.
///
/// `current_round` is the zero-based index of the next round to play; the
/// tournament is complete once it equals the number of rounds.
#[derive(Debug, Clone)]
pub struct Tournament {
    /// Unique identifier (derived from name + place + start date)
    pub id: TournamentId,

    pub name: String,

    pub place: String,

    pub date_start: NaiveDate,

    pub date_end: NaiveDate,

    pub director_note: String,

    pub(crate) rounds: Vec<Round>,

    pub(crate) current_round: usize,

    pub(crate) players: Vec<Player>,

    pub(crate) played_pairs: PlayedPairs,

    /// Cached leaderboard, recomputed after every round
    pub(crate) players_score: Vec<Standing>,
}

impl Tournament {
    /// Create a tournament with `total_rounds` empty rounds.
    ///
    /// Roster size is checked when play starts, not here, so a roster can be
    /// assembled incrementally.
    pub fn new(
        name: &str,
        place: &str,
        date_start: NaiveDate,
        date_end: NaiveDate,
        total_rounds: usize,
        players: Vec<Player>,
    ) -> Result<Self, ConfigurationError> {
        if total_rounds == 0 {
            return Err(ConfigurationError::NoRounds);
        }
        ensure_unique(&players)?;

        let id = TournamentId::generate(&[name, place, &date_start.to_string()]);
        let rounds = (0..total_rounds).map(|i| Round::new(Round::name_for(i))).collect();

        let mut tournament = Self {
            id,
            name: name.to_string(),
            place: place.to_string(),
            date_start,
            date_end,
            director_note: String::new(),
            rounds,
            current_round: 0,
            players,
            played_pairs: PlayedPairs::new(),
            players_score: Vec::new(),
        };
        tournament.refresh_standings();
        Ok(tournament)
    }

    /// Builder method to set the director's note.
    pub fn with_director_note(mut self, note: &str) -> Self {
        self.director_note = note.to_string();
        self
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn total_rounds(&self) -> usize {
        self.rounds.len()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn played_pairs(&self) -> &PlayedPairs {
        &self.played_pairs
    }

    /// Cached leaderboard as of the last completed round.
    pub fn players_score(&self) -> &[Standing] {
        &self.players_score
    }

    pub fn status(&self) -> TournamentStatus {
        if self.current_round >= self.rounds.len() {
            TournamentStatus::Complete
        } else if self.current_round == 0 {
            TournamentStatus::NotStarted
        } else {
            TournamentStatus::InProgress
        }
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            status: self.status(),
            current_round: self.current_round,
            total_rounds: self.rounds.len(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == TournamentStatus::Complete
    }

    /// Check the roster is even and large enough to pair.
    pub fn validate_roster(&self) -> Result<(), ConfigurationError> {
        let found = self.players.len();
        if found < MIN_PLAYERS {
            return Err(ConfigurationError::TooFewPlayers {
                found,
                required: MIN_PLAYERS,
            });
        }
        if found % 2 != 0 {
            return Err(ConfigurationError::OddRoster(found));
        }
        Ok(())
    }

    /// Recompute the leaderboard from match history and overwrite the cache.
    pub fn refresh_standings(&mut self) -> &[Standing] {
        self.players_score = calculate::leaderboard(&self.players, &self.rounds);
        &self.players_score
    }
}

pub(crate) fn ensure_unique(players: &[Player]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for player in players {
        if !seen.insert(&player.id) {
            return Err(ConfigurationError::DuplicatePlayer(player.id.clone()));
        }
    }
    Ok(())
}
