//! Versioned tournament snapshot.
//!
//! The snapshot is the persisted record of a tournament: everything needed
//! to resume play. Loading validates it against the roster before a
//! `Tournament` is handed back to the director.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculate::Standing;
use crate::models::{
    ensure_unique, ConfigurationError, PairRecord, PlayedPairs, Player, PlayerId, Round,
    Tournament, TournamentId,
};

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors raised while rehydrating a snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Unsupported snapshot schema version {0} (expected {})", SCHEMA_VERSION)]
    UnsupportedVersion(u32),

    #[error("Unknown player {player} referenced by {context}")]
    UnknownPlayer { context: String, player: PlayerId },

    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),

    #[error("Invalid snapshot: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Persisted form of a tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TournamentSnapshot {
    pub schema_version: u32,
    pub id: TournamentId,
    pub name: String,
    pub place: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub director_note: String,
    pub current_round: usize,
    pub rounds: Vec<Round>,
    pub players_list: Vec<Player>,
    pub players_score: Vec<Standing>,
    pub played_pairs: Vec<PairRecord>,
}

impl TournamentSnapshot {
    /// Whether every round has been played.
    pub fn is_finished(&self) -> bool {
        self.current_round >= self.rounds.len()
    }
}

impl From<&Tournament> for TournamentSnapshot {
    fn from(t: &Tournament) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            id: t.id.clone(),
            name: t.name.clone(),
            place: t.place.clone(),
            date_start: t.date_start,
            date_end: t.date_end,
            director_note: t.director_note.clone(),
            current_round: t.current_round,
            rounds: t.rounds.clone(),
            players_list: t.players.clone(),
            players_score: t.players_score.clone(),
            played_pairs: t.played_pairs.to_records(),
        }
    }
}

impl TryFrom<TournamentSnapshot> for Tournament {
    type Error = SnapshotError;

    fn try_from(s: TournamentSnapshot) -> Result<Self, Self::Error> {
        if s.schema_version != SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion(s.schema_version));
        }
        if s.rounds.is_empty() {
            return Err(ConfigurationError::NoRounds.into());
        }
        if s.current_round > s.rounds.len() {
            return Err(SnapshotError::Inconsistent(format!(
                "current round {} is past the last round ({})",
                s.current_round,
                s.rounds.len()
            )));
        }
        ensure_unique(&s.players_list)?;

        let known = |id: &PlayerId, context: &str| -> Result<(), SnapshotError> {
            if s.players_list.iter().any(|p| &p.id == id) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownPlayer {
                    context: context.to_string(),
                    player: id.clone(),
                })
            }
        };

        let mut played = PlayedPairs::new();
        for pair in &s.played_pairs {
            known(&pair.player1, "played pairs")?;
            known(&pair.player2, "played pairs")?;
            if pair.player1 == pair.player2 {
                return Err(SnapshotError::Inconsistent(format!(
                    "player {} is recorded as having played themselves",
                    pair.player1
                )));
            }
            played.insert(&pair.player1, &pair.player2);
        }

        for (index, round) in s.rounds.iter().enumerate() {
            let finished = index < s.current_round;
            if finished && round.matches().is_empty() {
                return Err(SnapshotError::Inconsistent(format!(
                    "{} was played but has no matches",
                    round.name
                )));
            }
            if finished && !round.is_complete() {
                return Err(SnapshotError::Inconsistent(format!(
                    "{} was played but has unrecorded matches",
                    round.name
                )));
            }
            if !finished && !round.matches().is_empty() {
                return Err(SnapshotError::Inconsistent(format!(
                    "{} has matches but has not been played",
                    round.name
                )));
            }

            for game in round.matches() {
                known(game.first(), &round.name)?;
                known(game.second(), &round.name)?;
                game.validate()?;
                if played.insert(game.first(), game.second()) {
                    warn!(
                        "{}: pair {} - {} missing from played pairs, restored",
                        round.name,
                        game.first(),
                        game.second()
                    );
                }
            }
        }

        let mut tournament = Tournament {
            id: s.id,
            name: s.name,
            place: s.place,
            date_start: s.date_start,
            date_end: s.date_end,
            director_note: s.director_note,
            rounds: s.rounds,
            current_round: s.current_round,
            players: s.players_list,
            played_pairs: played,
            players_score: Vec::new(),
        };

        tournament.refresh_standings();
        if tournament.players_score != s.players_score {
            debug!(
                "Cached standings for {} differed from match history, recomputed",
                tournament.id
            );
        }

        Ok(tournament)
    }
}
