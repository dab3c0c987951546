//! Tournament director.
//!
//! Drives a tournament round by round:
//! 1. Check the roster can be paired
//! 2. Pair the round from the current standings
//! 3. Play every match through the outcome provider
//! 4. Stamp the round, recompute the leaderboard, advance the cursor
//! 5. Persist the snapshot
//!
//! A round is committed only once all of its matches have results, so a
//! failure mid-round leaves the tournament exactly as it was after the
//! previous round.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::Standing;
use crate::models::{
    ConfigurationError, Match, MatchError, StatusReport, Tournament, TournamentId,
};
use crate::outcome::OutcomeProvider;
use crate::pairing::{self, PairingError};
use crate::storage::{SnapshotError, StorageError, TournamentRepository, TournamentSnapshot};

/// Errors that can occur while running a tournament.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Pairing error: {0}")]
    Pairing(#[from] PairingError),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    #[error("Cannot resume tournament: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Tournament {0} is already complete")]
    AlreadyComplete(TournamentId),
}

/// Source of round timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What happened in one call to `advance_round`.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    /// Zero-based index of the round just played
    pub index: usize,
    pub name: String,
    pub matches: Vec<Match>,
    pub standings: Vec<Standing>,
    pub status: StatusReport,
}

/// Runs one tournament against an injected repository and outcome provider.
pub struct TournamentDirector<R: TournamentRepository> {
    tournament: Tournament,
    repository: R,
    outcomes: Box<dyn OutcomeProvider>,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl<R: TournamentRepository> TournamentDirector<R> {
    pub fn new(tournament: Tournament, repository: R, outcomes: Box<dyn OutcomeProvider>) -> Self {
        Self {
            tournament,
            repository,
            outcomes,
            rng: StdRng::from_entropy(),
            clock: Box::new(SystemClock),
        }
    }

    /// Rehydrate a tournament from a persisted snapshot.
    pub fn resume(
        snapshot: TournamentSnapshot,
        repository: R,
        outcomes: Box<dyn OutcomeProvider>,
    ) -> Result<Self, TournamentError> {
        let tournament = Tournament::try_from(snapshot)?;
        info!(
            "Resuming {} at round {}/{}",
            tournament.name,
            tournament.current_round() + 1,
            tournament.total_rounds()
        );
        Ok(Self::new(tournament, repository, outcomes))
    }

    /// Load a tournament from the repository and resume it.
    pub fn open(
        id: &TournamentId,
        repository: R,
        outcomes: Box<dyn OutcomeProvider>,
    ) -> Result<Self, TournamentError> {
        let snapshot = repository.load(id)?;
        Self::resume(snapshot, repository, outcomes)
    }

    /// Builder method to set the pairing RNG.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Builder method to set the timestamp source.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Leaderboard as of the last completed round.
    pub fn current_standings(&self) -> &[Standing] {
        self.tournament.players_score()
    }

    pub fn tournament_status(&self) -> StatusReport {
        self.tournament.status_report()
    }

    /// Pair, play and record the next round, then persist.
    pub fn advance_round(&mut self) -> Result<RoundSummary, TournamentError> {
        self.tournament.validate_roster()?;
        if self.tournament.is_complete() {
            return Err(TournamentError::AlreadyComplete(self.tournament.id.clone()));
        }

        let index = self.tournament.current_round;
        let started = self.clock.now();
        info!(
            "{}: starting {}",
            self.tournament.name, self.tournament.rounds[index].name
        );

        let standings = self.tournament.refresh_standings().to_vec();
        let mut played = self.tournament.played_pairs.clone();
        let mut matches = pairing::pair_round(
            index,
            &self.tournament.players,
            &mut played,
            &standings,
            &mut self.rng,
        )?;

        for game in &mut matches {
            let result = game.play(self.outcomes.as_mut(), &self.tournament.players)?;
            debug!(
                "{} vs {}: {:?} ({})",
                game.first(),
                game.second(),
                result,
                self.outcomes.name()
            );
        }
        let ended = self.clock.now();

        let round = &mut self.tournament.rounds[index];
        round.start_time = Some(started);
        for game in &matches {
            round.add_match(game.clone());
        }
        round.end_time = Some(ended);
        let name = round.name.clone();

        self.tournament.played_pairs = played;
        let standings = self.tournament.refresh_standings().to_vec();
        self.tournament.current_round += 1;

        info!(
            "{}: finished {} ({} matches), status {}",
            self.tournament.name,
            name,
            matches.len(),
            self.tournament.status()
        );

        self.save()?;

        Ok(RoundSummary {
            index,
            name,
            matches,
            standings,
            status: self.tournament.status_report(),
        })
    }

    /// Persist the current state without advancing.
    pub fn pause(&mut self) -> Result<StatusReport, TournamentError> {
        self.save()?;
        info!(
            "{}: paused before round {}/{}",
            self.tournament.name,
            self.tournament.current_round() + 1,
            self.tournament.total_rounds()
        );
        Ok(self.tournament.status_report())
    }

    /// Play rounds until the tournament completes or `proceed` declines to
    /// continue.
    ///
    /// `proceed` is called after every round, the last one included. Declining
    /// while rounds remain pauses the tournament.
    pub fn play_until<F>(&mut self, mut proceed: F) -> Result<Vec<RoundSummary>, TournamentError>
    where
        F: FnMut(&RoundSummary) -> bool,
    {
        let mut summaries = Vec::new();
        while !self.tournament.is_complete() {
            let summary = self.advance_round()?;
            let keep_going = proceed(&summary);
            summaries.push(summary);
            if !keep_going && !self.tournament.is_complete() {
                self.pause()?;
                break;
            }
        }
        Ok(summaries)
    }

    /// Write the snapshot through the repository.
    pub fn save(&mut self) -> Result<(), TournamentError> {
        let snapshot = TournamentSnapshot::from(&self.tournament);
        self.repository.save(&snapshot)?;
        Ok(())
    }
}
