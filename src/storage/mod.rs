//! Filesystem persistence.
//!
//! Handles reading and writing the local data directory:
//! - One JSON snapshot per tournament (`tournaments/<id>.json`)
//! - The player registry (`players.jsonl`)
//!
//! The director only sees the `TournamentRepository` trait, so tests can
//! swap in `MemoryRepository`.

mod json_file;
mod jsonl;
mod memory;
mod players;
mod snapshot;

pub use json_file::*;
pub use jsonl::*;
pub use memory::*;
pub use players::*;
pub use snapshot::*;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{PlayerId, TournamentId};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("Tournament {0} already exists")]
    TournamentExists(TournamentId),

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Player {0} is already registered")]
    DuplicatePlayer(PlayerId),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for tournament snapshots.
pub trait TournamentRepository {
    /// Load one tournament's snapshot.
    fn load(&self, id: &TournamentId) -> Result<TournamentSnapshot, StorageError>;

    /// Insert or replace a tournament's snapshot.
    fn save(&mut self, snapshot: &TournamentSnapshot) -> Result<(), StorageError>;

    /// Store a new tournament, refusing to replace an existing one.
    fn create(&mut self, snapshot: &TournamentSnapshot) -> Result<(), StorageError> {
        match self.load(&snapshot.id) {
            Ok(_) => Err(StorageError::TournamentExists(snapshot.id.clone())),
            Err(StorageError::TournamentNotFound(_)) => self.save(snapshot),
            Err(e) => Err(e),
        }
    }

    /// All stored tournaments, sorted by name.
    fn list(&self) -> Result<Vec<TournamentSnapshot>, StorageError>;

    /// Tournaments with rounds left to play, sorted by name.
    fn find_unfinished(&self) -> Result<Vec<TournamentSnapshot>, StorageError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|t| !t.is_finished())
            .collect())
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tournaments_dir(&self) -> PathBuf {
        self.data_dir.join("tournaments")
    }

    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join("players.jsonl")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

pub(crate) fn sort_by_name(snapshots: &mut [TournamentSnapshot]) {
    snapshots.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.date_start.cmp(&b.date_start))
    });
}
