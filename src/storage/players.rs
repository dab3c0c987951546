//! Player registry backed by a JSONL file.

use std::path::PathBuf;

use tracing::info;

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{Player, PlayerId};

/// Federation-wide list of registered players.
pub struct PlayerRegistry {
    path: PathBuf,
}

impl PlayerRegistry {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.players_path())
    }

    /// All players in registration order.
    pub fn all(&self) -> Result<Vec<Player>, StorageError> {
        JsonlReader::new(self.path.clone()).read_all()
    }

    /// Register a new player. National IDs must be unique.
    pub fn register(&self, player: &Player) -> Result<(), StorageError> {
        if self.all()?.iter().any(|p| p.id == player.id) {
            return Err(StorageError::DuplicatePlayer(player.id.clone()));
        }

        JsonlWriter::new(self.path.clone()).append(player)?;
        info!("Registered player {} ({})", player.full_name(), player.id);
        Ok(())
    }

    /// Players sorted by last name, then first name.
    pub fn alphabetical(&self) -> Result<Vec<Player>, StorageError> {
        let mut players = self.all()?;
        players.sort_by(|a, b| {
            a.lastname
                .to_lowercase()
                .cmp(&b.lastname.to_lowercase())
                .then_with(|| a.firstname.to_lowercase().cmp(&b.firstname.to_lowercase()))
        });
        Ok(players)
    }

    pub fn find(&self, id: &PlayerId) -> Result<Player, StorageError> {
        self.all()?
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| StorageError::PlayerNotFound(id.clone()))
    }

    /// Resolve several IDs, keeping the requested order.
    pub fn find_many(&self, ids: &[PlayerId]) -> Result<Vec<Player>, StorageError> {
        let all = self.all()?;
        ids.iter()
            .map(|id| {
                all.iter()
                    .find(|p| &p.id == id)
                    .cloned()
                    .ok_or_else(|| StorageError::PlayerNotFound(id.clone()))
            })
            .collect()
    }
}
