//! One-file-per-tournament JSON repository.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::{sort_by_name, StorageConfig, StorageError, TournamentRepository, TournamentSnapshot};
use crate::models::TournamentId;

/// Stores each tournament as `<dir>/<id>.json`.
///
/// Saves write a temporary file and rename it over the old one, so a crash
/// mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.tournaments_dir())
    }

    fn path_for(&self, id: &TournamentId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl TournamentRepository for JsonFileRepository {
    fn load(&self, id: &TournamentId) -> Result<TournamentSnapshot, StorageError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StorageError::TournamentNotFound(id.clone()));
        }

        let contents = fs::read_to_string(&path)?;
        let snapshot = serde_json::from_str(&contents)?;
        debug!("Loaded tournament {} from {:?}", id, path);
        Ok(snapshot)
    }

    fn save(&mut self, snapshot: &TournamentSnapshot) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&snapshot.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(snapshot)?;

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        info!(
            "Saved tournament {} (round {}/{}) to {:?}",
            snapshot.id,
            snapshot.current_round,
            snapshot.rounds.len(),
            path
        );
        Ok(())
    }

    fn list(&self) -> Result<Vec<TournamentSnapshot>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!("Skipping unreadable snapshot {:?}: {}", path, e),
            }
        }

        sort_by_name(&mut snapshots);
        Ok(snapshots)
    }
}
