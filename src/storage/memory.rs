//! In-memory repository.

use std::collections::HashMap;

use super::{sort_by_name, StorageError, TournamentRepository, TournamentSnapshot};
use crate::models::TournamentId;

/// Repository that keeps snapshots in memory.
///
/// Snapshots are stored as serialized JSON so every save and load goes
/// through the same schema as the file repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    snapshots: HashMap<TournamentId, String>,
    saves: usize,
    fail_saves: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Make every subsequent save fail, to simulate a broken disk.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl TournamentRepository for MemoryRepository {
    fn load(&self, id: &TournamentId) -> Result<TournamentSnapshot, StorageError> {
        let json = self
            .snapshots
            .get(id)
            .ok_or_else(|| StorageError::TournamentNotFound(id.clone()))?;
        Ok(serde_json::from_str(json)?)
    }

    fn save(&mut self, snapshot: &TournamentSnapshot) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::Unavailable(
                "memory repository is failing saves".to_string(),
            ));
        }
        let json = serde_json::to_string(snapshot)?;
        self.snapshots.insert(snapshot.id.clone(), json);
        self.saves += 1;
        Ok(())
    }

    fn list(&self) -> Result<Vec<TournamentSnapshot>, StorageError> {
        let mut all = self
            .snapshots
            .values()
            .map(|json| serde_json::from_str(json))
            .collect::<Result<Vec<TournamentSnapshot>, _>>()?;
        sort_by_name(&mut all);
        Ok(all)
    }
}
