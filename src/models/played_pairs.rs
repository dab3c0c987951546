//! Set of player pairs that have already faced each other.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Persisted form of a played pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairRecord {
    pub player1: PlayerId,
    pub player2: PlayerId,
}

/// Unordered player pairs, stored canonically as `(min, max)`.
///
/// The set only grows for the lifetime of a tournament.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayedPairs {
    pairs: BTreeSet<(PlayerId, PlayerId)>,
}

impl PlayedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &PlayerId, b: &PlayerId) -> (PlayerId, PlayerId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Record a pair. Returns false if it was already present.
    pub fn insert(&mut self, a: &PlayerId, b: &PlayerId) -> bool {
        self.pairs.insert(Self::key(a, b))
    }

    /// Whether the two players have met, in either orientation.
    pub fn contains(&self, a: &PlayerId, b: &PlayerId) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Number of pairs counted in both orientations.
    pub fn directed_len(&self) -> usize {
        self.pairs.len() * 2
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerId)> {
        self.pairs.iter().map(|(a, b)| (a, b))
    }

    pub fn to_records(&self) -> Vec<PairRecord> {
        self.iter()
            .map(|(a, b)| PairRecord {
                player1: a.clone(),
                player2: b.clone(),
            })
            .collect()
    }
}
