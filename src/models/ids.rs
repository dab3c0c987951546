//! Player and tournament identifiers.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ConfigurationError;

fn national_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2}[0-9]{5}$").expect("static regex compiles"))
}

/// A player's national chess ID (two letters followed by five digits).
///
/// This is the canonical player identity: played pairs, match sides and
/// standings all refer to players through it. Deserialization goes through
/// `parse`, so stored IDs are held to the same format as typed ones.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    /// Parse and normalize a national chess ID, e.g. `"ab12345"` -> `AB12345`.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if national_id_pattern().is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ConfigurationError::InvalidPlayerId(raw.to_string()))
        }
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerId {
    type Error = ConfigurationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

/// A deterministic tournament ID derived from a content hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(String);

impl TournamentId {
    /// Generate a TournamentId from input fields.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TournamentId({})", self.0)
    }
}

impl From<&str> for TournamentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_normalizes_case() {
        let id = PlayerId::parse(" ab12345 ").unwrap();
        assert_eq!(id.as_str(), "AB12345");
    }

    #[test]
    fn test_player_id_rejects_bad_format() {
        assert!(PlayerId::parse("A123456").is_err());
        assert!(PlayerId::parse("AB1234").is_err());
        assert!(PlayerId::parse("AB123456").is_err());
        assert!(PlayerId::parse("").is_err());
    }

    #[test]
    fn test_player_id_ordering() {
        let a = PlayerId::parse("AA00001").unwrap();
        let b = PlayerId::parse("AA00002").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_player_id_serializes_as_string() {
        let id = PlayerId::parse("CD54321").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"CD54321\"");
    }

    #[test]
    fn test_player_id_deserialize_validates() {
        let id: PlayerId = serde_json::from_str("\"cd54321\"").unwrap();
        assert_eq!(id.as_str(), "CD54321");

        assert!(serde_json::from_str::<PlayerId>("\"bogus\"").is_err());
        assert!(serde_json::from_str::<PlayerId>("\"AB1234\"").is_err());
    }

    #[test]
    fn test_tournament_id_deterministic() {
        let id1 = TournamentId::generate(&["Open de Paris", "Paris", "2024-05-01"]);
        let id2 = TournamentId::generate(&["Open de Paris", "Paris", "2024-05-01"]);
        assert_eq!(id1, id2);
        assert_eq!(id1.as_str().len(), 16);
        assert!(id1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tournament_id_different_inputs() {
        let id1 = TournamentId::generate(&["Open de Paris", "Paris", "2024-05-01"]);
        let id2 = TournamentId::generate(&["Open de Lyon", "Lyon", "2024-05-01"]);
        assert_ne!(id1, id2);
    }
}
