//! Registered player model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PlayerId;

/// A registered chess player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Player {
    /// First name, title-cased
    pub firstname: String,

    /// Last name, title-cased
    pub lastname: String,

    /// Date of birth
    pub birth: NaiveDate,

    /// National chess ID (canonical identity)
    #[serde(rename = "national chess ID")]
    pub id: PlayerId,

    /// Points carried into the tournament before round one
    pub base_score: f64,
}

impl Player {
    /// Create a new player with no carried-over points.
    pub fn new(firstname: &str, lastname: &str, birth: NaiveDate, id: PlayerId) -> Self {
        Self {
            firstname: title_case(firstname),
            lastname: title_case(lastname),
            birth,
            id,
            base_score: 0.0,
        }
    }

    /// Builder method to set carried-over points.
    pub fn with_base_score(mut self, score: f64) -> Self {
        self.base_score = score;
        self
    }

    /// "Firstname Lastname".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            word.split('-')
                .map(|part| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) => first
                            .to_uppercase()
                            .chain(chars.flat_map(|c| c.to_lowercase()))
                            .collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
