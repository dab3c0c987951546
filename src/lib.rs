//! # Swiss Director
//!
//! A Swiss-system chess tournament director.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, matches, rounds, tournaments)
//! - **calculate**: Score model and leaderboard
//! - **pairing**: Round pairing without rematches
//! - **outcome**: Pluggable sources of match results
//! - **director**: Round-by-round tournament state machine
//! - **storage**: Snapshot persistence and the player registry
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod director;
pub mod models;
pub mod outcome;
pub mod pairing;
pub mod storage;

pub use models::*;
