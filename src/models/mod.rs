//! Core data models for the tournament director.

mod chess_match;
mod error;
mod ids;
mod played_pairs;
mod player;
mod round;
mod tournament;

pub use chess_match::*;
pub use error::*;
pub use ids::*;
pub use played_pairs::*;
pub use player::*;
pub use round::*;
pub use tournament::*;
