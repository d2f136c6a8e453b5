//! Voters and belief-update rules.
//!
//! A [`Voter`] collects votes during a round and hands them, together with its
//! own belief and degree, to a [`VotingRule`]. Rules are pure apart from the
//! random draws they take from the caller's RNG.

mod error;
mod handicap;
mod rules;
mod voter;

pub use error::ConfigError;
pub use handicap::Handicaps;
pub use rules::{majority_winner, tally, Outcomes, Tally, UpdateInput, VotingRule};
pub use voter::Voter;

/// Number of belief categories the engine supports.
pub const SUPPORTED_BELIEF_COUNT: usize = 2;
