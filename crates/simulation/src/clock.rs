//! Time models.
//!
//! The exponential model gives every voter an independent unit-rate wake-up
//! clock. The minimum of N such clocks is itself exponential with rate N, and
//! the waking voter is uniform among all N. One round is therefore exactly one
//! wake-up event. Inter-event time is sampled at unit rate, matching one
//! voter's clock, so the N individual clocks never have to be simulated.

use rand::distributions::Open01;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use voter_core::ConfigError;

/// How rounds are scheduled and how much time each one takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockModel {
    /// Synchronous rounds: every edge exchanges votes, then every voter updates.
    #[default]
    Discrete,

    /// One random voter wakes per round and pushes its belief to neighbors.
    Exponential,
}

impl ClockModel {
    /// Elapsed time of one discrete round.
    pub const DISCRETE_ROUND: f64 = 1.0;

    /// Rate of the exponential inter-event time.
    pub const EXPONENTIAL_RATE: f64 = 1.0;

    /// Every clock model, in declaration order.
    pub const ALL: [ClockModel; 2] = [ClockModel::Discrete, ClockModel::Exponential];

    /// Configuration name of this clock.
    pub fn name(self) -> &'static str {
        match self {
            ClockModel::Discrete => "discrete",
            ClockModel::Exponential => "exponential",
        }
    }

    /// Draw the elapsed time of the next round.
    ///
    /// Discrete rounds consume no randomness.
    pub fn sample_elapsed(self, rng: &mut impl Rng) -> f64 {
        match self {
            ClockModel::Discrete => Self::DISCRETE_ROUND,
            ClockModel::Exponential => sample_exponential(Self::EXPONENTIAL_RATE, rng),
        }
    }
}

impl fmt::Display for ClockModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClockModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockModel::ALL
            .into_iter()
            .find(|clock| clock.name() == s)
            .ok_or_else(|| ConfigError::UnknownClock(s.to_string()))
    }
}

/// Sample an exponential variate by inverse transform.
///
/// Uniforms come from the open interval `(0, 1)`, so the result is always
/// strictly positive and finite.
pub fn sample_exponential(rate: f64, rng: &mut impl Rng) -> f64 {
    let u: f64 = rng.sample(Open01);
    -u.ln() / rate
}
