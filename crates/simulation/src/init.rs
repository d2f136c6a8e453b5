//! Initial belief assignment.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use voter_core::ConfigError;
use voter_types::BeliefId;

/// How the voter population is seeded with beliefs.
///
/// Every strategy works on the stable node order and produces full-strength
/// beliefs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Everyone neutral except two distinct random voters holding beliefs 1 and 2.
    #[default]
    RandPair,

    /// Every belief drawn uniformly from {0, 1, 2}.
    AllRand,

    /// The first `split` voters hold belief 1, the rest belief 2.
    /// Without a split, half the population (rounded down) holds belief 1.
    AllRandTwo {
        /// Number of voters holding belief 1.
        split: Option<usize>,
    },

    /// Every belief drawn uniformly from `[1, N]`.
    AllRandN,

    /// Voter `i` (zero-based) holds belief `i + 1`.
    AllUnique,
}

impl InitStrategy {
    /// Configuration name, without parameters.
    pub fn name(self) -> &'static str {
        match self {
            InitStrategy::RandPair => "rand_pair",
            InitStrategy::AllRand => "all_rand",
            InitStrategy::AllRandTwo { .. } => "all_rand_two",
            InitStrategy::AllRandN => "all_rand_n",
            InitStrategy::AllUnique => "all_unique",
        }
    }

    /// Split `voters` into `split` believers of 1 and the rest believers of 2.
    pub fn split(split: usize) -> Self {
        InitStrategy::AllRandTwo { split: Some(split) }
    }

    /// Beliefs for a population of `voters`, in stable node order.
    pub fn assign(self, voters: usize, rng: &mut impl Rng) -> Result<Vec<BeliefId>, ConfigError> {
        let beliefs = match self {
            InitStrategy::RandPair => {
                if voters < 2 {
                    return Err(ConfigError::InsufficientVoters {
                        strategy: self.name(),
                        required: 2,
                        available: voters,
                    });
                }
                let mut beliefs = vec![BeliefId::NEUTRAL; voters];
                let picked = index::sample(rng, voters, 2);
                beliefs[picked.index(0)] = BeliefId(1);
                beliefs[picked.index(1)] = BeliefId(2);
                beliefs
            }
            InitStrategy::AllRand => (0..voters)
                .map(|_| BeliefId(rng.gen_range(0..=2)))
                .collect(),
            InitStrategy::AllRandTwo { split } => {
                let split = split.unwrap_or(voters / 2);
                if split > voters {
                    return Err(ConfigError::InvalidSplit { split, voters });
                }
                (0..voters)
                    .map(|i| if i < split { BeliefId(1) } else { BeliefId(2) })
                    .collect()
            }
            InitStrategy::AllRandN => {
                let max = belief_for_index(voters.saturating_sub(1));
                (0..voters)
                    .map(|_| BeliefId(rng.gen_range(1..=max.get())))
                    .collect()
            }
            InitStrategy::AllUnique => (0..voters).map(belief_for_index).collect(),
        };
        Ok(beliefs)
    }
}

fn belief_for_index(index: usize) -> BeliefId {
    BeliefId(index as u32 + 1)
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStrategy::AllRandTwo { split: Some(split) } => {
                write!(f, "{}:{}", self.name(), split)
            }
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for InitStrategy {
    type Err = ConfigError;

    /// Parse a strategy name. `all_rand_two` optionally takes its split as
    /// `all_rand_two:K`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ConfigError::UnknownInitStrategy(s.to_string());
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (s, None),
        };

        match (name, param) {
            ("rand_pair", None) => Ok(InitStrategy::RandPair),
            ("all_rand", None) => Ok(InitStrategy::AllRand),
            ("all_rand_two", None) => Ok(InitStrategy::AllRandTwo { split: None }),
            ("all_rand_two", Some(param)) => {
                let split = param.parse().map_err(|_| unknown())?;
                Ok(InitStrategy::split(split))
            }
            ("all_rand_n", None) => Ok(InitStrategy::AllRandN),
            ("all_unique", None) => Ok(InitStrategy::AllUnique),
            _ => Err(unknown()),
        }
    }
}
