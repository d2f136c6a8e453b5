//! Configuration errors.

use thiserror::Error;
use voter_types::BeliefId;

/// An invalid option given when building or initializing a model.
///
/// These are fatal: nothing in the engine retries or recovers from them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Voting rule name not recognised.
    #[error(
        "unknown voting rule {0:?} \
         (expected simple, probability, weighted_prob, single_neighbor)"
    )]
    UnknownVotingRule(String),

    /// Clock model name not recognised.
    #[error("unknown clock model {0:?} (expected discrete or exponential)")]
    UnknownClock(String),

    /// Initialization strategy name not recognised.
    #[error(
        "unknown init strategy {0:?} \
         (expected rand_pair, all_rand, all_rand_two, all_rand_n, all_unique)"
    )]
    UnknownInitStrategy(String),

    /// Only a fixed number of belief categories is supported.
    #[error("unsupported belief count {requested} (only {supported} is supported)")]
    UnsupportedBeliefCount {
        /// Count asked for.
        requested: usize,
        /// Count the engine supports.
        supported: usize,
    },

    /// Acceptance probability outside `[0, 1]`.
    #[error("acceptance probability must be in [0, 1], got {0}")]
    InvalidAcceptanceProbability(f64),

    /// Handicap multiplier that is negative or not finite.
    #[error("handicap for {belief} must be finite and non-negative, got {multiplier}")]
    InvalidHandicap {
        /// Belief the multiplier applies to.
        belief: BeliefId,
        /// Rejected multiplier.
        multiplier: f64,
    },

    /// Deterministic split point beyond the population.
    #[error("split {split} exceeds population of {voters}")]
    InvalidSplit {
        /// Requested split point.
        split: usize,
        /// Population size.
        voters: usize,
    },

    /// Strategy needs more voters than the graph has.
    #[error("{strategy} needs at least {required} voters, graph has {available}")]
    InsufficientVoters {
        /// Strategy name.
        strategy: &'static str,
        /// Minimum voters needed.
        required: usize,
        /// Voters available.
        available: usize,
    },

    /// The graph has no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,
}
