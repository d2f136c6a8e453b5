//! Engine configuration.

use crate::ClockModel;
use voter_core::{ConfigError, Handicaps, VotingRule, SUPPORTED_BELIEF_COUNT};

/// Configuration for a [`VoterModel`](crate::VoterModel).
#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    /// Belief-update rule every voter follows.
    pub voting_rule: VotingRule,

    /// How rounds are scheduled.
    pub clock: ClockModel,

    /// Number of belief categories. Only [`SUPPORTED_BELIEF_COUNT`] is accepted.
    pub num_beliefs: usize,

    /// Probability that a voter adopts a majority outcome.
    pub acceptance_probability: f64,

    /// Optional per-belief multipliers.
    pub handicaps: Option<Handicaps>,

    /// Random seed for deterministic simulation.
    pub seed: u64,
}

impl ModelConfig {
    /// Create a configuration with the given rule and clock.
    pub fn new(voting_rule: VotingRule, clock: ClockModel) -> Self {
        Self {
            voting_rule,
            clock,
            num_beliefs: SUPPORTED_BELIEF_COUNT,
            acceptance_probability: 1.0,
            handicaps: None,
            seed: 12345,
        }
    }

    /// Set the voting rule.
    pub fn with_voting_rule(mut self, voting_rule: VotingRule) -> Self {
        self.voting_rule = voting_rule;
        self
    }

    /// Set the clock model.
    pub fn with_clock(mut self, clock: ClockModel) -> Self {
        self.clock = clock;
        self
    }

    /// Set the number of belief categories.
    pub fn with_num_beliefs(mut self, num_beliefs: usize) -> Self {
        self.num_beliefs = num_beliefs;
        self
    }

    /// Set the acceptance probability.
    pub fn with_acceptance_probability(mut self, probability: f64) -> Self {
        self.acceptance_probability = probability;
        self
    }

    /// Set handicap multipliers.
    pub fn with_handicaps(mut self, handicaps: Handicaps) -> Self {
        self.handicaps = Some(handicaps);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every option, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_beliefs != SUPPORTED_BELIEF_COUNT {
            return Err(ConfigError::UnsupportedBeliefCount {
                requested: self.num_beliefs,
                supported: SUPPORTED_BELIEF_COUNT,
            });
        }
        if !(0.0..=1.0).contains(&self.acceptance_probability) {
            return Err(ConfigError::InvalidAcceptanceProbability(
                self.acceptance_probability,
            ));
        }
        if let Some(handicaps) = &self.handicaps {
            handicaps.validate()?;
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(VotingRule::default(), ClockModel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voter_types::BeliefId;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ModelConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_belief_count() {
        let config = ModelConfig::default().with_num_beliefs(3);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnsupportedBeliefCount {
                requested: 3,
                supported: 2
            })
        );
    }

    #[test]
    fn test_rejects_acceptance_probability() {
        for p in [-0.1, 1.01, f64::NAN] {
            let config = ModelConfig::default().with_acceptance_probability(p);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidAcceptanceProbability(_))
            ));
        }
    }

    #[test]
    fn test_rejects_handicaps() {
        let config =
            ModelConfig::default().with_handicaps(Handicaps::new().with(BeliefId(1), -2.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHandicap { .. })
        ));
    }
}
