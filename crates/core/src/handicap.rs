//! Per-belief handicap multipliers.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use voter_types::BeliefId;

/// Multipliers that dampen (or boost) how strongly a belief propagates.
///
/// A belief with no configured multiplier uses `1.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handicaps(BTreeMap<BeliefId, f64>);

impl Handicaps {
    /// No handicaps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a multiplier for `belief`.
    pub fn with(mut self, belief: BeliefId, multiplier: f64) -> Self {
        self.insert(belief, multiplier);
        self
    }

    /// Set the multiplier for `belief`, replacing any previous one.
    pub fn insert(&mut self, belief: BeliefId, multiplier: f64) {
        self.0.insert(belief, multiplier);
    }

    /// Multiplier applied to `belief`.
    pub fn multiplier(&self, belief: BeliefId) -> f64 {
        self.0.get(&belief).copied().unwrap_or(1.0)
    }

    /// Reject negative or non-finite multipliers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (&belief, &multiplier) in &self.0 {
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(ConfigError::InvalidHandicap { belief, multiplier });
            }
        }
        Ok(())
    }

    /// Check if no multipliers are configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Configured multipliers in belief order.
    pub fn iter(&self) -> impl Iterator<Item = (BeliefId, f64)> + '_ {
        self.0.iter().map(|(&b, &m)| (b, m))
    }
}

impl FromIterator<(BeliefId, f64)> for Handicaps {
    fn from_iter<I: IntoIterator<Item = (BeliefId, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
