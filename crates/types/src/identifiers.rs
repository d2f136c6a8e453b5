//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Graph node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Belief identifier.
///
/// `0` is the neutral "no belief" value. Every positive value names a distinct
/// belief category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BeliefId(pub u32);

impl BeliefId {
    /// The neutral belief.
    pub const NEUTRAL: Self = BeliefId(0);

    /// Returns true for the neutral belief.
    pub fn is_neutral(self) -> bool {
        self == Self::NEUTRAL
    }

    /// Get the raw value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for BeliefId {
    fn from(value: u32) -> Self {
        BeliefId(value)
    }
}

impl fmt::Display for BeliefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_neutral() {
            write!(f, "Neutral")
        } else {
            write!(f, "Belief({})", self.0)
        }
    }
}
