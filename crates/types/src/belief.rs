//! Belief state held by a single voter.

use crate::BeliefId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A voter's opinion and how strongly it is held.
///
/// Strength lives in `[0, 1]`. For the neutral belief strength carries no
/// meaning and is kept at `1.0` by convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    /// Which belief is held.
    pub id: BeliefId,
    /// Confidence in the held belief.
    pub strength: f64,
}

impl BeliefState {
    /// The neutral state.
    pub const NEUTRAL: Self = BeliefState {
        id: BeliefId::NEUTRAL,
        strength: 1.0,
    };

    /// Hold `id` with full strength.
    pub fn new(id: BeliefId) -> Self {
        Self { id, strength: 1.0 }
    }

    /// Hold `id` with the given strength, clamped into `[0, 1]`.
    ///
    /// Neutral states always carry strength `1.0`.
    pub fn with_strength(id: BeliefId, strength: f64) -> Self {
        if id.is_neutral() {
            return Self::NEUTRAL;
        }
        Self {
            id,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    /// Returns true if no belief is held.
    pub fn is_neutral(&self) -> bool {
        self.id.is_neutral()
    }
}

impl Default for BeliefState {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<BeliefId> for BeliefState {
    fn from(id: BeliefId) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for BeliefState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:.3}", self.id, self.strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_is_clamped() {
        assert_eq!(BeliefState::with_strength(BeliefId(1), 1.4).strength, 1.0);
        assert_eq!(BeliefState::with_strength(BeliefId(1), -0.2).strength, 0.0);
        assert_eq!(BeliefState::with_strength(BeliefId(2), 0.25).strength, 0.25);
    }

    #[test]
    fn test_neutral_strength_convention() {
        let state = BeliefState::with_strength(BeliefId::NEUTRAL, 0.3);
        assert!(state.is_neutral());
        assert_eq!(state.strength, 1.0);
        assert_eq!(BeliefState::default(), BeliefState::NEUTRAL);
    }
}
