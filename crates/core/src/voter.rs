//! A single voter and its per-round inbox.

use crate::{Handicaps, UpdateInput, VotingRule};
use rand::Rng;
use std::sync::Arc;
use voter_types::{BeliefState, NodeId};

/// The agent living on one graph node.
///
/// Votes are appended to the inbox while a round's exchange phase runs and
/// consumed by [`Voter::update`], which always leaves the inbox empty. Nothing
/// in the inbox survives into the next round.
#[derive(Debug, Clone)]
pub struct Voter {
    /// Node this voter sits on.
    id: NodeId,
    /// Number of neighbors, fixed by the graph.
    degree: usize,
    /// Current belief.
    belief: BeliefState,
    /// Probability of adopting a majority outcome.
    acceptance_probability: f64,
    /// Shared per-belief multipliers, if any.
    handicaps: Option<Arc<Handicaps>>,
    /// Votes received during the current round.
    inbox: Vec<BeliefState>,
}

impl Voter {
    /// Create a voter with an empty inbox.
    pub fn new(
        id: NodeId,
        degree: usize,
        belief: BeliefState,
        acceptance_probability: f64,
    ) -> Self {
        Self {
            id,
            degree,
            belief,
            acceptance_probability,
            handicaps: None,
            inbox: Vec::new(),
        }
    }

    /// Attach handicap multipliers.
    pub fn with_handicaps(mut self, handicaps: Arc<Handicaps>) -> Self {
        self.handicaps = Some(handicaps);
        self
    }

    /// Node this voter sits on.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Number of neighbors.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Current belief.
    pub fn belief(&self) -> BeliefState {
        self.belief
    }

    /// Probability of adopting a majority outcome.
    pub fn acceptance_probability(&self) -> f64 {
        self.acceptance_probability
    }

    /// Configured handicaps.
    pub fn handicaps(&self) -> Option<&Handicaps> {
        self.handicaps.as_deref()
    }

    /// Votes received so far this round.
    pub fn inbox(&self) -> &[BeliefState] {
        &self.inbox
    }

    /// Overwrite the belief, discarding any pending votes.
    pub fn reset(&mut self, belief: BeliefState) {
        self.belief = belief;
        self.inbox.clear();
    }

    /// Queue a vote for this round's update.
    pub fn receive(&mut self, vote: BeliefState) {
        self.inbox.push(vote);
    }

    /// Apply `rule` to the pending votes and clear the inbox.
    ///
    /// Returns true if the belief id changed.
    pub fn update(&mut self, rule: VotingRule, rng: &mut impl Rng) -> bool {
        let input = UpdateInput {
            current: self.belief,
            degree: self.degree,
            inbox: &self.inbox,
            acceptance_probability: self.acceptance_probability,
            handicaps: self.handicaps.as_deref(),
        };
        let next = rule.decide(&input, rng);
        self.inbox.clear();

        let changed = next.id != self.belief.id;
        self.belief = next;
        changed
    }
}
