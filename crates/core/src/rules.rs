//! Belief-update rules.
//!
//! Every rule starts from the same tally: the voter's own non-neutral belief
//! counts as one vote carrying its current strength, and every non-neutral vote
//! in the inbox adds one to its belief's count and its strength to that belief's
//! weight. Handicap multipliers scale both. Tallies are rebuilt on every update.

use crate::{ConfigError, Handicaps};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use voter_types::{BeliefId, BeliefState};

/// How a voter turns received votes into a new belief.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingRule {
    /// Strict majority of tallied counts, gated by the acceptance probability.
    #[default]
    Simple,

    /// Adopt a belief with probability `count / (degree + 1)`.
    Probability,

    /// Adopt a belief with probability `weight / degree`, carrying strength.
    #[serde(rename = "weighted_prob")]
    WeightedProbability,

    /// Majority rule fed by a single neighbor per round.
    SingleNeighbor,
}

impl VotingRule {
    /// Every rule, in declaration order.
    pub const ALL: [VotingRule; 4] = [
        VotingRule::Simple,
        VotingRule::Probability,
        VotingRule::WeightedProbability,
        VotingRule::SingleNeighbor,
    ];

    /// Configuration name of this rule.
    pub fn name(self) -> &'static str {
        match self {
            VotingRule::Simple => "simple",
            VotingRule::Probability => "probability",
            VotingRule::WeightedProbability => "weighted_prob",
            VotingRule::SingleNeighbor => "single_neighbor",
        }
    }

    /// Compute the belief that follows from `input`.
    ///
    /// An empty inbox always leaves the belief untouched, without consuming
    /// randomness.
    pub fn decide(self, input: &UpdateInput<'_>, rng: &mut impl Rng) -> BeliefState {
        if input.inbox.is_empty() {
            return input.current;
        }
        let tallies = tally(input.current, input.inbox, input.handicaps);
        match self {
            VotingRule::Simple | VotingRule::SingleNeighbor => {
                decide_majority(input, &tallies, rng)
            }
            VotingRule::Probability => decide_probability(input, &tallies, rng),
            VotingRule::WeightedProbability => decide_weighted(input, &tallies, rng),
        }
    }
}

impl fmt::Display for VotingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VotingRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VotingRule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| ConfigError::UnknownVotingRule(s.to_string()))
    }
}

/// Everything a rule reads about one voter.
#[derive(Debug, Clone, Copy)]
pub struct UpdateInput<'a> {
    /// Belief before the update.
    pub current: BeliefState,
    /// Number of neighbors.
    pub degree: usize,
    /// Votes received this round.
    pub inbox: &'a [BeliefState],
    /// Probability that a majority outcome is actually adopted.
    pub acceptance_probability: f64,
    /// Optional per-belief multipliers.
    pub handicaps: Option<&'a Handicaps>,
}

/// Count and strength-weight accumulated for one belief.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    /// Number of votes, after handicap.
    pub count: f64,
    /// Sum of vote strengths, after handicap.
    pub weight: f64,
}

/// Tally the voter's own belief plus its inbox, keyed by belief id.
///
/// Neutral beliefs are never tallied.
pub fn tally(
    current: BeliefState,
    inbox: &[BeliefState],
    handicaps: Option<&Handicaps>,
) -> BTreeMap<BeliefId, Tally> {
    let mut tallies: BTreeMap<BeliefId, Tally> = BTreeMap::new();

    for vote in std::iter::once(&current).chain(inbox) {
        if vote.is_neutral() {
            continue;
        }
        let entry = tallies.entry(vote.id).or_default();
        entry.count += 1.0;
        entry.weight += vote.strength;
    }

    if let Some(handicaps) = handicaps {
        for (&belief, entry) in tallies.iter_mut() {
            let multiplier = handicaps.multiplier(belief);
            entry.count *= multiplier;
            entry.weight *= multiplier;
        }
    }

    tallies
}

/// Pick the belief with the largest count.
///
/// On equal counts a belief other than `current` wins, so a lone dissenting
/// vote is enough to move a voter. Returns `None` if every count is zero.
pub fn majority_winner(current: BeliefId, tallies: &BTreeMap<BeliefId, Tally>) -> Option<BeliefId> {
    let mut best: Option<(BeliefId, f64)> = None;

    for (&belief, entry) in tallies {
        best = match best {
            None => Some((belief, entry.count)),
            Some((best_belief, best_count)) => {
                let switch_on_tie =
                    entry.count == best_count && best_belief == current && belief != current;
                if entry.count > best_count || switch_on_tie {
                    Some((belief, entry.count))
                } else {
                    Some((best_belief, best_count))
                }
            }
        };
    }

    best.filter(|&(_, count)| count > 0.0)
        .map(|(belief, _)| belief)
}

/// A categorical draw over beliefs plus a "keep current belief" outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcomes {
    /// Probability of adopting each belief, in belief order.
    pub entries: Vec<(BeliefId, f64)>,
    /// Probability of no change. Never negative.
    pub no_change: f64,
}

impl Outcomes {
    /// Build from per-belief probabilities. Residual mass goes to "no change"
    /// and is clamped at zero; the entries are not renormalized.
    pub fn new(entries: Vec<(BeliefId, f64)>) -> Self {
        let total: f64 = entries.iter().map(|&(_, p)| p).sum();
        Self {
            entries,
            no_change: (1.0 - total).max(0.0),
        }
    }

    /// Draw one outcome. `None` means keep the current belief.
    ///
    /// If the entries sum past one, beliefs late in the order lose the mass
    /// beyond one.
    pub fn draw(&self, rng: &mut impl Rng) -> Option<BeliefId> {
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        for &(belief, probability) in &self.entries {
            cumulative += probability;
            if draw < cumulative {
                return Some(belief);
            }
        }
        None
    }
}

fn decide_majority(
    input: &UpdateInput<'_>,
    tallies: &BTreeMap<BeliefId, Tally>,
    rng: &mut impl Rng,
) -> BeliefState {
    let Some(winner) = majority_winner(input.current.id, tallies) else {
        return input.current;
    };
    if rng.gen::<f64>() < input.acceptance_probability {
        BeliefState::new(winner)
    } else {
        input.current
    }
}

fn decide_probability(
    input: &UpdateInput<'_>,
    tallies: &BTreeMap<BeliefId, Tally>,
    rng: &mut impl Rng,
) -> BeliefState {
    // The voter's own vote is folded into the tally.
    let denominator = (input.degree + 1) as f64;
    let outcomes = Outcomes::new(
        tallies
            .iter()
            .filter(|(_, t)| t.count > 0.0)
            .map(|(&belief, t)| (belief, t.count / denominator))
            .collect(),
    );

    match outcomes.draw(rng) {
        Some(belief) => BeliefState::new(belief),
        None => input.current,
    }
}

fn decide_weighted(
    input: &UpdateInput<'_>,
    tallies: &BTreeMap<BeliefId, Tally>,
    rng: &mut impl Rng,
) -> BeliefState {
    if input.degree == 0 {
        return input.current;
    }
    let degree = input.degree as f64;
    let outcomes = Outcomes::new(
        tallies
            .iter()
            .filter(|(_, t)| t.weight > 0.0)
            .map(|(&belief, t)| (belief, t.weight / degree))
            .collect(),
    );

    let Some(belief) = outcomes.draw(rng) else {
        return input.current;
    };
    let weight = tallies.get(&belief).map(|t| t.weight).unwrap_or(0.0);

    if belief == input.current.id {
        // Confirming the held belief never lowers its strength.
        let confirmed = weight / (degree + 1.0);
        BeliefState::with_strength(belief, confirmed.max(input.current.strength))
    } else {
        BeliefState::with_strength(belief, weight / degree)
    }
}
