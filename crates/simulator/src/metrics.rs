//! Per-round metrics and convergence time.
//!
//! The tracker is append-only: one [`RoundRecord`] per engine step, in step
//! order. The order of the history is itself the convergence signal, so
//! records are never merged, rewritten or deduplicated.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use voter_simulation::StepOutcome;
use voter_types::BeliefId;

/// Observed belief set that counts as converged.
///
/// This target comes from the two-belief configurations. Populations seeded
/// with many beliefs (`all_rand_n`, `all_unique`) can settle on other sets and
/// will then only ever report a lower bound.
pub const CONVERGENCE_TARGET: [BeliefId; 2] = [BeliefId(0), BeliefId(1)];

/// Errors while recording metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// Pre- and post-round snapshots cover different populations.
    #[error("snapshot length mismatch: {before} before, {after} after")]
    SnapshotLengthMismatch {
        /// Length of the pre-round snapshot.
        before: usize,
        /// Length of the post-round snapshot.
        after: usize,
    },
}

/// Metrics for one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Position in the history, starting at 1.
    pub round: u64,
    /// Number of voters whose belief id changed.
    pub flux: usize,
    /// `flux` divided by the population size.
    pub flux_fraction: f64,
    /// Share of the population holding each observed belief after the round.
    pub distribution: BTreeMap<BeliefId, f64>,
    /// Simulated time the round took.
    pub elapsed: f64,
}

impl RoundRecord {
    /// Belief ids held by at least one voter after the round.
    pub fn observed(&self) -> BTreeSet<BeliefId> {
        self.distribution.keys().copied().collect()
    }

    /// Share of the population holding `belief` (zero if unobserved).
    pub fn share(&self, belief: BeliefId) -> f64 {
        self.distribution.get(&belief).copied().unwrap_or(0.0)
    }

    /// Check if the observed belief set is exactly [`CONVERGENCE_TARGET`].
    pub fn reached_target(&self) -> bool {
        self.distribution.len() == CONVERGENCE_TARGET.len()
            && CONVERGENCE_TARGET
                .iter()
                .all(|belief| self.distribution.contains_key(belief))
    }
}

/// Time to convergence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceTime {
    /// Elapsed time summed through the first round that reached the target.
    Converged {
        /// First round that reached the target.
        round: u64,
        /// Elapsed time through that round.
        time: f64,
    },

    /// The target was never reached; this is the total recorded time, which
    /// only bounds the true convergence time from below.
    LowerBound {
        /// Total recorded time.
        time: f64,
    },
}

impl ConvergenceTime {
    /// The time value, whether converged or a lower bound.
    pub fn value(&self) -> f64 {
        match *self {
            ConvergenceTime::Converged { time, .. } => time,
            ConvergenceTime::LowerBound { time } => time,
        }
    }

    /// Check if the target was actually reached.
    pub fn is_converged(&self) -> bool {
        matches!(self, ConvergenceTime::Converged { .. })
    }
}

/// Share of `snapshot` holding each observed belief.
///
/// An empty snapshot has an empty distribution.
pub fn distribution(snapshot: &[BeliefId]) -> BTreeMap<BeliefId, f64> {
    let mut counts: BTreeMap<BeliefId, usize> = BTreeMap::new();
    for &belief in snapshot {
        *counts.entry(belief).or_insert(0) += 1;
    }
    let total = snapshot.len() as f64;
    counts
        .into_iter()
        .map(|(belief, count)| (belief, count as f64 / total))
        .collect()
}

/// Accumulates one [`RoundRecord`] per engine step.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    history: Vec<RoundRecord>,
}

impl MetricsTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for one round.
    ///
    /// Must be called once per step, in step order.
    pub fn record(
        &mut self,
        before: &[BeliefId],
        after: &[BeliefId],
        elapsed: f64,
    ) -> Result<&RoundRecord, MetricsError> {
        if before.len() != after.len() {
            return Err(MetricsError::SnapshotLengthMismatch {
                before: before.len(),
                after: after.len(),
            });
        }

        let flux = before.iter().zip(after).filter(|(b, a)| b != a).count();
        let flux_fraction = if after.is_empty() {
            0.0
        } else {
            flux as f64 / after.len() as f64
        };

        self.history.push(RoundRecord {
            round: self.history.len() as u64 + 1,
            flux,
            flux_fraction,
            distribution: distribution(after),
            elapsed,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    /// Append a record for an engine step.
    pub fn record_outcome(&mut self, outcome: &StepOutcome) -> Result<&RoundRecord, MetricsError> {
        self.record(&outcome.before, &outcome.after, outcome.elapsed)
    }

    /// Time until the observed belief set first equals [`CONVERGENCE_TARGET`].
    ///
    /// Falls back to the total recorded time, flagged as a lower bound, if the
    /// target was never reached.
    pub fn convergence_time(&self) -> ConvergenceTime {
        let mut time = 0.0;
        for record in &self.history {
            time += record.elapsed;
            if record.reached_target() {
                return ConvergenceTime::Converged {
                    round: record.round,
                    time,
                };
            }
        }
        ConvergenceTime::LowerBound { time }
    }

    /// Every record, oldest first.
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&RoundRecord> {
        self.history.last()
    }

    /// Flux per round.
    pub fn flux_curve(&self) -> Vec<usize> {
        self.history.iter().map(|r| r.flux).collect()
    }

    /// Flux per round as a fraction of the population.
    pub fn flux_fraction_curve(&self) -> Vec<f64> {
        self.history.iter().map(|r| r.flux_fraction).collect()
    }

    /// Share of `belief` after each round.
    pub fn distribution_curve(&self, belief: BeliefId) -> Vec<f64> {
        self.history.iter().map(|r| r.share(belief)).collect()
    }

    /// Running total of elapsed time after each round.
    pub fn cumulative_time(&self) -> Vec<f64> {
        self.history
            .iter()
            .scan(0.0, |total, r| {
                *total += r.elapsed;
                Some(*total)
            })
            .collect()
    }

    /// Sum of all recorded elapsed time.
    pub fn total_time(&self) -> f64 {
        self.history.iter().map(|r| r.elapsed).sum()
    }

    /// Number of recorded rounds.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
