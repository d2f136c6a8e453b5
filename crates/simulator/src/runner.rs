//! Simulation runner.
//!
//! Wraps a [`VoterModel`] with a [`MetricsTracker`] and a stop condition, and
//! turns a finished run into a [`SimulationReport`].

use crate::config::{SimulatorConfig, StopCondition};
use crate::metrics::{distribution, ConvergenceTime, MetricsError, MetricsTracker, RoundRecord};
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use voter_simulation::{ModelError, VoterModel};
use voter_types::{BeliefId, Graph};

/// Convergence times are stored in the histogram at this resolution.
const HISTOGRAM_SCALE: f64 = 1000.0;

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Engine construction or stepping failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Recording a round failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Histogram could not be created or updated.
    #[error("histogram error: {0}")]
    Histogram(String),
}

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Rounds executed.
    pub rounds: u64,
    /// Sum of elapsed time over all rounds.
    pub total_time: f64,
    /// Convergence time, or a lower bound on it.
    pub convergence: ConvergenceTime,
    /// Belief shares after the last round.
    pub final_distribution: BTreeMap<BeliefId, f64>,
    /// Every recorded round.
    pub history: Vec<RoundRecord>,
}

impl SimulationReport {
    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("\n=== Simulation Report ===");
        println!("Rounds:            {}", self.rounds);
        println!("Total time:        {:.4}", self.total_time);
        match self.convergence {
            ConvergenceTime::Converged { round, time } => {
                println!("Convergence time:  {time:.4} (round {round})");
            }
            ConvergenceTime::LowerBound { time } => {
                println!("Convergence time:  >= {time:.4} (target not reached)");
            }
        }
        println!("Final distribution:");
        for (belief, share) in &self.final_distribution {
            println!("  {:<12} {:>6.2}%", belief.to_string(), share * 100.0);
        }
    }
}

/// Runs one configured simulation over a borrowed graph.
pub struct Simulator<'g, G: Graph> {
    model: VoterModel<'g, G>,
    config: SimulatorConfig,
    metrics: MetricsTracker,
}

impl<'g, G: Graph> Simulator<'g, G> {
    /// Build the engine. Configuration errors surface here.
    pub fn new(graph: &'g G, config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let model = VoterModel::new(graph, config.model.clone())?;
        Ok(Self {
            model,
            config,
            metrics: MetricsTracker::new(),
        })
    }

    /// Initialize the population and step until the stop condition holds.
    ///
    /// Metrics from any previous run are discarded.
    pub fn run(&mut self) -> Result<SimulationReport, SimulatorError> {
        self.model.initialize(self.config.init)?;
        self.metrics = MetricsTracker::new();

        let max_rounds = self.config.stop.max_rounds();
        let until_converged = matches!(self.config.stop, StopCondition::UntilConverged { .. });

        for _ in 0..max_rounds {
            let outcome = self.model.step()?;
            let record = self.metrics.record_outcome(&outcome)?;
            debug!(
                round = record.round,
                flux = record.flux,
                elapsed = record.elapsed,
                "Round complete"
            );
            if until_converged && record.reached_target() {
                break;
            }
        }

        let convergence = self.metrics.convergence_time();
        if until_converged && !convergence.is_converged() {
            warn!(
                max_rounds,
                lower_bound = convergence.value(),
                "Stopped without reaching the convergence target"
            );
        }

        let final_distribution = match self.metrics.latest() {
            Some(record) => record.distribution.clone(),
            None => distribution(&self.model.snapshot()),
        };

        info!(
            rounds = self.metrics.len(),
            converged = convergence.is_converged(),
            convergence_time = convergence.value(),
            "Simulation finished"
        );

        Ok(SimulationReport {
            rounds: self.metrics.len() as u64,
            total_time: self.metrics.total_time(),
            convergence,
            final_distribution,
            history: self.metrics.history().to_vec(),
        })
    }

    /// Metrics of the latest run.
    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    /// The underlying engine.
    pub fn model(&self) -> &VoterModel<'g, G> {
        &self.model
    }

    /// The run configuration.
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

/// Convergence statistics over repeated runs with consecutive seeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Runs executed.
    pub trials: u64,
    /// Runs that reached the convergence target.
    pub converged: u64,
    /// Mean convergence time over converged runs.
    pub mean_time: Option<f64>,
    /// Median convergence time over converged runs.
    pub p50_time: Option<f64>,
    /// 90th percentile convergence time over converged runs.
    pub p90_time: Option<f64>,
    /// 99th percentile convergence time over converged runs.
    pub p99_time: Option<f64>,
}

impl TrialSummary {
    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("\n=== Trial Summary ===");
        println!("Trials:     {}", self.trials);
        println!("Converged:  {}", self.converged);
        let show = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |t| format!("{t:.3}"));
        println!("Mean time:  {}", show(self.mean_time));
        println!("P50 time:   {}", show(self.p50_time));
        println!("P90 time:   {}", show(self.p90_time));
        println!("P99 time:   {}", show(self.p99_time));
    }
}

/// Run `trials` simulations, seeding run `i` with `config.model.seed + i`.
pub fn run_trials<G: Graph>(
    graph: &G,
    config: &SimulatorConfig,
    trials: u64,
) -> Result<TrialSummary, SimulatorError> {
    let mut histogram = Histogram::<u64>::new(3)
        .map_err(|e| SimulatorError::Histogram(e.to_string()))?;
    let mut converged = 0;

    for trial in 0..trials {
        let trial_config = config
            .clone()
            .with_seed(config.model.seed.wrapping_add(trial));
        let report = Simulator::new(graph, trial_config)?.run()?;

        if let ConvergenceTime::Converged { time, .. } = report.convergence {
            converged += 1;
            let scaled = (time * HISTOGRAM_SCALE).round().max(1.0) as u64;
            histogram
                .record(scaled)
                .map_err(|e| SimulatorError::Histogram(e.to_string()))?;
        }
    }

    let scaled = |v: u64| v as f64 / HISTOGRAM_SCALE;
    let percentile = |p: f64| (converged > 0).then(|| scaled(histogram.value_at_quantile(p)));

    Ok(TrialSummary {
        trials,
        converged,
        mean_time: (converged > 0).then(|| histogram.mean() / HISTOGRAM_SCALE),
        p50_time: percentile(0.5),
        p90_time: percentile(0.9),
        p99_time: percentile(0.99),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;
    use voter_core::VotingRule;
    use voter_simulation::{ClockModel, InitStrategy, ModelConfig};
    use voter_test_helpers::{two_node_graph, DEFAULT_SEED};
    use voter_types::StaticGraph;

    #[test]
    fn test_fixed_rounds() {
        let graph = StaticGraph::cycle(10);
        let config = SimulatorConfig::default()
            .with_init(InitStrategy::AllRand)
            .with_rounds(25)
            .with_seed(DEFAULT_SEED);
        let mut simulator = Simulator::new(&graph, config).unwrap();
        let report = simulator.run().unwrap();

        assert_eq!(report.rounds, 25);
        assert_eq!(report.history.len(), 25);
        assert_eq!(report.total_time, 25.0);
        assert_eq!(simulator.metrics().len(), 25);
        assert_eq!(simulator.model().round(), 25);
    }

    #[test]
    fn test_zero_rounds_reports_initial_distribution() {
        let graph = two_node_graph();
        let config = SimulatorConfig::default()
            .with_init(InitStrategy::split(1))
            .with_rounds(0);
        let report = Simulator::new(&graph, config).unwrap().run().unwrap();

        assert_eq!(report.rounds, 0);
        assert_eq!(report.convergence, ConvergenceTime::LowerBound { time: 0.0 });
        assert_eq!(report.final_distribution.get(&BeliefId(1)), Some(&0.5));
        assert_eq!(report.final_distribution.get(&BeliefId(2)), Some(&0.5));
    }

    #[test]
    fn test_until_converged_runs_to_limit_without_target() {
        // Everyone starts on belief 1, which is never the {0, 1} target.
        let graph = voter_test_helpers::star_graph(3);
        let config =
            SimulatorConfig::new(ModelConfig::new(VotingRule::Simple, ClockModel::Discrete))
                .with_init(InitStrategy::split(4))
                .until_converged(50);
        let report = Simulator::new(&graph, config).unwrap().run().unwrap();

        assert!(!report.convergence.is_converged());
        assert_eq!(report.rounds, 50);
        assert_eq!(report.convergence.value(), 50.0);
    }

    #[test]
    #[traced_test]
    fn test_warns_when_limit_reached() {
        let graph = two_node_graph();
        let config = SimulatorConfig::default().until_converged(4);
        Simulator::new(&graph, config).unwrap().run().unwrap();

        assert!(logs_contain("Stopped without reaching the convergence target"));
        assert!(logs_contain("Simulation finished"));
    }

    #[test]
    fn test_until_converged_stops_on_first_target_round() {
        // Without edges nobody changes, so each seed either starts on the
        // target and stops after one round or never reaches it.
        let graph = voter_test_helpers::isolated_graph(3);
        let mut stopped_early = 0;
        for seed in 0..40 {
            let config = SimulatorConfig::default()
                .with_init(InitStrategy::AllRand)
                .until_converged(10)
                .with_seed(seed);
            let report = Simulator::new(&graph, config).unwrap().run().unwrap();
            match report.convergence {
                ConvergenceTime::Converged { round, time } => {
                    stopped_early += 1;
                    assert_eq!(round, 1);
                    assert_eq!(time, 1.0);
                    assert_eq!(report.rounds, 1);
                }
                ConvergenceTime::LowerBound { time } => {
                    assert_eq!(report.rounds, 10);
                    assert_eq!(time, 10.0);
                }
            }
        }
        assert!(stopped_early > 0);
    }

    #[test]
    fn test_run_resets_metrics() {
        let graph = StaticGraph::complete(6);
        let config = SimulatorConfig::default()
            .with_init(InitStrategy::AllRand)
            .with_rounds(5);
        let mut simulator = Simulator::new(&graph, config).unwrap();
        simulator.run().unwrap();
        simulator.run().unwrap();
        assert_eq!(simulator.metrics().len(), 5);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let graph = two_node_graph();
        let config =
            SimulatorConfig::new(ModelConfig::default().with_acceptance_probability(2.0));
        assert!(matches!(
            Simulator::new(&graph, config),
            Err(SimulatorError::Model(ModelError::Config(_)))
        ));
    }

    #[test]
    fn test_trials_without_convergence() {
        let graph = StaticGraph::complete(4);
        let config = SimulatorConfig::default()
            .with_init(InitStrategy::split(4))
            .until_converged(3);
        let summary = run_trials(&graph, &config, 4).unwrap();

        assert_eq!(summary.trials, 4);
        assert_eq!(summary.converged, 0);
        assert_eq!(summary.mean_time, None);
        assert_eq!(summary.p99_time, None);
    }
}
