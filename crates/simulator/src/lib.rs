//! Voter-model experiment runner.
//!
//! Drives a [`voter_simulation::VoterModel`] for a configured number of
//! rounds, records per-round metrics and reports convergence time.
//!
//! # Example
//!
//! ```no_run
//! use voter_simulator::{Simulator, SimulatorConfig};
//! use voter_types::StaticGraph;
//!
//! let graph = StaticGraph::complete(50);
//! let config = SimulatorConfig::default().until_converged(1_000);
//! let report = Simulator::new(&graph, config)?.run()?;
//! report.print();
//! # Ok::<(), voter_simulator::SimulatorError>(())
//! ```

pub mod config;
pub mod metrics;
pub mod runner;

pub use config::{GraphSpec, SimulatorConfig, StopCondition};
pub use metrics::{
    distribution, ConvergenceTime, MetricsError, MetricsTracker, RoundRecord, CONVERGENCE_TARGET,
};
pub use runner::{run_trials, SimulationReport, Simulator, SimulatorError, TrialSummary};
