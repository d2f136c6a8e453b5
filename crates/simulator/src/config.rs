//! Configuration types for the simulator.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::str::FromStr;
use voter_simulation::{InitStrategy, ModelConfig};
use voter_types::{GraphError, StaticGraph};

/// Configuration for a simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatorConfig {
    /// Engine configuration (rule, clock, acceptance, handicaps, seed).
    pub model: ModelConfig,

    /// How the population is seeded.
    pub init: InitStrategy,

    /// When to stop stepping.
    pub stop: StopCondition,
}

impl SimulatorConfig {
    /// Create a configuration around an engine configuration.
    pub fn new(model: ModelConfig) -> Self {
        Self {
            model,
            init: InitStrategy::default(),
            stop: StopCondition::default(),
        }
    }

    /// Set the initialization strategy.
    pub fn with_init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    /// Set the stop condition.
    pub fn with_stop(mut self, stop: StopCondition) -> Self {
        self.stop = stop;
        self
    }

    /// Run a fixed number of rounds.
    pub fn with_rounds(self, rounds: u64) -> Self {
        self.with_stop(StopCondition::Rounds(rounds))
    }

    /// Stop at convergence, or after `max_rounds`.
    pub fn until_converged(self, max_rounds: u64) -> Self {
        self.with_stop(StopCondition::UntilConverged { max_rounds })
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.model.seed = seed;
        self
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

/// When the runner stops calling `step()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopCondition {
    /// Run exactly this many rounds.
    Rounds(u64),

    /// Stop after the first round that reaches the convergence target, or
    /// after `max_rounds`, whichever comes first.
    UntilConverged {
        /// Upper bound on rounds.
        max_rounds: u64,
    },
}

impl StopCondition {
    /// Most rounds this condition allows.
    pub fn max_rounds(self) -> u64 {
        match self {
            StopCondition::Rounds(rounds) => rounds,
            StopCondition::UntilConverged { max_rounds } => max_rounds,
        }
    }
}

impl Default for StopCondition {
    fn default() -> Self {
        StopCondition::Rounds(100)
    }
}

/// A graph to generate, as written on the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GraphSpec {
    /// `complete:N`
    Complete(u32),
    /// `cycle:N`
    Cycle(u32),
    /// `torus:RxC`
    Torus(u32, u32),
    /// `erdos-renyi:N:P`
    ErdosRenyi(u32, f64),
}

impl GraphSpec {
    /// Generate the graph. Random generators draw from a RNG seeded with `seed`.
    pub fn build(self, seed: u64) -> Result<StaticGraph, GraphError> {
        match self {
            GraphSpec::Complete(n) => Ok(StaticGraph::complete(n)),
            GraphSpec::Cycle(n) => Ok(StaticGraph::cycle(n)),
            GraphSpec::Torus(rows, cols) => StaticGraph::torus_2d(rows, cols),
            GraphSpec::ErdosRenyi(n, p) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                StaticGraph::erdos_renyi(n, p, &mut rng)
            }
        }
    }
}

impl fmt::Display for GraphSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSpec::Complete(n) => write!(f, "complete:{n}"),
            GraphSpec::Cycle(n) => write!(f, "cycle:{n}"),
            GraphSpec::Torus(rows, cols) => write!(f, "torus:{rows}x{cols}"),
            GraphSpec::ErdosRenyi(n, p) => write!(f, "erdos-renyi:{n}:{p}"),
        }
    }
}

impl FromStr for GraphSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid graph spec: {s}");
        let parts: Vec<&str> = s.split(':').collect();

        match parts.as_slice() {
            ["complete", n] => Ok(GraphSpec::Complete(n.parse().map_err(|_| invalid())?)),
            ["cycle", n] => Ok(GraphSpec::Cycle(n.parse().map_err(|_| invalid())?)),
            ["torus", dims] => {
                let (rows, cols) = dims.split_once('x').ok_or_else(invalid)?;
                Ok(GraphSpec::Torus(
                    rows.parse().map_err(|_| invalid())?,
                    cols.parse().map_err(|_| invalid())?,
                ))
            }
            ["erdos-renyi", n, p] => Ok(GraphSpec::ErdosRenyi(
                n.parse().map_err(|_| invalid())?,
                p.parse().map_err(|_| invalid())?,
            )),
            _ => Err(format!("Unknown graph spec: {s}")),
        }
    }
}
