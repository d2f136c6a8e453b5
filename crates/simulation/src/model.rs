//! The voter-model engine.

use crate::{ClockModel, InitStrategy, ModelConfig, ModelError};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, trace};
use voter_core::{ConfigError, Handicaps, Voter, VotingRule};
use voter_types::{BeliefId, BeliefState, Graph, NodeId};

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Round number, starting at 1.
    pub round: u64,
    /// Belief ids before the round, in node order.
    pub before: Vec<BeliefId>,
    /// Belief ids after the round, in node order.
    pub after: Vec<BeliefId>,
    /// Simulated time the round took.
    pub elapsed: f64,
}

/// Drives a voter population over a borrowed graph.
///
/// The engine owns every [`Voter`] and its RNG. Voters are created by
/// [`initialize`](Self::initialize), mutated only by [`step`](Self::step), and
/// replaced wholesale on re-initialization. Once initialized, the population's
/// keys are exactly the graph's nodes, in the graph's order.
pub struct VoterModel<'g, G: Graph, R: Rng = ChaCha8Rng> {
    graph: &'g G,
    config: ModelConfig,
    voters: IndexMap<NodeId, Voter>,
    /// Neighbor positions per node position.
    adjacency: Vec<Vec<usize>>,
    /// Edges as node positions.
    edges: Vec<(usize, usize)>,
    handicaps: Option<Arc<Handicaps>>,
    rng: R,
    round: u64,
}

impl<'g, G: Graph> VoterModel<'g, G, ChaCha8Rng> {
    /// Create an engine whose RNG is seeded from `config.seed`.
    pub fn new(graph: &'g G, config: ModelConfig) -> Result<Self, ModelError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(graph, config, rng)
    }
}

impl<'g, G: Graph, R: Rng> VoterModel<'g, G, R> {
    /// Create an engine drawing from the given RNG.
    ///
    /// All configuration is validated here; nothing is checked again while
    /// stepping.
    pub fn with_rng(graph: &'g G, config: ModelConfig, rng: R) -> Result<Self, ModelError> {
        config.validate()?;
        if graph.num_nodes() == 0 {
            return Err(ConfigError::EmptyGraph.into());
        }

        let position: HashMap<NodeId, usize> = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i))
            .collect();

        let mut adjacency = vec![Vec::new(); graph.num_nodes()];
        let mut edges = Vec::with_capacity(graph.num_edges());
        for &(a, b) in graph.edges() {
            let pa = *position.get(&a).ok_or(ModelError::UnknownEdgeEndpoint(a))?;
            let pb = *position.get(&b).ok_or(ModelError::UnknownEdgeEndpoint(b))?;
            adjacency[pa].push(pb);
            adjacency[pb].push(pa);
            edges.push((pa, pb));
        }

        let handicaps = config.handicaps.clone().map(Arc::new);

        Ok(Self {
            graph,
            config,
            voters: IndexMap::new(),
            adjacency,
            edges,
            handicaps,
            rng,
            round: 0,
        })
    }

    /// Build a fresh population using `strategy`.
    ///
    /// Any previous population and round count are discarded.
    pub fn initialize(&mut self, strategy: InitStrategy) -> Result<(), ModelError> {
        let nodes = self.graph.nodes();
        let assigned = strategy.assign(nodes.len(), &mut self.rng)?;

        self.voters = nodes
            .iter()
            .zip(assigned)
            .map(|(&node, belief)| {
                let mut voter = Voter::new(
                    node,
                    self.graph.degree(node),
                    BeliefState::new(belief),
                    self.config.acceptance_probability,
                );
                if let Some(handicaps) = &self.handicaps {
                    voter = voter.with_handicaps(Arc::clone(handicaps));
                }
                (node, voter)
            })
            .collect();
        self.round = 0;

        info!(
            strategy = %strategy,
            voters = self.voters.len(),
            edges = self.edges.len(),
            rule = %self.config.voting_rule,
            clock = %self.config.clock,
            "Initialized voter population"
        );
        Ok(())
    }

    /// Run exactly one round.
    ///
    /// There is no stopping condition here; callers decide how many rounds to
    /// run and accumulate elapsed time themselves.
    pub fn step(&mut self) -> Result<StepOutcome, ModelError> {
        if self.voters.is_empty() {
            return Err(ModelError::NotInitialized);
        }

        let before = self.snapshot();
        let elapsed = self.config.clock.sample_elapsed(&mut self.rng);
        match self.config.clock {
            ClockModel::Discrete => self.run_discrete_round(),
            ClockModel::Exponential => self.run_wake_event(),
        }
        self.round += 1;

        Ok(StepOutcome {
            round: self.round,
            before,
            after: self.snapshot(),
            elapsed,
        })
    }

    /// Synchronous round: every vote is queued from pre-round beliefs before
    /// any voter updates.
    fn run_discrete_round(&mut self) {
        let Self {
            voters,
            adjacency,
            edges,
            rng,
            config,
            ..
        } = self;
        let rule = config.voting_rule;

        if rule == VotingRule::SingleNeighbor {
            for (i, neighbors) in adjacency.iter().enumerate() {
                if let Some(&j) = neighbors.choose(rng) {
                    let vote = voters[j].belief();
                    voters[i].receive(vote);
                }
            }
        } else {
            for &(a, b) in edges.iter() {
                let (belief_a, belief_b) = (voters[a].belief(), voters[b].belief());
                voters[a].receive(belief_b);
                voters[b].receive(belief_a);
            }
        }

        for voter in voters.values_mut() {
            voter.update(rule, rng);
        }
    }

    /// Asynchronous round: one uniformly chosen voter pushes its belief.
    ///
    /// The waking voter never updates. Recipients update immediately on the
    /// single vote they received.
    fn run_wake_event(&mut self) {
        let Self {
            voters,
            adjacency,
            rng,
            config,
            ..
        } = self;
        let rule = config.voting_rule;

        let waker = rng.gen_range(0..voters.len());
        let vote = voters[waker].belief();
        let neighbors = &adjacency[waker];

        let mut push = |target: usize, rng: &mut R| {
            voters[target].receive(vote);
            voters[target].update(rule, rng)
        };

        let changed = if rule == VotingRule::SingleNeighbor {
            match neighbors.choose(rng) {
                Some(&target) => usize::from(push(target, rng)),
                None => 0,
            }
        } else {
            neighbors
                .iter()
                .filter(|&&target| push(target, rng))
                .count()
        };

        trace!(waker, degree = neighbors.len(), changed, "Wake event");
    }

    /// Belief ids in node order.
    pub fn snapshot(&self) -> Vec<BeliefId> {
        self.voters.values().map(|v| v.belief().id).collect()
    }

    /// Current belief of every voter, keyed by node.
    pub fn beliefs(&self) -> impl Iterator<Item = (NodeId, BeliefState)> + '_ {
        self.voters.iter().map(|(&node, v)| (node, v.belief()))
    }

    /// Current belief of one voter.
    pub fn belief(&self, node: NodeId) -> Option<BeliefState> {
        self.voters.get(&node).map(Voter::belief)
    }

    /// Look up one voter.
    pub fn voter(&self, node: NodeId) -> Option<&Voter> {
        self.voters.get(&node)
    }

    /// All voters in node order.
    pub fn voters(&self) -> impl Iterator<Item = &Voter> + '_ {
        self.voters.values()
    }

    /// Number of voters (zero before initialization).
    pub fn num_voters(&self) -> usize {
        self.voters.len()
    }

    /// Check if a population exists.
    pub fn is_initialized(&self) -> bool {
        !self.voters.is_empty()
    }

    /// Rounds run since the last initialization.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The graph being simulated.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// The validated configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tracing_test::traced_test;
    use voter_test_helpers::{
        beliefs, isolated_graph, seeded_rng, star_graph, two_node_graph, DEFAULT_SEED,
    };
    use voter_types::StaticGraph;

    fn config(rule: VotingRule, clock: ClockModel) -> ModelConfig {
        ModelConfig::new(rule, clock).with_seed(DEFAULT_SEED)
    }

    #[test]
    fn test_step_before_initialize_fails() {
        let graph = two_node_graph();
        let mut model = VoterModel::new(&graph, ModelConfig::default()).unwrap();
        assert_eq!(model.step(), Err(ModelError::NotInitialized));
    }

    #[test]
    fn test_rejects_bad_config_at_construction() {
        let graph = two_node_graph();
        let result = VoterModel::new(&graph, ModelConfig::default().with_num_beliefs(5));
        assert!(matches!(
            result,
            Err(ModelError::Config(ConfigError::UnsupportedBeliefCount { .. }))
        ));

        let empty = StaticGraph::empty(0);
        assert!(matches!(
            VoterModel::new(&empty, ModelConfig::default()),
            Err(ModelError::Config(ConfigError::EmptyGraph))
        ));
    }

    #[test]
    fn test_initialize_rejects_bad_split() {
        let graph = two_node_graph();
        let mut model = VoterModel::new(&graph, ModelConfig::default()).unwrap();
        assert_eq!(
            model.initialize(InitStrategy::split(3)),
            Err(ModelError::Config(ConfigError::InvalidSplit {
                split: 3,
                voters: 2
            }))
        );
    }

    #[test]
    #[traced_test]
    fn test_population_matches_graph() {
        let graph = StaticGraph::cycle(8);
        let mut model = VoterModel::new(&graph, ModelConfig::default()).unwrap();
        model.initialize(InitStrategy::AllRand).unwrap();

        let keys: Vec<NodeId> = model.voters().map(Voter::id).collect();
        assert_eq!(keys, graph.nodes());
        assert!(model.voters().all(|v| v.degree() == 2));
        assert!(model.voters().all(|v| v.belief().strength == 1.0));
        assert!(model.voters().all(|v| v.inbox().is_empty()));
        assert!(logs_contain("Initialized voter population"));

        model.step().unwrap();
        model.initialize(InitStrategy::AllUnique).unwrap();
        assert_eq!(model.round(), 0);
        assert_eq!(model.snapshot(), beliefs(&[1, 2, 3, 4, 5, 6, 7, 8]));
    }

    #[test]
    fn test_discrete_round_is_simultaneous() {
        let graph = two_node_graph();
        for rule in [VotingRule::Simple, VotingRule::SingleNeighbor] {
            let mut model = VoterModel::new(&graph, config(rule, ClockModel::Discrete)).unwrap();
            model.initialize(InitStrategy::split(1)).unwrap();

            let outcome = model.step().unwrap();
            assert_eq!(outcome.round, 1);
            assert_eq!(outcome.before, beliefs(&[1, 2]));
            assert_eq!(outcome.after, beliefs(&[2, 1]));
            assert_eq!(outcome.elapsed, 1.0);
        }
    }

    #[test]
    fn test_discrete_inboxes_are_empty_after_step() {
        let graph = StaticGraph::complete(6);
        let mut model =
            VoterModel::new(&graph, config(VotingRule::Probability, ClockModel::Discrete)).unwrap();
        model.initialize(InitStrategy::AllRand).unwrap();
        for _ in 0..5 {
            model.step().unwrap();
            assert!(model.voters().all(|v| v.inbox().is_empty()));
        }
    }

    #[test]
    fn test_unanimity_is_stable_for_every_rule_and_clock() {
        let graph = StaticGraph::complete(5);
        for rule in VotingRule::ALL {
            for clock in ClockModel::ALL {
                let mut model = VoterModel::new(&graph, config(rule, clock)).unwrap();
                model.initialize(InitStrategy::split(5)).unwrap();
                for _ in 0..20 {
                    let outcome = model.step().unwrap();
                    assert_eq!(outcome.after, beliefs(&[1, 1, 1, 1, 1]), "{rule} / {clock}");
                }
            }
        }
    }

    #[test]
    fn test_exponential_push_reaches_consensus_on_pair() {
        let graph = two_node_graph();
        for rule in [VotingRule::Simple, VotingRule::SingleNeighbor] {
            let mut model = VoterModel::new(&graph, config(rule, ClockModel::Exponential)).unwrap();
            model.initialize(InitStrategy::split(1)).unwrap();

            let outcome = model.step().unwrap();
            assert!(outcome.elapsed > 0.0);
            // The receiver ties 1-vs-1 and adopts the pushed belief.
            assert_eq!(outcome.after[0], outcome.after[1]);
            assert_eq!(
                outcome.before.iter().zip(&outcome.after).filter(|(a, b)| a != b).count(),
                1
            );
        }
    }

    #[test]
    fn test_exponential_single_neighbor_changes_at_most_one_voter() {
        let graph = StaticGraph::complete(10);
        let mut model =
            VoterModel::new(&graph, config(VotingRule::SingleNeighbor, ClockModel::Exponential))
                .unwrap();
        model.initialize(InitStrategy::AllUnique).unwrap();
        for _ in 0..100 {
            let outcome = model.step().unwrap();
            let flux = outcome
                .before
                .iter()
                .zip(&outcome.after)
                .filter(|(a, b)| a != b)
                .count();
            assert!(flux <= 1);
        }
    }

    #[test]
    fn test_exponential_waker_never_updates() {
        // Hub holds belief 1, every leaf belief 2. A leaf waking pushes to the hub
        // only; the hub waking converts every leaf. The hub only changes when a
        // leaf wakes, and leaves only change when the hub wakes.
        let graph = star_graph(4);
        let mut model =
            VoterModel::new(&graph, config(VotingRule::Simple, ClockModel::Exponential)).unwrap();
        model.initialize(InitStrategy::split(1)).unwrap();

        let outcome = model.step().unwrap();
        let hub_changed = outcome.before[0] != outcome.after[0];
        let leaves_changed = (1..5).any(|i| outcome.before[i] != outcome.after[i]);
        assert!(hub_changed ^ leaves_changed);
    }

    #[test]
    fn test_isolated_voters_are_noops() {
        let graph = isolated_graph(4);
        for clock in ClockModel::ALL {
            let mut model = VoterModel::new(&graph, config(VotingRule::Simple, clock)).unwrap();
            model.initialize(InitStrategy::AllUnique).unwrap();
            for _ in 0..10 {
                let outcome = model.step().unwrap();
                assert_eq!(outcome.before, outcome.after);
            }
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let graph = StaticGraph::cycle(12);
        let run = |seed: u64| {
            let config =
                ModelConfig::new(VotingRule::WeightedProbability, ClockModel::Exponential)
                    .with_seed(seed);
            let mut model = VoterModel::new(&graph, config).unwrap();
            model.initialize(InitStrategy::AllRand).unwrap();
            (0..50)
                .map(|_| model.step().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_injected_rng() {
        let graph = StaticGraph::complete(4);
        let mut model = VoterModel::with_rng(
            &graph,
            config(VotingRule::Simple, ClockModel::Exponential),
            seeded_rng(99),
        )
        .unwrap();
        model.initialize(InitStrategy::RandPair).unwrap();

        let held: BTreeSet<BeliefId> = model.snapshot().into_iter().collect();
        assert_eq!(held, beliefs(&[0, 1, 2]).into_iter().collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_weighted_strength_never_drops_while_belief_is_kept() {
        let graph = StaticGraph::complete(8);
        let mut model =
            VoterModel::new(&graph, config(VotingRule::WeightedProbability, ClockModel::Discrete))
                .unwrap();
        model.initialize(InitStrategy::AllRand).unwrap();

        let mut previous: Vec<BeliefState> = model.beliefs().map(|(_, b)| b).collect();
        for _ in 0..30 {
            model.step().unwrap();
            let current: Vec<BeliefState> = model.beliefs().map(|(_, b)| b).collect();
            for (before, after) in previous.iter().zip(&current) {
                assert!((0.0..=1.0).contains(&after.strength));
                if !before.is_neutral() && before.id == after.id {
                    assert!(after.strength >= before.strength);
                }
            }
            previous = current;
        }
    }
}
