//! Shared fixtures for voter-model tests.
//!
//! Everything here is deterministic: graphs are built from fixed edge lists
//! and RNGs are seeded `ChaCha8Rng`s.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use voter_types::{BeliefId, NodeId, StaticGraph};

/// Seed used when a test has no reason to pick its own.
pub const DEFAULT_SEED: u64 = 42;

/// A seeded RNG.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Two nodes joined by one edge.
pub fn two_node_graph() -> StaticGraph {
    path_graph(2)
}

/// Nodes `0..n` in a line.
pub fn path_graph(n: u32) -> StaticGraph {
    edges_to_graph(n, (1..n).map(|i| (i - 1, i)))
}

/// Node 0 joined to `leaves` other nodes.
pub fn star_graph(leaves: u32) -> StaticGraph {
    edges_to_graph(leaves + 1, (1..=leaves).map(|i| (0, i)))
}

/// `n` nodes and no edges.
pub fn isolated_graph(n: u32) -> StaticGraph {
    StaticGraph::empty(n)
}

/// Belief ids from raw values, for building snapshots.
pub fn beliefs(ids: &[u32]) -> Vec<BeliefId> {
    ids.iter().copied().map(BeliefId).collect()
}

fn edges_to_graph(n: u32, edges: impl IntoIterator<Item = (u32, u32)>) -> StaticGraph {
    StaticGraph::from_edges(
        (0..n).map(NodeId),
        edges.into_iter().map(|(a, b)| (NodeId(a), NodeId(b))),
    )
    .expect("fixture graphs are simple")
}
