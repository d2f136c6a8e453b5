//! Graph provider trait and static implementation.
//!
//! The simulation engine only ever reads a graph: a stably ordered node set,
//! per-node degree, and the undirected edge list. Construction lives here so the
//! engine never has to care where a topology came from.

use crate::NodeId;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Read-only view of an undirected simple graph.
pub trait Graph {
    /// All nodes, in a stable order.
    fn nodes(&self) -> &[NodeId];

    /// Number of edges incident to `node`. Unknown nodes have degree 0.
    fn degree(&self, node: NodeId) -> usize;

    /// All undirected edges. No self-loops, no duplicates.
    fn edges(&self) -> &[(NodeId, NodeId)];

    // Derived methods

    /// Number of nodes.
    fn num_nodes(&self) -> usize {
        self.nodes().len()
    }

    /// Number of edges.
    fn num_edges(&self) -> usize {
        self.edges().len()
    }

    /// Check if a node belongs to the graph.
    fn contains(&self, node: NodeId) -> bool {
        self.nodes().contains(&node)
    }

    /// Neighbors of `node`, in edge order.
    ///
    /// This scans the full edge list; callers on a hot path should build an
    /// adjacency index once instead.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges()
            .iter()
            .filter_map(|&(a, b)| {
                if a == node {
                    Some(b)
                } else if b == node {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Errors that can occur when building a graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// The same node was listed twice.
    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),

    /// An edge connects a node to itself.
    #[error("self-loop on {0}")]
    SelfLoop(NodeId),

    /// An edge appears more than once.
    #[error("duplicate edge {0} - {1}")]
    DuplicateEdge(NodeId, NodeId),

    /// An edge references a node outside the node set.
    #[error("edge endpoint {0} is not in the node set")]
    UnknownNode(NodeId),

    /// A generator was given an unusable parameter.
    #[error("invalid {generator} parameter: {reason}")]
    InvalidParameter {
        /// Generator name.
        generator: &'static str,
        /// What was wrong.
        reason: String,
    },
}

/// An immutable graph held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticGraph {
    nodes: Vec<NodeId>,
    degrees: HashMap<NodeId, usize>,
    edges: Vec<(NodeId, NodeId)>,
}

impl StaticGraph {
    /// Build a graph from an explicit node list and edge list.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> Result<Self, GraphError> {
        let nodes: Vec<NodeId> = nodes.into_iter().collect();
        let mut degrees: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());
        for &node in &nodes {
            if degrees.insert(node, 0).is_some() {
                return Err(GraphError::DuplicateNode(node));
            }
        }

        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut edge_list = Vec::new();
        for (a, b) in edges {
            if a == b {
                return Err(GraphError::SelfLoop(a));
            }
            for endpoint in [a, b] {
                if !degrees.contains_key(&endpoint) {
                    return Err(GraphError::UnknownNode(endpoint));
                }
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if !seen.insert(key) {
                return Err(GraphError::DuplicateEdge(a, b));
            }
            *degrees.entry(a).or_insert(0) += 1;
            *degrees.entry(b).or_insert(0) += 1;
            edge_list.push((a, b));
        }

        Ok(Self {
            nodes,
            degrees,
            edges: edge_list,
        })
    }

    /// Nodes `0..n` with no edges.
    pub fn empty(n: u32) -> Self {
        Self {
            nodes: (0..n).map(NodeId).collect(),
            degrees: (0..n).map(|i| (NodeId(i), 0)).collect(),
            edges: Vec::new(),
        }
    }

    /// Complete graph on `n` nodes.
    pub fn complete(n: u32) -> Self {
        let edges = (0..n).flat_map(|i| ((i + 1)..n).map(move |j| (NodeId(i), NodeId(j))));
        Self::from_trusted(n, edges)
    }

    /// Cycle on `n` nodes.
    ///
    /// With fewer than three nodes there is no simple cycle: two nodes get a
    /// single edge and a lone node gets none.
    pub fn cycle(n: u32) -> Self {
        match n {
            0 | 1 => Self::empty(n),
            2 => Self::from_trusted(2, [(NodeId(0), NodeId(1))]),
            _ => Self::from_trusted(n, (0..n).map(|i| (NodeId(i), NodeId((i + 1) % n)))),
        }
    }

    /// Periodic 2D grid with `rows * cols` nodes, labelled row-major.
    pub fn torus_2d(rows: u32, cols: u32) -> Result<Self, GraphError> {
        if rows < 3 || cols < 3 {
            return Err(GraphError::InvalidParameter {
                generator: "torus",
                reason: format!("dimensions must both be at least 3, got {rows}x{cols}"),
            });
        }
        let nodes = rows
            .checked_mul(cols)
            .ok_or_else(|| GraphError::InvalidParameter {
                generator: "torus",
                reason: format!("{rows}x{cols} nodes do not fit in a u32 node id"),
            })?;
        let label = |r: u32, c: u32| NodeId(r * cols + c);
        let mut edges = Vec::with_capacity(nodes as usize * 2);
        for r in 0..rows {
            for c in 0..cols {
                edges.push((label(r, c), label(r, (c + 1) % cols)));
                edges.push((label(r, c), label((r + 1) % rows, c)));
            }
        }
        Ok(Self::from_trusted(nodes, edges))
    }

    /// Erdős–Rényi G(n, p): start from the complete graph and keep each edge
    /// with probability `p`.
    pub fn erdos_renyi(n: u32, p: f64, rng: &mut impl Rng) -> Result<Self, GraphError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(GraphError::InvalidParameter {
                generator: "erdos-renyi",
                reason: format!("edge probability must be in [0, 1], got {p}"),
            });
        }
        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.gen_bool(p) {
                    edges.push((NodeId(i), NodeId(j)));
                }
            }
        }
        Ok(Self::from_trusted(n, edges))
    }

    /// Build from generator output that is simple by construction.
    fn from_trusted(n: u32, edges: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        let mut graph = Self::empty(n);
        for (a, b) in edges {
            *graph.degrees.entry(a).or_insert(0) += 1;
            *graph.degrees.entry(b).or_insert(0) += 1;
            graph.edges.push((a, b));
        }
        graph
    }
}

impl Graph for StaticGraph {
    fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    fn degree(&self, node: NodeId) -> usize {
        self.degrees.get(&node).copied().unwrap_or(0)
    }

    fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    fn contains(&self, node: NodeId) -> bool {
        self.degrees.contains_key(&node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_complete_graph() {
        let graph = StaticGraph::complete(5);
        assert_eq!(graph.num_nodes(), 5);
        assert_eq!(graph.num_edges(), 10);
        for &node in graph.nodes() {
            assert_eq!(graph.degree(node), 4);
        }
    }

    #[test]
    fn test_cycle_graph() {
        let graph = StaticGraph::cycle(6);
        assert_eq!(graph.num_edges(), 6);
        assert!(graph.nodes().iter().all(|&n| graph.degree(n) == 2));
        assert_eq!(graph.neighbors(NodeId(0)), vec![NodeId(1), NodeId(5)]);

        assert_eq!(StaticGraph::cycle(2).num_edges(), 1);
        assert_eq!(StaticGraph::cycle(1).num_edges(), 0);
    }

    #[test]
    fn test_torus_graph() {
        let graph = StaticGraph::torus_2d(3, 4).unwrap();
        assert_eq!(graph.num_nodes(), 12);
        assert_eq!(graph.num_edges(), 24);
        assert!(graph.nodes().iter().all(|&n| graph.degree(n) == 4));

        assert!(matches!(
            StaticGraph::torus_2d(2, 5),
            Err(GraphError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_torus_rejects_oversized_dimensions() {
        assert!(matches!(
            StaticGraph::torus_2d(70_000, 70_000),
            Err(GraphError::InvalidParameter {
                generator: "torus",
                ..
            })
        ));
    }

    #[test]
    fn test_erdos_renyi_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(
            StaticGraph::erdos_renyi(10, 0.0, &mut rng).unwrap().num_edges(),
            0
        );
        assert_eq!(
            StaticGraph::erdos_renyi(10, 1.0, &mut rng).unwrap().num_edges(),
            45
        );
        assert!(StaticGraph::erdos_renyi(10, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_erdos_renyi_is_seeded() {
        let a = StaticGraph::erdos_renyi(30, 0.2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = StaticGraph::erdos_renyi(30, 0.2, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a.edges(), b.edges());
    }

    #[test]
    fn test_from_edges_validation() {
        let nodes = [NodeId(1), NodeId(2), NodeId(3)];

        let graph = StaticGraph::from_edges(nodes, [(NodeId(1), NodeId(2))]).unwrap();
        assert_eq!(graph.degree(NodeId(1)), 1);
        assert_eq!(graph.degree(NodeId(3)), 0);

        assert_eq!(
            StaticGraph::from_edges(nodes, [(NodeId(1), NodeId(1))]).unwrap_err(),
            GraphError::SelfLoop(NodeId(1))
        );
        assert_eq!(
            StaticGraph::from_edges(nodes, [(NodeId(1), NodeId(2)), (NodeId(2), NodeId(1))])
                .unwrap_err(),
            GraphError::DuplicateEdge(NodeId(2), NodeId(1))
        );
        assert_eq!(
            StaticGraph::from_edges(nodes, [(NodeId(1), NodeId(9))]).unwrap_err(),
            GraphError::UnknownNode(NodeId(9))
        );
        assert_eq!(
            StaticGraph::from_edges([NodeId(1), NodeId(1)], Vec::new()).unwrap_err(),
            GraphError::DuplicateNode(NodeId(1))
        );
    }
}
