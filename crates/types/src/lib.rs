//! Core value types for the voter model.
//!
//! Everything here is plain data: identifiers, the per-voter belief state, and
//! the read-only graph the simulation runs over.

mod belief;
mod graph;
mod identifiers;

pub use belief::BeliefState;
pub use graph::{Graph, GraphError, StaticGraph};
pub use identifiers::{BeliefId, NodeId};
