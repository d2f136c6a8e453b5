//! Error types for the simulation engine.

use thiserror::Error;
use voter_core::ConfigError;
use voter_types::NodeId;

/// Errors raised by [`VoterModel`](crate::VoterModel).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// An option was invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// `step()` was called before `initialize()`.
    #[error("voter population has not been initialized")]
    NotInitialized,

    /// The graph listed an edge touching a node it does not contain.
    #[error("edge endpoint {0} is not in the graph's node set")]
    UnknownEdgeEndpoint(NodeId),
}
