//! Deterministic voter-model simulation engine.
//!
//! Given the same graph, configuration and seed, the engine produces identical
//! belief trajectories every run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     VoterModel                          │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     Graph (borrowed, read-only)                    │ │
//! │  │     nodes, degrees, edges → adjacency index        │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     voters: IndexMap<NodeId, Voter>                │ │
//! │  │     ClockModel decides who exchanges votes         │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │                             │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │     VotingRule → new beliefs, inboxes cleared      │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod clock;
mod config;
mod error;
mod init;
mod model;

pub use clock::{sample_exponential, ClockModel};
pub use config::ModelConfig;
pub use error::ModelError;
pub use init::InitStrategy;
pub use model::{StepOutcome, VoterModel};
