//! Policy-gradient route learning.
//!
//! This module exports the neural components, the decision agent and the
//! training loop.

pub mod encoder;
pub mod policy;
pub mod agent;
pub mod memory;
pub mod baseline;
pub mod checkpoint;
pub mod trainer;

pub use encoder::{encode_features, feature_dim, InstanceEncoder};
pub use policy::PolicyNetwork;
pub use agent::{AgentModel, Decoding, DecisionAgent, EpisodeState};
pub use memory::{EliteEntry, EliteMemory};
pub use baseline::RewardBaseline;
pub use checkpoint::TrainingCheckpoint;
pub use trainer::{PolicyState, Solver, TrainingSession};
