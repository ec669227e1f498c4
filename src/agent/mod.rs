//! # DQN Agent
//!
//! The learning core: epsilon-greedy action selection, the bootstrapped
//! Huber-loss learning step with value clipping of gradients, and target
//! network synchronization.
//!
//! ## Core Concepts
//!
//! - **Policy network**: trained by gradient descent on every learning step
//! - **Target network**: a snapshot of the policy network, refreshed only by
//!   [`DqnAgent::sync_target`]; it provides the bootstrapped next-state values
//! - **Exploration**: an [`EpsilonSchedule`] yields one exploration rate per
//!   episode, never increasing
//! - **Terminal masking**: transitions that ended an episode bootstrap from
//!   exactly zero
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use polecart::agent::{DqnAgentBuilder, EpsilonSchedule};
//! use polecart::observation::ObservationShape;
//! use polecart::replay_buffer::ReplayBuffer;
//!
//! let shape = ObservationShape::new(4, 40, 80);
//! let mut agent = DqnAgentBuilder::new(shape, 2).build().unwrap();
//! let mut buffer = ReplayBuffer::new(10_000).unwrap();
//! let schedule = EpsilonSchedule::linear(0.5, 0.1, 5000);
//!
//! let eps = schedule.value(0);
//! let action = agent.act(&shape.zeros(), eps).unwrap();
//! let _report = agent.learn(&mut buffer, 128).unwrap();
//! ```

mod dqn;
mod epsilon;

pub use dqn::{
    bootstrap_values, gather, ActionNetwork, DqnAgent, DqnAgentBuilder, OptimizerKind, TrainReport,
};
pub use epsilon::EpsilonSchedule;
