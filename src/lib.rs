//! # Polecart - Deep Q-Learning for pixel-based cart-pole
//!
//! Polecart trains a Deep Q-Network to balance a pole on a cart, looking only
//! at rendered frames of the system. It provides the learning core (replay
//! buffer, epsilon-greedy selection, Huber-loss learning step against a
//! periodically synchronized target network) together with the pieces needed
//! to run it end to end.
//!
//! ## Key Features
//!
//! - **Replay Buffer**: fixed-capacity ring with uniform sampling without replacement
//! - **DQN Agent**: policy and target networks with explicit snapshot synchronization
//! - **Learning Step**: Huber loss, terminal masking, component-wise gradient clipping, Adam
//! - **Exploration**: linear or exponential epsilon decay over episodes
//! - **Persistence**: episode-keyed parameter snapshots, duration logs and training curves
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use polecart::agent::DqnAgentBuilder;
//! use polecart::checkpoint::CheckpointManager;
//! use polecart::config::TrainConfig;
//! use polecart::env::{CartPole, Environment, ScreenPreprocessor};
//! use polecart::metrics::EpisodeLog;
//! use polecart::replay_buffer::ReplayBuffer;
//! use polecart::trainer::{Trainer, TrainerConfig};
//!
//! let config = TrainConfig::default();
//! let mut env = CartPole::new();
//! let mut preprocessor = ScreenPreprocessor::new(config.frame_height, config.frame_width);
//! let mut agent = DqnAgentBuilder::new(config.observation_shape(), env.num_actions())
//!     .build()
//!     .unwrap();
//! let mut buffer = ReplayBuffer::new(config.replay_capacity).unwrap();
//! let mut log = EpisodeLog::new();
//! let mut persistence = CheckpointManager::new(&config.model_dir, &config.figure_dir);
//!
//! let mut trainer = Trainer::new(TrainerConfig::from(&config));
//! trainer
//!     .train(&mut env, &mut preprocessor, &mut agent, &mut buffer, &mut log, &mut persistence)
//!     .unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Linear)
//! - [`agent`] - DQN agent and exploration schedules
//! - [`checkpoint`] - Saving and loading training artifacts
//! - [`config`] - TOML training configuration
//! - [`env`] - Cart-pole simulation and frame preprocessing
//! - [`error`] - Error types and result handling
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Huber loss
//! - [`metrics`] - Episode duration log
//! - [`network`] - Value-estimator networks and parameter snapshots
//! - [`observation`] - Frame stacking and observation shapes
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`replay_buffer`] - Experience replay
//! - [`trainer`] - Episode driver
//! - [`visualization`] - Text plots and CSV export of training curves

#[macro_use]
pub mod macros;

pub mod activations;
pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod env;
pub mod error;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod observation;
pub mod optimizer;
pub mod replay_buffer;
pub mod trainer;
pub mod visualization;

#[cfg(test)]
mod tests;
