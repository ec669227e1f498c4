//! # Activation Functions
//!
//! The value estimator only needs two activations: ReLU for hidden layers and
//! the identity for the output layer, which has to produce unbounded Q-values.

pub mod functions;

pub use functions::Activation;
