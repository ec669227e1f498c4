//! Collaborators of the learning core: the simulated environment and the
//! frame preprocessor that turns its rendering into network input.

mod cartpole;
mod screen;

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::error::Result;
use crate::observation::Frame;

pub use cartpole::{CartPole, CartPoleParams};
pub use screen::ScreenPreprocessor;

/// Outcome of a single environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Raw (non-visual) environment state after the step.
    pub observation: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    /// Diagnostic values; never used for learning.
    pub info: BTreeMap<String, f32>,
}

/// A discrete-action episodic environment.
pub trait Environment {
    /// Start a new episode and return the raw initial state.
    fn reset(&mut self) -> Array1<f32>;

    /// Apply `action`. Fails with `InvalidAction` outside `0..num_actions()`.
    fn step(&mut self, action: usize) -> Result<StepOutcome>;

    fn num_actions(&self) -> usize;
}

/// Environments that can draw their current state as a grayscale grid.
pub trait Render {
    fn render(&self, height: usize, width: usize) -> Frame;
}

/// Produces one normalized frame of fixed shape from an environment.
pub trait FramePreprocessor<E: ?Sized> {
    /// `(height, width)` of every captured frame.
    fn frame_shape(&self) -> (usize, usize);

    fn capture(&mut self, env: &E) -> Result<Frame>;
}
