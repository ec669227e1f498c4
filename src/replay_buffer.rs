use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use std::collections::VecDeque;

use crate::error::{DqnError, Result};
use crate::observation::Observation;

/// One environment step of experience. Never modified once built; the buffer
/// only hands out shared references to stored transitions.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: usize,
    pub next_state: Observation,
    pub reward: f32,
    pub done: bool,
}

/// Fixed-capacity ring buffer of transitions with uniform sampling.
///
/// Insertion order alone decides eviction: once full, every push drops the
/// oldest transition. Each `sample` call draws distinct indices.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    rng: StdRng,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Buffer whose sampling sequence is reproducible.
    pub fn with_seed(capacity: usize, seed: u64) -> Result<Self> {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Result<Self> {
        if capacity == 0 {
            return Err(DqnError::invalid_parameter("capacity", "replay buffer capacity must be positive"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            rng,
        })
    }

    pub fn push(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// `batch_size` distinct transitions chosen uniformly at random.
    ///
    /// Asking for more transitions than are stored is an error; the batch is
    /// never silently truncated.
    pub fn sample(&mut self, batch_size: usize) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(DqnError::InsufficientSamples {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        let indices = index::sample(&mut self.rng, self.buffer.len(), batch_size);
        Ok(indices.iter().map(|i| &self.buffer[i]).collect())
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
