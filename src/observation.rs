//! Stacked frame observations.
//!
//! An [`Observation`] is a `(depth, height, width)` stack of the most recent
//! preprocessed frames. The shape is fixed for a whole run and checked at every
//! boundary: a frame or observation of the wrong shape is a fatal
//! [`DqnError::DimensionMismatch`], never reshaped or padded.

use std::collections::VecDeque;

use ndarray::{Array2, Array3, Axis};
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// One preprocessed frame, values in `[0, 1]`.
pub type Frame = Array2<f32>;

/// `depth` consecutive frames, oldest first.
pub type Observation = Array3<f32>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationShape {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

impl ObservationShape {
    pub fn new(depth: usize, height: usize, width: usize) -> Self {
        ObservationShape { depth, height, width }
    }

    /// Length of the flattened observation fed to the network.
    pub fn flat_len(&self) -> usize {
        self.depth * self.height * self.width
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        (self.depth, self.height, self.width)
    }

    pub fn check_frame(&self, frame: &Frame) -> Result<()> {
        if frame.dim() != (self.height, self.width) {
            return Err(DqnError::dimension_mismatch(
                format!("frame {:?}", (self.height, self.width)),
                format!("frame {:?}", frame.dim()),
            ));
        }
        Ok(())
    }

    pub fn check(&self, observation: &Observation) -> Result<()> {
        if observation.dim() != self.dim() {
            return Err(DqnError::dimension_mismatch(
                format!("observation {:?}", self.dim()),
                format!("observation {:?}", observation.dim()),
            ));
        }
        Ok(())
    }

    /// All-zero observation, used as the next state of a terminal step.
    pub fn zeros(&self) -> Observation {
        Array3::zeros(self.dim())
    }

    /// Flatten a batch of observations into `(batch, flat_len)` rows.
    pub fn flatten_batch<'a, I>(&self, observations: I) -> Result<Array2<f32>>
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut data = Vec::new();
        let mut rows = 0;
        for observation in observations {
            self.check(observation)?;
            data.extend(observation.iter().copied());
            rows += 1;
        }
        Array2::from_shape_vec((rows, self.flat_len()), data)
            .map_err(|e| DqnError::dimension_mismatch(format!("({}, {})", rows, self.flat_len()), e.to_string()))
    }
}

/// Rolling window of the last `depth` frames.
#[derive(Clone, Debug)]
pub struct FrameStack {
    shape: ObservationShape,
    frames: VecDeque<Frame>,
}

impl FrameStack {
    pub fn new(shape: ObservationShape) -> Self {
        FrameStack {
            shape,
            frames: VecDeque::with_capacity(shape.depth),
        }
    }

    pub fn shape(&self) -> ObservationShape {
        self.shape
    }

    /// Start a new episode: the first frame fills every slot.
    pub fn reset(&mut self, first: Frame) -> Result<Observation> {
        self.shape.check_frame(&first)?;
        self.frames.clear();
        for _ in 0..self.shape.depth {
            self.frames.push_back(first.clone());
        }
        self.observation()
    }

    /// Drop the oldest frame and append `frame`.
    pub fn push(&mut self, frame: Frame) -> Result<Observation> {
        self.shape.check_frame(&frame)?;
        if self.frames.len() == self.shape.depth {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
        self.observation()
    }

    pub fn observation(&self) -> Result<Observation> {
        if self.frames.len() != self.shape.depth {
            return Err(DqnError::dimension_mismatch(
                format!("{} stacked frames", self.shape.depth),
                format!("{} stacked frames", self.frames.len()),
            ));
        }
        let views: Vec<_> = self.frames.iter().map(|f| f.view()).collect();
        ndarray::stack(Axis(0), &views)
            .map_err(|e| DqnError::dimension_mismatch(format!("{:?}", self.shape.dim()), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_repeats_first_frame() {
        let mut stack = FrameStack::new(ObservationShape::new(4, 2, 3));
        let obs = stack.reset(Array2::from_elem((2, 3), 0.5)).unwrap();
        assert_eq!(obs.dim(), (4, 2, 3));
        assert!(obs.iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_push_drops_oldest() {
        let mut stack = FrameStack::new(ObservationShape::new(2, 1, 1));
        stack.reset(Array2::from_elem((1, 1), 0.0)).unwrap();
        stack.push(Array2::from_elem((1, 1), 1.0)).unwrap();
        let obs = stack.push(Array2::from_elem((1, 1), 2.0)).unwrap();
        assert_eq!(obs[[0, 0, 0]], 1.0);
        assert_eq!(obs[[1, 0, 0]], 2.0);
    }

    #[test]
    fn test_wrong_frame_shape_is_rejected() {
        let mut stack = FrameStack::new(ObservationShape::new(4, 2, 3));
        let err = stack.reset(Array2::zeros((3, 2))).unwrap_err();
        assert!(matches!(err, DqnError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_flatten_batch_rejects_wrong_depth() {
        let shape = ObservationShape::new(4, 2, 2);
        let good = shape.zeros();
        let bad = Array3::zeros((3, 2, 2));
        assert_eq!(shape.flatten_batch([&good, &good]).unwrap().dim(), (2, 16));
        assert!(shape.flatten_batch([&good, &bad]).is_err());
    }
}
