use ndarray::{Array2, Array1};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use serde::{Serialize, Deserialize};

use crate::error::{DqnError, Result};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// `U(-1/sqrt(fan_in), 1/sqrt(fan_in))` for weights and biases
    #[default]
    FanInUniform,

    /// He/Kaiming uniform initialization (for ReLU), zero biases
    HeUniform,

    /// Uniform distribution with custom range, zero biases. Both bounds must
    /// be finite; build it with [`WeightInit::uniform`] to have that checked.
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Checked `Uniform { min, max }`.
    pub fn uniform(min: f32, max: f32) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(DqnError::invalid_parameter("uniform range", "bounds must be finite"));
        }
        if min > max {
            return Err(DqnError::invalid_parameter("uniform range", "min must not exceed max"));
        }
        Ok(WeightInit::Uniform { min, max })
    }

    /// Initialize a `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights(&self, shape: (usize, usize)) -> Array2<f32> {
        let (fan_in, _) = shape;

        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array2::random(shape, Uniform::new_inclusive(-limit, limit))
            }

            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in.max(1) as f32).sqrt();
                Array2::random(shape, Uniform::new_inclusive(-limit, limit))
            }

            WeightInit::Uniform { min, max } => {
                // Swapped bounds describe the same interval
                let (low, high) = if min <= max { (*min, *max) } else { (*max, *min) };
                Array2::random(shape, Uniform::new_inclusive(low, high))
            }

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize the biases of a layer with `fan_in` inputs
    pub fn initialize_biases(&self, fan_in: usize, size: usize) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array1::random(size, Uniform::new_inclusive(-limit, limit))
            }
            WeightInit::HeUniform | WeightInit::Uniform { .. } | WeightInit::Zeros => {
                Array1::zeros(size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_in_uniform_bounds() {
        let w = WeightInit::FanInUniform.initialize_weights((16, 8));
        let b = WeightInit::FanInUniform.initialize_biases(16, 8);
        assert!(w.iter().chain(b.iter()).all(|v| v.abs() <= 0.25));
    }

    #[test]
    fn test_uniform_range_is_checked() {
        assert!(matches!(WeightInit::uniform(0.3, 0.2), Err(DqnError::InvalidParameter { .. })));
        assert!(matches!(WeightInit::uniform(f32::NAN, 0.2), Err(DqnError::InvalidParameter { .. })));
        assert!(WeightInit::uniform(0.5, f32::INFINITY).is_err());

        let init = WeightInit::uniform(0.2, 0.2).unwrap();
        assert!(init.initialize_weights((2, 2)).iter().all(|&v| v == 0.2));
    }

    #[test]
    fn test_swapped_uniform_bounds_do_not_panic() {
        let w = WeightInit::Uniform { min: 0.3, max: 0.2 }.initialize_weights((4, 4));
        assert!(w.iter().all(|&v| (0.2..=0.3).contains(&v)));
    }

    #[test]
    fn test_zeros() {
        let w = WeightInit::Zeros.initialize_weights((3, 2));
        assert!(w.iter().all(|&v| v == 0.0));
        assert_eq!(WeightInit::Zeros.initialize_biases(3, 2).len(), 2);
    }
}
