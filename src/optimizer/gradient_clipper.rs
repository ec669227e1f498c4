use serde::{Serialize, Deserialize};

use crate::network::Gradients;

/// Gradient clipping methods
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum GradientClipper {
    /// Clamp every gradient component into `[min, max]`
    ClipByValue { min: f32, max: f32 },

    /// No clipping
    None,
}

impl GradientClipper {
    /// Symmetric value clipping into `[-limit, limit]`.
    pub fn by_value(limit: f32) -> Self {
        GradientClipper::ClipByValue { min: -limit, max: limit }
    }

    /// Clip every weight and bias gradient in place.
    pub fn clip(&self, gradients: &mut Gradients) {
        match self {
            GradientClipper::ClipByValue { min, max } => {
                for layer in gradients.layers.iter_mut() {
                    layer.weights.mapv_inplace(|g| g.max(*min).min(*max));
                    layer.biases.mapv_inplace(|g| g.max(*min).min(*max));
                }
            }

            GradientClipper::None => {}
        }
    }
}
