use ndarray::{Array2, ArrayView2};
use serde::{Serialize, Deserialize};

/// Activation applied after a dense layer's affine transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
}

impl Activation {
    /// Apply the activation to a batch of pre-activations in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Relu => inputs.mapv_inplace(|v| v.max(0.0)),
            Activation::Linear => {}
        }
    }

    /// Derivative with respect to the pre-activation, element-wise.
    pub fn derivative_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Activation::Relu => inputs.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(inputs.dim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_relu_zeroes_negatives() {
        let mut x = array![[-1.0, 0.0, 2.5]];
        Activation::Relu.apply_batch(&mut x);
        assert_eq!(x, array![[0.0, 0.0, 2.5]]);
        assert_eq!(Activation::Relu.derivative_batch(array![[-1.0, 3.0]].view()), array![[0.0, 1.0]]);
    }

    #[test]
    fn test_linear_is_identity() {
        let mut x = array![[-4.0, 7.0]];
        Activation::Linear.apply_batch(&mut x);
        assert_eq!(x, array![[-4.0, 7.0]]);
        assert_eq!(Activation::Linear.derivative_batch(x.view()), array![[1.0, 1.0]]);
    }
}
