use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Serialize, Deserialize};
use crate::activations::Activation;
use super::initialization::WeightInit;

/// A fully connected (dense) layer in a neural network
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values recorded during a forward pass, needed by `backward_batch`.
#[derive(Clone, Debug)]
pub struct LayerCache {
    pub inputs: Array2<f32>,
    pub pre_activation: Array2<f32>,
}

impl DenseLayer {
    /// Create a new dense layer with the default fan-in uniform initialization.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self::new_with_init(input_size, output_size, activation, WeightInit::default())
    }

    pub fn new_with_init(input_size: usize, output_size: usize, activation: Activation, init: WeightInit) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size)),
            biases: init.initialize_biases(input_size, output_size),
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    /// Forward pass over a batch; does not touch the layer's state.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what the backward pass needs.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, LayerCache) {
        let pre_activation = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let cache = LayerCache {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, cache)
    }

    /// Returns `(error w.r.t. inputs, weight gradients, bias gradients)`.
    pub fn backward_batch(&self, cache: &LayerCache, output_errors: ArrayView2<f32>) -> (Array2<f32>, Array2<f32>, Array1<f32>) {
        let activation_deriv = self.activation.derivative_batch(cache.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = cache.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_error = adjusted_error.dot(&self.weights.t());

        (input_error, weight_gradients, bias_gradients)
    }
}
