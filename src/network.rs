use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{DqnError, Result};
use crate::layers::{DenseLayer, LayerCache, WeightInit};
use crate::optimizer::{Optimizer, OptimizerWrapper};

/// Capability shared by the policy and the target network: map a batch of
/// flattened observations to per-action value estimates, and expose a full
/// parameter snapshot for synchronization and checkpointing.
pub trait ValueEstimator {
    /// `(batch, input_size)` in, `(batch, num_actions)` out.
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32>;

    fn input_size(&self) -> usize;

    fn num_actions(&self) -> usize;

    /// Deep copy of every parameter.
    fn parameters(&self) -> ParameterSnapshot;

    /// Overwrite every parameter. Fails if the snapshot has a different structure.
    fn set_parameters(&mut self, snapshot: &ParameterSnapshot) -> Result<()>;
}

/// Weights and biases of one dense layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerParameters {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

/// An owned copy of all network parameters, layer by layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ParameterSnapshot {
    pub layers: Vec<LayerParameters>,
}

impl ParameterSnapshot {
    /// All parameters in layer order, weights (row-major) before biases.
    pub fn flatten(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights.iter().chain(layer.biases.iter()).copied())
            .collect()
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }
}

/// Per-layer gradients of the loss with respect to the policy parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradients {
    pub layers: Vec<LayerParameters>,
}

impl Gradients {
    /// Largest absolute gradient component.
    pub fn max_abs(&self) -> f32 {
        self.layers
            .iter()
            .flat_map(|g| g.weights.iter().chain(g.biases.iter()))
            .fold(0.0_f32, |max, &g| max.max(g.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .flat_map(|g| g.weights.iter().chain(g.biases.iter()))
            .all(|g| g.is_finite())
    }
}

/// A fully connected Q-network: ReLU hidden layers and a linear output layer
/// with one unit per action.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations.
    pub fn new(layer_sizes: &[usize], activations: &[Activation]) -> Self {
        Self::new_with_init(layer_sizes, activations, WeightInit::default())
    }

    pub fn new_with_init(layer_sizes: &[usize], activations: &[Activation], init: WeightInit) -> Self {
        assert_eq!(layer_sizes.len() - 1, activations.len());

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new_with_init(window[0], window[1], activation, init))
            .collect::<Vec<_>>();

        NeuralNetwork { layers }
    }

    /// Q-network from an input size, hidden widths and the number of actions.
    pub fn q_network(input_size: usize, hidden: &[usize], num_actions: usize) -> Result<Self> {
        if input_size == 0 || num_actions == 0 || hidden.iter().any(|&h| h == 0) {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "every layer must have at least one unit",
            ));
        }

        let mut layer_sizes = Vec::with_capacity(hidden.len() + 2);
        layer_sizes.push(input_size);
        layer_sizes.extend_from_slice(hidden);
        layer_sizes.push(num_actions);

        let mut activations = vec![Activation::Relu; layer_sizes.len() - 2];
        activations.push(Activation::Linear);

        Ok(Self::new(&layer_sizes, &activations))
    }

    /// Forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.index_axis_move(Axis(0), 0)
    }

    /// Forward pass for a batch of input vectors.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Forward pass that keeps per-layer caches for `backward`.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, Vec<LayerCache>) {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_cached(current_output.view());
            caches.push(cache);
            current_output = output;
        }
        (current_output, caches)
    }

    /// Backpropagate `output_errors` (dLoss/dOutput) through the network.
    pub fn backward(&self, caches: &[LayerCache], output_errors: ArrayView2<f32>) -> Gradients {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (layer, cache) in self.layers.iter().zip(caches.iter()).rev() {
            let (input_error, weight_gradients, bias_gradients) = layer.backward_batch(cache, current_error.view());
            gradients.push(LayerParameters {
                weights: weight_gradients,
                biases: bias_gradients,
            });
            current_error = input_error;
        }

        gradients.reverse();
        Gradients { layers: gradients }
    }

    /// Apply one optimizer update with precomputed gradients.
    pub fn apply_gradients(&mut self, gradients: &Gradients, optimizer: &mut OptimizerWrapper, learning_rate: f32) {
        for (index, (layer, grads)) in self.layers.iter_mut().zip(gradients.layers.iter()).enumerate() {
            optimizer.update_weights(index, &mut layer.weights, &grads.weights, learning_rate);
            optimizer.update_biases(index, &mut layer.biases, &grads.biases, learning_rate);
        }
        optimizer.finish_step();
    }

    fn shape_signature(&self) -> Vec<(usize, usize)> {
        self.layers.iter().map(|l| l.weights.dim()).collect()
    }
}

impl ValueEstimator for NeuralNetwork {
    fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        NeuralNetwork::forward_batch(self, inputs)
    }

    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    fn num_actions(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    fn parameters(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerParameters {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                })
                .collect(),
        }
    }

    fn set_parameters(&mut self, snapshot: &ParameterSnapshot) -> Result<()> {
        let incoming: Vec<(usize, usize)> = snapshot.layers.iter().map(|l| l.weights.dim()).collect();
        let biases_match = snapshot
            .layers
            .iter()
            .zip(self.layers.iter())
            .all(|(s, l)| s.biases.len() == l.biases.len());
        if incoming != self.shape_signature() || !biases_match {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", self.shape_signature()),
                format!("{:?}", incoming),
            ));
        }

        for (layer, params) in self.layers.iter_mut().zip(snapshot.layers.iter()) {
            layer.weights.assign(&params.weights);
            layer.biases.assign(&params.biases);
        }
        Ok(())
    }
}
