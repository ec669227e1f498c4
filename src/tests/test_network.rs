use ndarray::{arr1, arr2, array, Array2};
use crate::activations::Activation;
use crate::error::DqnError;
use crate::layers::WeightInit;
use crate::network::{NeuralNetwork, ValueEstimator};

#[test]
fn test_neural_network_creation() {
    let layer_sizes = &[3, 4, 2];
    let activations = &[Activation::Relu, Activation::Linear];
    let network = NeuralNetwork::new(layer_sizes, activations);

    assert_eq!(network.layers.len(), 2);
    assert_eq!(network.layers[0].weights.shape(), [3, 4]);
    assert_eq!(network.layers[0].biases.shape(), [4]);
    assert_eq!(network.layers[1].weights.shape(), [4, 2]);
    assert_eq!(network.layers[1].biases.shape(), [2]);
}

#[test]
fn test_create_network_macro() {
    let network = create_network!(
        (3, 4, Activation::Relu),
        (4, 2, Activation::Linear)
    );
    assert_eq!(network.input_size(), 3);
    assert_eq!(network.num_actions(), 2);

    let layer = create_layer!(4, 2, Activation::Linear);
    assert_eq!(layer.weights.dim(), (4, 2));
}

#[test]
fn test_q_network_shape() {
    let network = NeuralNetwork::q_network(12, &[8, 6], 2).unwrap();
    assert_eq!(network.layers.len(), 3);
    assert_eq!(network.layers[2].activation, Activation::Linear);
    assert_eq!(network.input_size(), 12);
    assert_eq!(network.num_actions(), 2);

    assert!(NeuralNetwork::q_network(12, &[0], 2).is_err());
    assert!(NeuralNetwork::q_network(12, &[8], 0).is_err());
}

#[test]
fn test_forward_pass() {
    let network = NeuralNetwork::new(&[3, 4, 2], &[Activation::Relu, Activation::Linear]);

    let input = arr1(&[1.0, 2.0, 3.0]);
    let output = network.forward(input.view());

    assert_eq!(output.shape(), [2]);
}

#[test]
fn test_forward_batch_matches_single() {
    let network = NeuralNetwork::new(&[3, 4, 2], &[Activation::Relu, Activation::Linear]);

    let inputs = arr2(&[
        [1.0, 2.0, 3.0],
        [4.0, 5.0, 6.0],
    ]);

    let outputs = network.forward_batch(inputs.view());
    assert_eq!(outputs.shape(), [2, 2]);
    for (row, input) in inputs.rows().into_iter().enumerate() {
        let single = network.forward(input);
        for col in 0..2 {
            assert!((single[col] - outputs[[row, col]]).abs() < 1e-5);
        }
    }
}

#[test]
fn test_forward_is_pure() {
    let network = NeuralNetwork::q_network(3, &[5], 2).unwrap();
    let before = network.parameters();
    let inputs = arr2(&[[0.1, 0.2, 0.3]]);

    let first = network.forward_batch(inputs.view());
    let second = network.forward_batch(inputs.view());
    assert_eq!(first, second);
    assert_eq!(network.parameters(), before);
}

#[test]
fn test_backward_matches_finite_differences() {
    let network = NeuralNetwork::new(&[3, 4, 2], &[Activation::Linear, Activation::Linear]);
    let inputs = arr2(&[[0.5, -1.0, 2.0], [1.5, 0.25, -0.5]]);
    let output_errors = arr2(&[[1.0, -2.0], [0.5, 3.0]]);

    // L = sum(outputs * output_errors) so dL/doutputs == output_errors
    let objective = |net: &NeuralNetwork| -> f32 { (net.forward_batch(inputs.view()) * &output_errors).sum() };

    let (_, caches) = network.forward_cached(inputs.view());
    let gradients = network.backward(&caches, output_errors.view());

    let h = 1e-2;
    for (layer, (i, j)) in [(0, (0, 0)), (0, (2, 3)), (1, (3, 1))] {
        let mut plus = network.clone();
        plus.layers[layer].weights[[i, j]] += h;
        let mut minus = network.clone();
        minus.layers[layer].weights[[i, j]] -= h;

        let numeric = (objective(&plus) - objective(&minus)) / (2.0 * h);
        let analytic = gradients.layers[layer].weights[[i, j]];
        assert!((numeric - analytic).abs() < 1e-2, "layer {} ({}, {}): {} vs {}", layer, i, j, numeric, analytic);
    }
}

#[test]
fn test_parameter_snapshot_round_trip() {
    let source = NeuralNetwork::q_network(4, &[3], 2).unwrap();
    let mut dest = NeuralNetwork::new_with_init(&[4, 3, 2], &[Activation::Relu, Activation::Linear], WeightInit::Zeros);

    dest.set_parameters(&source.parameters()).unwrap();
    assert_eq!(dest.parameters(), source.parameters());

    // Snapshot is a deep copy
    let snapshot = source.parameters();
    dest.layers[0].weights[[0, 0]] += 1.0;
    assert_eq!(source.parameters(), snapshot);
}

#[test]
fn test_set_parameters_rejects_other_shapes() {
    let mut network = NeuralNetwork::q_network(4, &[3], 2).unwrap();
    let other = NeuralNetwork::q_network(4, &[5], 2).unwrap();

    let err = network.set_parameters(&other.parameters()).unwrap_err();
    assert!(matches!(err, DqnError::DimensionMismatch { .. }));
}

#[test]
fn test_flatten_order() {
    let layer = crate::layers::DenseLayer::new(2, 1, Activation::Linear)
        .with_weights(array![[1.0], [2.0]])
        .with_biases(array![3.0]);
    let network = NeuralNetwork { layers: vec![layer] };

    let snapshot = network.parameters();
    assert_eq!(snapshot.flatten(), vec![1.0, 2.0, 3.0]);
    assert_eq!(snapshot.num_parameters(), 3);
}

#[test]
fn test_gradients_summaries() {
    let network = NeuralNetwork::new(&[2, 2], &[Activation::Linear]);
    let inputs = arr2(&[[1.0, -3.0]]);
    let (_, caches) = network.forward_cached(inputs.view());
    let gradients = network.backward(&caches, Array2::from_elem((1, 2), 1.0).view());

    assert_eq!(gradients.max_abs(), 3.0);
    assert!(gradients.is_finite());
}
