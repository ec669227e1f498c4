use ndarray::array;
use crate::activations::Activation;
use crate::layers::DenseLayer;
use crate::network::{Gradients, LayerParameters, NeuralNetwork};
use crate::optimizer::{Adam, GradientClipper, Optimizer, OptimizerWrapper, SGD};

#[test]
fn test_sgd_update_weights() {
    let mut sgd = SGD::new();
    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [0.3, 0.4]];
    let learning_rate = 0.01;

    sgd.update_weights(0, &mut weights, &gradients, learning_rate);

    let expected_weights = array![[0.999, 0.998], [0.997, 0.996]];
    for (w, e) in weights.iter().zip(expected_weights.iter()) {
        assert!((w - e).abs() < 1e-6);
    }
}

#[test]
fn test_sgd_update_biases() {
    let mut sgd = SGD::new();
    let mut biases = array![1.0, 1.0];
    let gradients = array![0.1, 0.2];

    sgd.update_biases(0, &mut biases, &gradients, 0.01);

    assert!((biases[0] - 0.999).abs() < 1e-6);
    assert!((biases[1] - 0.998).abs() < 1e-6);
}

#[test]
fn test_adam_new() {
    let layers = vec![DenseLayer::new(2, 2, Activation::Relu)];
    let adam = Adam::new(&layers, 0.9, 0.999, 1e-8);

    assert_eq!(adam.beta1, 0.9);
    assert_eq!(adam.beta2, 0.999);
    assert_eq!(adam.epsilon, 1e-8);
    assert_eq!(adam.t, 1);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let layers = vec![DenseLayer::new(2, 2, Activation::Relu)];
    let mut adam = Adam::new(&layers, 0.9, 0.999, 1e-8);

    let mut weights = array![[1.0, 1.0], [1.0, 1.0]];
    let gradients = array![[0.1, 0.2], [-0.3, 0.4]];

    adam.update_weights(0, &mut weights, &gradients, 0.01);

    // Bias-corrected first step is lr * sign(g)
    let expected = array![[0.99, 0.99], [1.01, 0.99]];
    for (w, e) in weights.iter().zip(expected.iter()) {
        assert!((w - e).abs() < 1e-4, "{} vs {}", w, e);
    }
}

#[test]
fn test_adam_tracks_layers_separately() {
    let layers = vec![
        DenseLayer::new(2, 3, Activation::Relu),
        DenseLayer::new(3, 1, Activation::Linear),
    ];
    let mut adam = Adam::default(&layers);

    let mut first = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
    let mut second = array![[0.0], [0.0], [0.0]];
    adam.update_weights(0, &mut first, &array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]], 0.1);
    adam.update_weights(1, &mut second, &array![[-1.0], [-1.0], [-1.0]], 0.1);
    adam.finish_step();

    assert_eq!(adam.t, 2);
    assert!(first.iter().all(|&w| w < 0.0));
    assert!(second.iter().all(|&w| w > 0.0));
}

#[test]
fn test_apply_gradients_through_wrapper() {
    let mut network = NeuralNetwork::new(&[2, 1], &[Activation::Linear]);
    let before = network.layers[0].weights.clone();
    let gradients = Gradients {
        layers: vec![LayerParameters {
            weights: array![[1.0], [-1.0]],
            biases: array![0.5],
        }],
    };

    let mut optimizer = OptimizerWrapper::SGD(SGD::new());
    network.apply_gradients(&gradients, &mut optimizer, 0.1);

    assert!((network.layers[0].weights[[0, 0]] - (before[[0, 0]] - 0.1)).abs() < 1e-6);
    assert!((network.layers[0].weights[[1, 0]] - (before[[1, 0]] + 0.1)).abs() < 1e-6);

    let mut adam = OptimizerWrapper::Adam(Adam::default(&network.layers));
    network.apply_gradients(&gradients, &mut adam, 0.1);
    match adam {
        OptimizerWrapper::Adam(adam) => assert_eq!(adam.t, 2),
        OptimizerWrapper::SGD(_) => unreachable!(),
    }
}

#[test]
fn test_gradient_clipper_none_leaves_values() {
    let mut gradients = Gradients {
        layers: vec![LayerParameters {
            weights: array![[10.0, -10.0]],
            biases: array![4.0, -4.0],
        }],
    };
    let original = gradients.clone();
    GradientClipper::None.clip(&mut gradients);
    assert_eq!(gradients, original);

    GradientClipper::by_value(1.0).clip(&mut gradients);
    assert_eq!(gradients.max_abs(), 1.0);
}
