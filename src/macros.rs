/// A macro to create a new `DenseLayer`.
///
/// # Examples
///
/// ```
/// use polecart::activations::Activation;
/// use polecart::create_layer;
/// let layer = create_layer!(4, 32, Activation::Relu);
/// assert_eq!(layer.output_size(), 32);
/// ```
#[macro_export]
macro_rules! create_layer {
    ($input_size:expr, $output_size:expr, $activation:expr) => {
        $crate::layers::DenseLayer::new($input_size, $output_size, $activation)
    };
}

/// A macro to create a new `NeuralNetwork` from `(input, output, activation)`
/// triples, one per layer.
///
/// # Examples
///
/// ```
/// use polecart::activations::Activation;
/// use polecart::create_network;
/// use polecart::network::ValueEstimator;
/// let network = create_network!(
///     (16, 32, Activation::Relu),
///     (32, 2, Activation::Linear)
/// );
/// assert_eq!(network.num_actions(), 2);
/// ```
#[macro_export]
macro_rules! create_network {
    ($( ($input_size:expr, $output_size:expr, $activation:expr) ),+ $(,)?) => {
        {
            let layers = vec![$( $crate::layers::DenseLayer::new($input_size, $output_size, $activation) ),+];
            $crate::network::NeuralNetwork { layers }
        }
    }
}
