use ndarray::{Array1, ArrayView1};

/// Trait defining the interface for loss functions over one scalar
/// prediction per sample.
pub trait Loss: Send + Sync {
    /// Mean loss over the batch
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32;

    /// Gradient of the mean loss with respect to each prediction
    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Array1<f32>;
}

/// Huber loss (smooth L1): quadratic inside `delta`, linear outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HuberLoss {
    pub delta: f32,
}

impl HuberLoss {
    pub fn new(delta: f32) -> Self {
        HuberLoss { delta }
    }
}

impl Default for HuberLoss {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Loss for HuberLoss {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f32 {
        let diff = &predictions - &targets;
        let batch_size = predictions.len().max(1) as f32;
        diff.mapv(|x| {
            let abs_x = x.abs();
            if abs_x <= self.delta {
                0.5 * x * x
            } else {
                self.delta * abs_x - 0.5 * self.delta * self.delta
            }
        }).sum() / batch_size
    }

    fn gradient(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> Array1<f32> {
        let diff = &predictions - &targets;
        let batch_size = predictions.len().max(1) as f32;
        diff.mapv(|x| {
            if x.abs() <= self.delta {
                x
            } else {
                self.delta * x.signum()
            }
        }) / batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_huber_quadratic_region() {
        let loss = HuberLoss::default();
        let value = loss.compute(array![0.5, 1.0].view(), array![0.0, 1.0].view());
        assert!((value - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_huber_linear_region() {
        let loss = HuberLoss::default();
        // |x| = 3 -> 3 - 0.5
        let value = loss.compute(array![3.0].view(), array![0.0].view());
        assert!((value - 2.5).abs() < 1e-6);
        let grad = loss.gradient(array![3.0, -10.0].view(), array![0.0, 0.0].view());
        assert_eq!(grad, array![0.5, -0.5]);
    }
}
