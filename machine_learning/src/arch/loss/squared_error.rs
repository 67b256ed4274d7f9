use ndarray::{Array1, ArrayView1};

use super::LossFn;

/// Squared error loss function, `½ Σ (y_pred - y)²`.
///
/// The one half cancels out when differentiating, so the derivative with respect to each
/// prediction is just `y_pred - y`.
#[derive(Default, Clone, Copy)]
pub struct SquaredError;

impl SquaredError {
    /// Returns a new `SquaredError`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for SquaredError {
    fn loss(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> f32 {
        0.5 * (&y_pred - &y).mapv(|x| x.powi(2)).sum()
    }

    fn loss_prime(&self, y_pred: ArrayView1<f32>, y: ArrayView1<f32>) -> Array1<f32> {
        &y_pred - &y
    }
}
