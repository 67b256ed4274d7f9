use ndarray::{ArrayView1, ArrayViewMut1};

use super::Optimizer;
use crate::{MlErr, Result};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    ///
    /// # Errors
    /// `MlErr::InvalidHyperparameter` if the learning rate isn't positive and finite.
    pub fn new(learning_rate: f32) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate > 0.) {
            return Err(MlErr::InvalidHyperparameter {
                name: "learning_rate",
                value: learning_rate,
            });
        }

        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Updates the parameters according to the algorithm's learning rule, that is, making a step in
    /// the opposite direction of the gradient, with a length of `learning_rate`.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient used for taking the step.
    fn update_params(&mut self, mut params: ArrayViewMut1<f32>, grad: ArrayView1<f32>) {
        params.scaled_add(-self.learning_rate, &grad);
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut params = array![1., 2., 3.];
        let grad = array![10., -10., 0.];

        let mut optimizer = GradientDescent::new(0.5).unwrap();
        assert_eq!(optimizer.learning_rate(), 0.5);
        optimizer.update_params(params.view_mut(), grad.view());

        assert_eq!(params, array![-4., 7., 3.]);
    }

    #[test]
    fn rejects_invalid_learning_rates() {
        for lr in [0., -0.1, f32::NAN, f32::INFINITY] {
            assert!(GradientDescent::new(lr).is_err(), "accepted {lr}");
        }
    }
}
