use std::num::NonZeroUsize;

use log::{debug, trace};
use ndarray::Array1;

use crate::{
    MlErr, Result,
    arch::{
        Perceptron,
        loss::{LossFn, SquaredError},
    },
    dataset::{Dataset, Sample},
    optimization::{GradientDescent, Optimizer},
};

/// Trains a `Perceptron` with full batch updates. Contains the relevant components needed for
/// training: the optimizer, the loss function and the amount of epochs.
pub struct PerceptronTrainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    optimizer: O,
    loss_fn: L,
    epochs: NonZeroUsize,
}

impl<O, L> PerceptronTrainer<O, L>
where
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `PerceptronTrainer`.
    ///
    /// # Arguments
    /// * `optimizer` - Dictates how to update the weights on each gradient calculation.
    /// * `loss_fn` - Measures the difference between the predictions and the labels.
    /// * `epochs` - The amount of full passes over the dataset per `train` call.
    pub fn new(optimizer: O, loss_fn: L, epochs: NonZeroUsize) -> Self {
        Self {
            optimizer,
            loss_fn,
            epochs,
        }
    }

    pub fn epochs(&self) -> usize {
        self.epochs.get()
    }

    /// Performs `epochs` epochs of training over `perceptron`, updating its weights in place.
    ///
    /// Each epoch forwards the whole dataset at once, computes the delta of every sample,
    /// accumulates the gradient as `xᵀ · deltas` and takes a single optimizer step. There's no
    /// early stopping, the loop always runs every epoch.
    ///
    /// # Arguments
    /// * `dataset` - The samples to train with.
    /// * `perceptron` - The model whose weights will be fitted.
    ///
    /// # Returns
    /// The loss at the start of each epoch, or an error if the perceptron and the dataset differ
    /// in dimensionality, in which case the weights are left untouched.
    pub fn train(&mut self, dataset: &Dataset, perceptron: &mut Perceptron) -> Result<Vec<f32>> {
        if dataset.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        if perceptron.dim() != dataset.dim() {
            return Err(MlErr::SizeMismatch {
                what: "weights and features",
                got: perceptron.dim(),
                expected: dataset.dim(),
            });
        }

        let epochs = self.epochs.get();
        let (x, y) = (dataset.x(), dataset.y());
        let mut losses = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            let loss_fn = &self.loss_fn;
            let (y_pred, deltas) =
                perceptron.forward_with_deltas(x, |y_pred| loss_fn.loss_prime(y_pred, y))?;

            let loss = loss_fn.loss(y_pred.view(), y);
            trace!("epoch {epoch}: loss {loss}");
            losses.push(loss);

            let grad = x.t().dot(&deltas);
            self.optimizer
                .update_params(perceptron.weights_mut(), grad.view());
        }

        debug!(
            samples = dataset.len(), epochs = epochs;
            "training finished, last loss {}",
            losses.last().copied().unwrap_or_default()
        );

        Ok(losses)
    }
}

/// Fits a weight vector to `samples` with gradient descent over a sigmoid perceptron.
///
/// # Arguments
/// * `samples` - The training set, every feature vector must have the length of `initial_weights`.
/// * `epochs` - The amount of full batch updates to perform.
/// * `learning_rate` - The step length of each update.
/// * `initial_weights` - The starting point of the weights.
///
/// # Returns
/// The final weights.
///
/// # Errors
/// All of them are raised before any update takes place:
/// * `MlErr::EmptyDataset` if `samples` is empty.
/// * `MlErr::SizeMismatch` if any feature vector differs in length from `initial_weights`.
/// * `MlErr::InvalidHyperparameter` if the learning rate isn't positive and finite.
pub fn train(
    samples: &[Sample],
    epochs: NonZeroUsize,
    learning_rate: f32,
    initial_weights: Array1<f32>,
) -> Result<Array1<f32>> {
    let dataset = Dataset::new(samples)?;
    let optimizer = GradientDescent::new(learning_rate)?;

    let mut perceptron = Perceptron::new(initial_weights);
    let mut trainer = PerceptronTrainer::new(optimizer, SquaredError, epochs);
    trainer.train(&dataset, &mut perceptron)?;

    Ok(perceptron.into_weights())
}
