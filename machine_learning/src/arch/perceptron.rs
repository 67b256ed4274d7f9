use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1, Zip};

use super::activations::Sigmoid;
use crate::{
    MlErr, Result,
    dataset::{Dataset, Label},
};

/// Probability above which an input is classified as `Label::Positive`.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// A single sigmoid neuron without a bias term: `p(x) = s(x · w)`.
///
/// Since there's no bias, the decision boundary `x · w = 0` always passes through the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron {
    weights: Array1<f32>,
    activation: Sigmoid,
}

impl Perceptron {
    /// Creates a new `Perceptron` out of its weights.
    pub fn new(weights: Array1<f32>) -> Self {
        Self {
            weights,
            activation: Sigmoid::new(),
        }
    }

    /// Creates a new `Perceptron` with every weight set to zero.
    pub fn zeros(dim: usize) -> Self {
        Self::new(Array1::zeros(dim))
    }

    /// The amount of features this perceptron expects.
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> ArrayView1<'_, f32> {
        self.weights.view()
    }

    pub(crate) fn weights_mut(&mut self) -> ArrayViewMut1<'_, f32> {
        self.weights.view_mut()
    }

    pub fn into_weights(self) -> Array1<f32> {
        self.weights
    }

    /// Makes a forward pass over a whole batch.
    ///
    /// # Arguments
    /// * `x` - The feature matrix, one sample per row.
    ///
    /// # Returns
    /// The probability of each row belonging to the positive class, or an error if the amount
    /// of columns doesn't match the amount of weights.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array1<f32>> {
        self.check_dim(x.ncols())?;

        let activation = self.activation;
        Ok(x.dot(&self.weights).mapv_into(|z| activation.f(z)))
    }

    /// Makes a forward pass and computes the delta of each sample, that is, the derivative of the
    /// loss with respect to the sample's pre-activation: `loss_prime(p) * s'(z)`. The sigmoid
    /// derivative is taken from the already computed prediction as `p * (1 - p)`.
    ///
    /// # Returns
    /// A tuple with the predictions and the deltas.
    pub(crate) fn forward_with_deltas<F>(
        &self,
        x: ArrayView2<f32>,
        loss_prime: F,
    ) -> Result<(Array1<f32>, Array1<f32>)>
    where
        F: FnOnce(ArrayView1<f32>) -> Array1<f32>,
    {
        let y_pred = self.forward(x)?;
        let mut deltas = loss_prime(y_pred.view());

        Zip::from(&mut deltas)
            .and(&y_pred)
            .for_each(|d, &p| *d *= p * (1. - p));

        Ok((y_pred, deltas))
    }

    /// The probability of a single feature vector belonging to the positive class.
    pub fn predict_proba(&self, x: &[f32]) -> Result<f32> {
        self.check_dim(x.len())?;

        let z = ArrayView1::from(x).dot(&self.weights);
        Ok(self.activation.f(z))
    }

    /// Classifies a single feature vector.
    pub fn classify(&self, x: &[f32]) -> Result<Label> {
        let p = self.predict_proba(x)?;
        Ok(Label::from(p > DECISION_THRESHOLD))
    }

    /// The ratio of samples in `dataset` this perceptron classifies correctly.
    pub fn accuracy(&self, dataset: &Dataset) -> Result<f32> {
        let y_pred = self.forward(dataset.x())?;

        let hits = y_pred
            .iter()
            .zip(dataset.y())
            .filter(|&(&p, &y)| Label::from(p > DECISION_THRESHOLD).value() == y)
            .count();

        Ok(hits as f32 / dataset.len() as f32)
    }

    fn check_dim(&self, got: usize) -> Result<()> {
        if got != self.dim() {
            return Err(MlErr::SizeMismatch {
                what: "features and weights",
                got,
                expected: self.dim(),
            });
        }

        Ok(())
    }
}

/// Classifies `x` with the given trained weights: `Label::Positive` when `s(x · w) > 0.5`.
///
/// # Errors
/// `MlErr::SizeMismatch` if `x` and `weights` differ in length.
pub fn classify(weights: ArrayView1<f32>, x: &[f32]) -> Result<Label> {
    Perceptron::new(weights.to_owned()).classify(x)
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::dataset::Sample;

    #[test]
    fn forward_applies_the_sigmoid_to_each_dot_product() {
        let perceptron = Perceptron::new(array![1., -1.]);
        let x = array![[0., 0.], [2., 2.], [1., 0.]];

        let y_pred = perceptron.forward(x.view()).unwrap();

        assert_eq!(y_pred[0], 0.5);
        assert_eq!(y_pred[1], 0.5);
        assert!((y_pred[2] - 0.731_058_6).abs() < 1e-6);
    }

    #[test]
    fn classify_thresholds_at_one_half() {
        let perceptron = Perceptron::new(array![1., -1.]);

        assert_eq!(perceptron.classify(&[1., 0.]).unwrap(), Label::Positive);
        assert_eq!(perceptron.classify(&[0., 1.]).unwrap(), Label::Negative);
        // exactly on the boundary
        assert_eq!(perceptron.classify(&[1., 1.]).unwrap(), Label::Negative);
    }

    #[test]
    fn classify_with_wrong_dimension_fails() {
        let perceptron = Perceptron::zeros(2);

        let err = perceptron.classify(&[1., 2., 3.]).unwrap_err();
        assert!(matches!(
            err,
            MlErr::SizeMismatch {
                got: 3,
                expected: 2,
                ..
            }
        ));

        let x = array![[1.], [2.]];
        assert!(perceptron.forward(x.view()).is_err());
    }

    #[test]
    fn free_classify_matches_the_model() {
        let weights = array![-2., 3.];
        let perceptron = Perceptron::new(weights.clone());

        for x in [[1_f32, 0.], [0., 1.], [3., 1.], [1., 3.]] {
            assert_eq!(
                classify(weights.view(), &x).unwrap(),
                perceptron.classify(&x).unwrap()
            );
        }
    }

    #[test]
    fn deltas_follow_the_sigmoid_derivative() {
        let perceptron = Perceptron::zeros(1);
        let x = array![[1.], [-1.]];

        let (y_pred, deltas) = perceptron
            .forward_with_deltas(x.view(), |p| p.mapv(|p| p - 1.))
            .unwrap();

        assert_eq!(y_pred, array![0.5, 0.5]);
        assert_eq!(deltas, array![-0.125, -0.125]);
    }

    #[test]
    fn accuracy_counts_hits() {
        let perceptron = Perceptron::new(array![1., -1.]);
        let samples = [
            Sample::new(vec![1., 0.], Label::Positive),
            Sample::new(vec![0., 1.], Label::Negative),
            Sample::new(vec![2., 1.], Label::Negative),
            Sample::new(vec![1., 2.], Label::Negative),
        ];
        let dataset = Dataset::new(&samples).unwrap();

        assert_eq!(perceptron.accuracy(&dataset).unwrap(), 0.75);
    }
}
