use std::fmt;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{MlErr, Result};

/// A binary class label, following the `{0, 1}` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Returns the numeric value of the label, `0.` or `1.`.
    pub fn value(self) -> f32 {
        match self {
            Label::Negative => 0.,
            Label::Positive => 1.,
        }
    }
}

impl From<bool> for Label {
    fn from(positive: bool) -> Self {
        if positive {
            Label::Positive
        } else {
            Label::Negative
        }
    }
}

impl TryFrom<f32> for Label {
    type Error = MlErr;

    fn try_from(value: f32) -> Result<Self> {
        if value == 0. {
            Ok(Label::Negative)
        } else if value == 1. {
            Ok(Label::Positive)
        } else {
            Err(MlErr::InvalidLabel(value))
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A single supervised sample: a feature vector paired with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    features: Vec<f32>,
    label: Label,
}

impl Sample {
    /// Creates a new `Sample`.
    ///
    /// # Arguments
    /// * `features` - The feature vector.
    /// * `label` - The class the features belong to.
    pub fn new(features: Vec<f32>, label: Label) -> Self {
        Self { features, label }
    }

    pub fn features(&self) -> &[f32] {
        &self.features
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn dim(&self) -> usize {
        self.features.len()
    }
}

/// An ordered, in-memory training set laid out as a feature matrix (one row per sample) and
/// a label vector.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<f32>,
}

impl Dataset {
    /// Builds a `Dataset` out of a sequence of samples.
    ///
    /// # Arguments
    /// * `samples` - The samples, all of them with the same dimensionality.
    ///
    /// # Errors
    /// * `MlErr::EmptyDataset` if there are no samples.
    /// * `MlErr::SizeMismatch` if any feature vector differs in length from the first one.
    pub fn new(samples: &[Sample]) -> Result<Self> {
        let first = samples.first().ok_or(MlErr::EmptyDataset)?;
        let dim = first.dim();

        let mut data = Vec::with_capacity(samples.len() * dim);
        let mut labels = Vec::with_capacity(samples.len());

        for sample in samples {
            if sample.dim() != dim {
                return Err(MlErr::SizeMismatch {
                    what: "sample features",
                    got: sample.dim(),
                    expected: dim,
                });
            }

            data.extend_from_slice(sample.features());
            labels.push(sample.label().value());
        }

        let x = Array2::from_shape_vec((samples.len(), dim), data)?;
        let y = Array1::from_vec(labels);
        Ok(Self { x, y })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of every feature vector.
    pub fn dim(&self) -> usize {
        self.x.ncols()
    }

    /// The feature matrix, shaped `(len, dim)`.
    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    /// The labels as `0.`/`1.` values.
    pub fn y(&self) -> ArrayView1<'_, f32> {
        self.y.view()
    }
}
