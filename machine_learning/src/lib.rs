//! A sigmoid perceptron trained with full batch gradient descent, plus the pieces it's built
//! from: activations, loss functions, optimizers, datasets and synthetic data generators.

pub mod arch;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod synthetic;
pub mod training;

pub use arch::{Perceptron, classify};
pub use dataset::{Dataset, Label, Sample};
pub use error::{MlErr, Result};
pub use training::{PerceptronTrainer, train};
