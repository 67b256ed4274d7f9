pub mod activations;
pub mod loss;
mod perceptron;

pub use perceptron::{DECISION_THRESHOLD, Perceptron, classify};
