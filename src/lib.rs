//! A guided tour of neural network fundamentals: a sigmoid perceptron fitted to synthetic data,
//! then word embeddings learned from a review corpus and queried by vector arithmetic.

pub mod config;
pub mod walkthrough;
