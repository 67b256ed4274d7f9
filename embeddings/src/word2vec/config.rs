use serde::{Deserialize, Serialize};

use crate::{EmbeddingErr, Result};

/// Hyperparameters of the skip-gram trainer. Missing fields take gensim's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Word2VecConfig {
    /// Dimensionality of the word vectors.
    pub vector_size: usize,
    /// Maximum distance between the center and a context token.
    pub window: usize,
    /// Tokens seen fewer times than this are dropped from the vocabulary.
    pub min_count: usize,
    /// Noise tokens drawn per positive pair.
    pub negative: usize,
    pub epochs: usize,
    /// Starting learning rate, linearly decayed towards `min_learning_rate`.
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    pub seed: u64,
}

impl Default for Word2VecConfig {
    fn default() -> Self {
        Self {
            vector_size: 100,
            window: 5,
            min_count: 5,
            negative: 5,
            epochs: 5,
            learning_rate: 0.025,
            min_learning_rate: 0.0001,
            seed: 1,
        }
    }
}

impl Word2VecConfig {
    /// Checks every field is in range.
    ///
    /// # Errors
    /// `EmbeddingErr::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("vector_size", self.vector_size),
            ("window", self.window),
            ("min_count", self.min_count),
            ("negative", self.negative),
            ("epochs", self.epochs),
        ] {
            if value == 0 {
                return Err(EmbeddingErr::InvalidConfig(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return Err(EmbeddingErr::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }

        if !(self.min_learning_rate.is_finite()
            && (0. ..=self.learning_rate).contains(&self.min_learning_rate))
        {
            return Err(EmbeddingErr::InvalidConfig(format!(
                "min_learning_rate must be in [0, {}], got {}",
                self.learning_rate, self.min_learning_rate
            )));
        }

        Ok(())
    }
}
