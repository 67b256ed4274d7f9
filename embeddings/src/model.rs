use std::path::Path;

use ndarray::ArrayView1;

use crate::{Result, corpus::Corpus};

/// A queryable set of token embeddings.
///
/// This is the whole surface the notebook needs from an embedding library, whatever the
/// implementation behind it.
pub trait EmbeddingModel: Sized {
    /// Loads a model previously written by `save`.
    fn load(path: &Path) -> Result<Self>;

    /// Persists the model so that `load` gives back an equivalent one.
    fn save(&self, path: &Path) -> Result<()>;

    /// The embedding of `token`, if it's part of the vocabulary.
    fn vector(&self, token: &str) -> Option<ArrayView1<'_, f32>>;

    /// Nearest neighbours of `Σ positive - Σ negative`, ranked by cosine similarity.
    ///
    /// # Arguments
    /// * `positive` - Tokens whose vectors are added to the query.
    /// * `negative` - Tokens whose vectors are subtracted from the query.
    /// * `topn` - The maximum amount of results.
    fn most_similar(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>>;
}

/// Builds an `EmbeddingModel` out of raw tokenized text.
pub trait EmbeddingTrainer {
    type Model: EmbeddingModel;

    fn train(&mut self, corpus: &Corpus) -> Result<Self::Model>;
}
