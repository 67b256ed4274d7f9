use std::{collections::HashMap, path::Path};

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::{EmbeddingErr, Result, model::EmbeddingModel, persistence};

/// An in-memory embedding table: one row of `vectors` per token, in vocabulary order.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVectors {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Array2<f32>,
}

impl WordVectors {
    /// Creates a new `WordVectors`.
    ///
    /// # Arguments
    /// * `tokens` - The vocabulary, its order is kept and used to break ties in queries.
    /// * `vectors` - The embeddings, shaped `(tokens.len(), dim)`.
    ///
    /// # Errors
    /// * `EmbeddingErr::SizeMismatch` if there isn't exactly one row per token.
    /// * `EmbeddingErr::DuplicateToken` if a token appears twice.
    pub fn new(tokens: Vec<String>, vectors: Array2<f32>) -> Result<Self> {
        if tokens.len() != vectors.nrows() {
            return Err(EmbeddingErr::SizeMismatch {
                what: "tokens and vector rows",
                got: vectors.nrows(),
                expected: tokens.len(),
            });
        }

        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), i).is_some() {
                return Err(EmbeddingErr::DuplicateToken(token.clone()));
            }
        }

        Ok(Self {
            tokens,
            index,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Dimensionality of the embeddings.
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// The whole embedding table.
    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    pub fn vector(&self, token: &str) -> Option<ArrayView1<'_, f32>> {
        let &row = self.index.get(token)?;
        Some(self.vectors.row(row))
    }

    /// Cosine similarity between the embeddings of two tokens.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let a = self.lookup(a)?;
        let b = self.lookup(b)?;
        Ok(cosine(self.vectors.row(a), self.vectors.row(b)))
    }

    /// Ranks every token but the queried ones by their cosine similarity to
    /// `Σ positive - Σ negative`.
    ///
    /// Equal scores keep vocabulary order.
    ///
    /// # Errors
    /// * `EmbeddingErr::EmptyQuery` if both `positive` and `negative` are empty.
    /// * `EmbeddingErr::UnknownToken` if any queried token isn't in the vocabulary.
    pub fn most_similar(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        if positive.is_empty() && negative.is_empty() {
            return Err(EmbeddingErr::EmptyQuery);
        }

        let mut query = Array1::<f32>::zeros(self.dim());
        let mut excluded = Vec::with_capacity(positive.len() + negative.len());

        for (tokens, weight) in [(positive, 1.), (negative, -1.)] {
            for token in tokens {
                let row = self.lookup(token)?;
                query.scaled_add(weight, &self.vectors.row(row));
                excluded.push(row);
            }
        }

        let mut ranking: Vec<(usize, f32)> = self
            .vectors
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(i, v)| (i, rank_score(cosine(query.view(), v))))
            .collect();

        // stable, so ties stay in vocabulary order
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking.truncate(topn);

        Ok(ranking
            .into_iter()
            .map(|(i, score)| (self.tokens[i].clone(), score))
            .collect())
    }

    /// Writes the model as a safetensors file.
    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save(self, path)
    }

    /// Reads a model written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        persistence::load(path)
    }

    fn lookup(&self, token: &str) -> Result<usize> {
        self.index
            .get(token)
            .copied()
            .ok_or_else(|| EmbeddingErr::UnknownToken(token.to_string()))
    }
}

impl EmbeddingModel for WordVectors {
    fn load(path: &Path) -> Result<Self> {
        WordVectors::load(path)
    }

    fn save(&self, path: &Path) -> Result<()> {
        WordVectors::save(self, path)
    }

    fn vector(&self, token: &str) -> Option<ArrayView1<'_, f32>> {
        WordVectors::vector(self, token)
    }

    fn most_similar(
        &self,
        positive: &[&str],
        negative: &[&str],
        topn: usize,
    ) -> Result<Vec<(String, f32)>> {
        WordVectors::most_similar(self, positive, negative, topn)
    }
}

/// Cosine similarity, zero whenever any of the vectors is null.
pub fn cosine(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    let norms = a.dot(&a).sqrt() * b.dot(&b).sqrt();
    if norms == 0. {
        return 0.;
    }

    a.dot(&b) / norms
}

/// Makes scores totally ordered the way one would expect: `-0.` equals `0.` and NaNs go last.
fn rank_score(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score + 0.
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn toy() -> WordVectors {
        let tokens = ["king", "queen", "man", "woman", "apple"]
            .map(String::from)
            .to_vec();
        let vectors = array![
            [1., 1., 0.],
            [1., 0., 1.],
            [0., 1., 1.],
            [0., 0., 1.],
            [0., 0., -1.],
        ];

        WordVectors::new(tokens, vectors).unwrap()
    }

    #[test]
    fn two_token_query_ranks_the_other_token() {
        let tokens = vec!["a".to_string(), "b".to_string()];
        let model = WordVectors::new(tokens, array![[1., 0.], [1., 1.]]).unwrap();

        let result = model.most_similar(&["a"], &[], 10).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, "b");
        assert!((result[0].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn ranking_is_descending() {
        let model = toy();
        let result = model.most_similar(&["king"], &[], 10).unwrap();

        let tokens: Vec<_> = result.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tokens, ["queen", "man", "woman", "apple"]);
        assert!(result.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn ties_keep_vocabulary_order() {
        let model = toy();
        // queen and man both score 0.5, woman and apple both score 0
        let result = model.most_similar(&["king"], &[], 10).unwrap();

        assert_eq!(result[0].1, result[1].1);
        assert_eq!(result[2].1, result[3].1);
        assert_eq!(result[2].0, "woman");
        assert_eq!(result[3].0, "apple");
    }

    #[test]
    fn vector_arithmetic() {
        let model = toy();
        // king - man + woman = [1, 0, 0]
        let result = model.most_similar(&["king", "woman"], &["man"], 2).unwrap();

        assert_eq!(result[0].0, "queen");
        assert!((result[0].1 - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(result[1], ("apple".to_string(), 0.));
    }

    #[test]
    fn bad_queries_fail() {
        let model = toy();

        assert!(matches!(
            model.most_similar(&[], &[], 3),
            Err(EmbeddingErr::EmptyQuery)
        ));
        assert!(matches!(
            model.most_similar(&["pear"], &[], 3),
            Err(EmbeddingErr::UnknownToken(t)) if t == "pear"
        ));
    }

    #[test]
    fn topn_truncates() {
        let model = toy();
        assert_eq!(model.most_similar(&["apple"], &[], 2).unwrap().len(), 2);
        assert!(model.most_similar(&["apple"], &[], 0).unwrap().is_empty());
    }

    #[test]
    fn lookups() {
        let model = toy();

        assert!(model.contains("queen"));
        assert!(!model.contains("pear"));
        assert_eq!(model.vector("man").unwrap().to_vec(), [0., 1., 1.]);
        assert!(model.vector("pear").is_none());
    }

    #[test]
    fn invalid_tables_fail() {
        let tokens = vec!["a".to_string(), "a".to_string()];
        assert!(matches!(
            WordVectors::new(tokens, Array2::zeros((2, 3))),
            Err(EmbeddingErr::DuplicateToken(_))
        ));

        let tokens = vec!["a".to_string()];
        assert!(matches!(
            WordVectors::new(tokens, Array2::zeros((2, 3))),
            Err(EmbeddingErr::SizeMismatch { .. })
        ));
    }

    #[test]
    fn null_vectors_have_zero_similarity() {
        let tokens = vec!["a".to_string(), "zero".to_string()];
        let model = WordVectors::new(tokens, array![[1., 2.], [0., 0.]]).unwrap();

        assert_eq!(model.similarity("a", "zero").unwrap(), 0.);
        assert!((model.similarity("a", "a").unwrap() - 1.).abs() < 1e-6);
    }
}
