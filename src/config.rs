use std::{fs, num::NonZeroUsize, path::Path, path::PathBuf};

use anyhow::{bail, ensure, Context, Result};
use embeddings::{corpus::DEFAULT_TEXT_FIELD, Word2VecConfig};
use serde::{Deserialize, Serialize};

/// Everything the walkthrough needs. Every field is optional in the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotebookConfig {
    pub perceptron: PerceptronConfig,
    pub embeddings: EmbeddingsConfig,
}

impl NotebookConfig {
    /// Reads and validates a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.perceptron.validate().context("perceptron")?;
        self.embeddings.validate().context("embeddings")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerceptronConfig {
    /// Seeds both the synthetic data and the initial weights.
    pub seed: u64,
    pub samples: usize,
    pub features: usize,
    pub learning_rate: f32,
    pub epochs: NonZeroUsize,
    /// Normal of the separating hyperplane, all ones when missing.
    pub normal: Option<Vec<f32>>,
    /// Minimum distance from every sample to the hyperplane.
    pub margin: f32,
    /// Points classified with the trained weights.
    pub probes: Vec<Vec<f32>>,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            samples: 100,
            features: 2,
            learning_rate: 0.01,
            epochs: NonZeroUsize::new(1000).unwrap_or(NonZeroUsize::MIN),
            normal: None,
            margin: 0.1,
            probes: vec![vec![0.8, 0.6], vec![-0.5, -0.9], vec![0.9, -0.2]],
        }
    }
}

impl PerceptronConfig {
    /// The hyperplane normal the samples are generated around.
    pub fn normal(&self) -> Vec<f32> {
        self.normal
            .clone()
            .unwrap_or_else(|| vec![1.; self.features])
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.samples > 0, "samples must be greater than 0");
        ensure!(self.features > 0, "features must be greater than 0");
        ensure!(
            self.learning_rate.is_finite() && self.learning_rate > 0.,
            "learning_rate must be positive and finite, got {}",
            self.learning_rate
        );
        ensure!(
            (0. ..1.).contains(&self.margin),
            "margin must be in [0, 1), got {}",
            self.margin
        );

        if let Some(normal) = &self.normal {
            ensure!(
                normal.len() == self.features,
                "normal has {} components but there are {} features",
                normal.len(),
                self.features
            );
        }

        for (i, probe) in self.probes.iter().enumerate() {
            if probe.len() != self.features {
                bail!(
                    "probe {i} has {} components but there are {} features",
                    probe.len(),
                    self.features
                );
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingsConfig {
    /// JSON lines review file. The embeddings section is skipped without it.
    pub corpus: Option<PathBuf>,
    pub text_field: String,
    /// Maximum amount of records read from the corpus.
    pub limit: Option<usize>,
    pub word2vec: Word2VecConfig,
    /// Where the trained vectors are saved and reloaded from.
    pub output: PathBuf,
    pub queries: Vec<QueryConfig>,
    /// A pre-trained model in word2vec text format.
    pub pretrained: Option<PathBuf>,
    pub pretrained_queries: Vec<QueryConfig>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            corpus: None,
            text_field: DEFAULT_TEXT_FIELD.to_string(),
            limit: None,
            word2vec: Word2VecConfig::default(),
            output: PathBuf::from("word_vectors.safetensors"),
            queries: Vec::new(),
            pretrained: None,
            pretrained_queries: Vec::new(),
        }
    }
}

impl EmbeddingsConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.text_field.is_empty(), "text_field can't be empty");
        self.word2vec.validate()?;

        for query in self.queries.iter().chain(&self.pretrained_queries) {
            query.validate()?;
        }

        Ok(())
    }
}

/// A `most_similar` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default = "default_topn")]
    pub topn: usize,
}

fn default_topn() -> usize {
    10
}

impl QueryConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !(self.positive.is_empty() && self.negative.is_empty()),
            "queries need at least one positive or negative token"
        );
        Ok(())
    }
}
