//! The notebook, section by section.

use std::path::Path;

use anyhow::{Context, Result};
use embeddings::{load_pretrained, Corpus, EmbeddingModel, EmbeddingTrainer, SkipGram};
use log::{info, warn};
use machine_learning::{
    arch::loss::SquaredError, optimization::GradientDescent, synthetic, Dataset, Label,
    Perceptron, PerceptronTrainer,
};
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{EmbeddingsConfig, NotebookConfig, PerceptronConfig, QueryConfig};

/// What the perceptron section produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptronReport {
    pub weights: Array1<f32>,
    /// Loss at the start of every epoch.
    pub losses: Vec<f32>,
    /// Accuracy over the training set.
    pub accuracy: f32,
    pub probes: Vec<(Vec<f32>, Label)>,
}

/// The answer to a single `most_similar` query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub model: &'static str,
    pub query: QueryConfig,
    pub neighbours: Vec<(String, f32)>,
}

/// Runs every configured section.
pub fn run(config: &NotebookConfig) -> Result<()> {
    let report = run_perceptron(&config.perceptron).context("perceptron section")?;
    info!(
        accuracy = report.accuracy;
        "perceptron trained, weights {}", report.weights
    );

    let queries = run_embeddings(&config.embeddings).context("embeddings section")?;
    for report in &queries {
        info!(
            "[{}] +{:?} -{:?}: {:?}",
            report.model, report.query.positive, report.query.negative, report.neighbours
        );
    }

    Ok(())
}

/// Fits a perceptron to a seeded linearly separable set and classifies the probe points.
pub fn run_perceptron(config: &PerceptronConfig) -> Result<PerceptronReport> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let samples =
        synthetic::linearly_separable(&mut rng, config.samples, &config.normal(), config.margin)?;
    let dataset = Dataset::new(&samples)?;

    let initial: Array1<f32> = (0..config.features)
        .map(|_| rng.random_range(-1. ..1.))
        .collect();
    let mut perceptron = Perceptron::new(initial);

    let optimizer = GradientDescent::new(config.learning_rate)?;
    let mut trainer = PerceptronTrainer::new(optimizer, SquaredError::new(), config.epochs);
    let losses = trainer.train(&dataset, &mut perceptron)?;

    let accuracy = perceptron.accuracy(&dataset)?;
    info!(
        samples = dataset.len(), epochs = trainer.epochs(), accuracy = accuracy;
        "fitted the perceptron, final loss {}",
        losses.last().copied().unwrap_or_default()
    );

    let probes = config
        .probes
        .iter()
        .map(|probe| Ok((probe.clone(), perceptron.classify(probe)?)))
        .collect::<Result<Vec<_>>>()?;

    for (probe, label) in &probes {
        info!("{probe:?} classified as {label}");
    }

    Ok(PerceptronReport {
        weights: perceptron.into_weights(),
        losses,
        accuracy,
        probes,
    })
}

/// Trains embeddings on the configured corpus, round trips them through disk and answers the
/// configured queries, then does the same queries over the pre-trained model if there's one.
///
/// # Returns
/// The answers in query order, trained model first.
pub fn run_embeddings(config: &EmbeddingsConfig) -> Result<Vec<QueryReport>> {
    let mut reports = Vec::new();

    if let Some(path) = &config.corpus {
        let corpus = Corpus::open(path, &config.text_field, config.limit)?;
        let mut trainer = SkipGram::new(config.word2vec.clone())?;
        let model = train_and_reload(&mut trainer, &corpus, &config.output)?;

        reports.extend(run_queries(&model, "trained", &config.queries));
    } else {
        info!("no corpus configured, skipping training");
    }

    if let Some(path) = &config.pretrained {
        let model = load_pretrained(path)?;
        reports.extend(run_queries(&model, "pretrained", &config.pretrained_queries));
    }

    Ok(reports)
}

/// Trains a model, saves it to `path` and hands back the copy loaded from there.
fn train_and_reload<T: EmbeddingTrainer>(
    trainer: &mut T,
    corpus: &Corpus,
    path: &Path,
) -> Result<T::Model> {
    let model = trainer.train(corpus)?;
    model
        .save(path)
        .with_context(|| format!("failed to save the model to {}", path.display()))?;

    Ok(<T::Model as EmbeddingModel>::load(path)?)
}

/// Queries with tokens out of the vocabulary are logged and skipped.
fn run_queries<M: EmbeddingModel>(
    model: &M,
    name: &'static str,
    queries: &[QueryConfig],
) -> Vec<QueryReport> {
    queries
        .iter()
        .filter_map(|query| {
            let positive: Vec<&str> = query.positive.iter().map(String::as_str).collect();
            let negative: Vec<&str> = query.negative.iter().map(String::as_str).collect();

            match model.most_similar(&positive, &negative, query.topn) {
                Ok(neighbours) => Some(QueryReport {
                    model: name,
                    query: query.clone(),
                    neighbours,
                }),
                Err(e) => {
                    warn!("skipping query on the {name} model: {e}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use embeddings::{Word2VecConfig, WordVectors};

    use super::*;

    #[test]
    fn default_perceptron_section_separates_the_data() {
        let report = run_perceptron(&PerceptronConfig::default()).unwrap();

        assert_eq!(report.weights.len(), 2);
        assert_eq!(report.losses.len(), 1000);
        assert!(report.accuracy >= 0.9, "accuracy = {}", report.accuracy);
        assert!(report.losses.last().unwrap() < report.losses.first().unwrap());

        // the data is generated around the (1, 1) normal
        assert_eq!(report.probes[0].1, Label::Positive);
        assert_eq!(report.probes[1].1, Label::Negative);
    }

    #[test]
    fn perceptron_section_is_reproducible() {
        let config = PerceptronConfig::default();
        assert_eq!(
            run_perceptron(&config).unwrap(),
            run_perceptron(&config).unwrap()
        );

        let other = PerceptronConfig {
            seed: 7,
            ..PerceptronConfig::default()
        };
        assert_ne!(
            run_perceptron(&config).unwrap().weights,
            run_perceptron(&other).unwrap().weights
        );
    }

    #[test]
    fn embeddings_section_trains_saves_and_queries() {
        let dir = std::env::temp_dir().join(format!("notebook-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let corpus = dir.join("reviews.json");
        let mut lines = String::new();
        for _ in 0..30 {
            lines.push_str("{\"text\": \"the pizza was delicious and the crust crispy\"}\n");
            lines.push_str("{\"text\": \"the pasta was delicious and the sauce rich\"}\n");
            lines.push_str("{\"text\": \"the waiter was rude and the service slow\"}\n");
        }
        fs::write(&corpus, lines).unwrap();

        let config = EmbeddingsConfig {
            corpus: Some(corpus),
            word2vec: Word2VecConfig {
                vector_size: 10,
                min_count: 2,
                ..Word2VecConfig::default()
            },
            output: dir.join("vectors.safetensors"),
            queries: vec![
                QueryConfig {
                    positive: vec!["pizza".into()],
                    negative: vec![],
                    topn: 3,
                },
                QueryConfig {
                    positive: vec!["sushi".into()],
                    negative: vec![],
                    topn: 3,
                },
            ],
            ..EmbeddingsConfig::default()
        };

        let reports = run_embeddings(&config).unwrap();
        let saved = WordVectors::load(&config.output).unwrap();
        let _ = fs::remove_dir_all(&dir);

        // the unknown token query is skipped
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].model, "trained");
        assert_eq!(reports[0].neighbours.len(), 3);
        assert_eq!(
            reports[0].neighbours,
            saved.most_similar(&["pizza"], &[], 3).unwrap()
        );
    }

    #[test]
    fn no_corpus_means_no_embeddings() {
        assert!(run_embeddings(&EmbeddingsConfig::default())
            .unwrap()
            .is_empty());
    }
}
