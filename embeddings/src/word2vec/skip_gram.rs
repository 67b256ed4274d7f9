use std::collections::HashMap;

use log::{debug, info, trace};
use machine_learning::arch::activations::Sigmoid;
use ndarray::{Array1, Array2, ArrayViewMut1};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::Word2VecConfig;
use crate::{EmbeddingErr, Result, WordVectors, corpus::Corpus, model::EmbeddingTrainer};

/// Exponent applied to token counts when building the noise distribution.
const NOISE_POWER: f64 = 0.75;

/// Skip-gram with negative sampling.
///
/// Every token is trained to tell its real context tokens apart from `negative` noise tokens
/// drawn from the smoothed unigram distribution. The learned input vectors are the embeddings.
/// Runs on a single thread, so a given config and corpus always give the same vectors.
#[derive(Debug, Clone)]
pub struct SkipGram {
    config: Word2VecConfig,
    sigmoid: Sigmoid,
}

impl SkipGram {
    /// Creates a new `SkipGram` trainer.
    ///
    /// # Errors
    /// `EmbeddingErr::InvalidConfig` if any hyperparameter is out of range.
    pub fn new(config: Word2VecConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            sigmoid: Sigmoid::new(),
        })
    }

    pub fn config(&self) -> &Word2VecConfig {
        &self.config
    }

    /// A single update over the pair `(center, context)` plus its noise samples.
    fn train_pair<R: Rng>(
        &self,
        rng: &mut R,
        noise: &NoiseTable,
        mut input: ArrayViewMut1<f32>,
        output: &mut Array2<f32>,
        context: usize,
        lr: f32,
    ) {
        let mut correction = Array1::<f32>::zeros(input.len());

        for d in 0..=self.config.negative {
            let (target, label) = if d == 0 {
                (context, 1.)
            } else {
                let target = noise.sample(rng);
                if target == context {
                    continue;
                }
                (target, 0.)
            };

            let mut out = output.row_mut(target);
            let g = (label - self.sigmoid.f(input.dot(&out))) * lr;

            correction.scaled_add(g, &out);
            out.scaled_add(g, &input);
        }

        input += &correction;
    }
}

impl EmbeddingTrainer for SkipGram {
    type Model = WordVectors;

    /// Learns vectors for every token seen at least `min_count` times.
    ///
    /// # Errors
    /// `EmbeddingErr::EmptyVocabulary` if no token reaches `min_count`.
    fn train(&mut self, corpus: &Corpus) -> Result<WordVectors> {
        let Word2VecConfig {
            vector_size,
            window,
            epochs,
            learning_rate,
            min_learning_rate,
            seed,
            ..
        } = self.config;

        let vocab = Vocabulary::build(corpus, self.config.min_count)?;
        let sentences = vocab.encode(corpus);
        let noise = NoiseTable::new(&vocab.counts);

        debug!(
            tokens = vocab.len(), sentences = sentences.len();
            "built vocabulary"
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let mut input = Array2::from_shape_fn((vocab.len(), vector_size), |_| {
            (rng.random::<f32>() - 0.5) / vector_size as f32
        });
        let mut output = Array2::<f32>::zeros((vocab.len(), vector_size));

        let words_per_epoch: usize = sentences.iter().map(Vec::len).sum();
        let total = epochs.saturating_mul(words_per_epoch).max(1) as f32;
        let mut processed = 0;
        let mut lr = learning_rate;

        for epoch in 0..epochs {
            for sentence in &sentences {
                for (pos, &center) in sentence.iter().enumerate() {
                    let progress = processed as f32 / total;
                    lr = (learning_rate - (learning_rate - min_learning_rate) * progress)
                        .max(min_learning_rate);
                    processed += 1;

                    let reach = window - rng.random_range(0..window);
                    let start = pos.saturating_sub(reach);
                    let end = (pos + reach).min(sentence.len() - 1);

                    let contexts = sentence.iter().enumerate().take(end + 1).skip(start);
                    for (ctx_pos, &context) in contexts {
                        if ctx_pos == pos {
                            continue;
                        }

                        self.train_pair(
                            &mut rng,
                            &noise,
                            input.row_mut(center),
                            &mut output,
                            context,
                            lr,
                        );
                    }
                }
            }

            trace!(epoch = epoch, lr = lr; "finished word2vec epoch");
        }

        info!(
            tokens = vocab.len(), dim = vector_size, epochs = epochs, words = words_per_epoch;
            "trained word vectors"
        );

        WordVectors::new(vocab.tokens, input)
    }
}

/// Tokens kept for training, most frequent first and ties in order of first appearance.
struct Vocabulary {
    tokens: Vec<String>,
    counts: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    fn build(corpus: &Corpus, min_count: usize) -> Result<Self> {
        // token -> (count, first appearance)
        let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();

        for token in corpus.sentences().iter().flatten() {
            let next = seen.len();
            seen.entry(token.as_str()).or_insert((0, next)).0 += 1;
        }

        let mut kept: Vec<_> = seen
            .into_iter()
            .filter(|&(_, (count, _))| count >= min_count)
            .collect();

        if kept.is_empty() {
            return Err(EmbeddingErr::EmptyVocabulary);
        }

        kept.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));

        let tokens: Vec<String> = kept.iter().map(|(t, _)| t.to_string()).collect();
        let counts = kept.iter().map(|&(_, (count, _))| count).collect();
        let index = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Ok(Self {
            tokens,
            counts,
            index,
        })
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Maps every sentence to vocabulary indices, dropping unknown tokens.
    fn encode(&self, corpus: &Corpus) -> Vec<Vec<usize>> {
        corpus
            .sentences()
            .iter()
            .map(|s| s.iter().filter_map(|t| self.index.get(t).copied()).collect())
            .filter(|s: &Vec<usize>| s.len() > 1)
            .collect()
    }
}

/// Cumulative `count^0.75` distribution, sampled by binary search.
struct NoiseTable {
    cumulative: Vec<f64>,
}

impl NoiseTable {
    fn new(counts: &[usize]) -> Self {
        let cumulative = counts
            .iter()
            .scan(0., |acc, &c| {
                *acc += (c as f64).powf(NOISE_POWER);
                Some(*acc)
            })
            .collect();

        Self { cumulative }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(0.);
        let r = rng.random::<f64>() * total;
        let i = self.cumulative.partition_point(|&c| c <= r);
        i.min(self.cumulative.len().saturating_sub(1))
    }
}
