//! Word embeddings behind a small interface: load, save, look up and query vectors, plus a
//! skip-gram trainer and the corpus ingestion it's fed from.

pub mod corpus;
pub mod error;
mod model;
pub mod persistence;
pub mod text_format;
mod vectors;
pub mod word2vec;

pub use corpus::Corpus;
pub use error::{EmbeddingErr, Result};
pub use model::{EmbeddingModel, EmbeddingTrainer};
pub use text_format::{load_pretrained, read_text, write_text};
pub use vectors::{WordVectors, cosine};
pub use word2vec::{SkipGram, Word2VecConfig};
