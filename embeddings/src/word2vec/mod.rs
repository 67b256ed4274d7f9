//! An in-house word2vec: a skip-gram trainer producing `WordVectors`.

mod config;
mod skip_gram;

pub use config::Word2VecConfig;
pub use skip_gram::SkipGram;
