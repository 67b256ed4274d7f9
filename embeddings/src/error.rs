use std::{error::Error, fmt, io};

use safetensors::SafeTensorError;

/// The embeddings module's result type.
pub type Result<T> = std::result::Result<T, EmbeddingErr>;

/// Failures while building, querying or persisting word embeddings.
#[derive(Debug)]
pub enum EmbeddingErr {
    Io(io::Error),
    Json {
        line: usize,
        source: serde_json::Error,
    },
    MissingField {
        line: usize,
        field: String,
    },
    Format(String),
    UnknownToken(String),
    DuplicateToken(String),
    EmptyQuery,
    EmptyVocabulary,
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidConfig(String),
}

impl fmt::Display for EmbeddingErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingErr::Io(e) => write!(f, "io error: {e}"),
            EmbeddingErr::Json { line, source } => {
                write!(f, "malformed record at line {line}: {source}")
            }
            EmbeddingErr::MissingField { line, field } => {
                write!(f, "record at line {line} has no string field {field:?}")
            }
            EmbeddingErr::Format(msg) => write!(f, "invalid embeddings file: {msg}"),
            EmbeddingErr::UnknownToken(token) => {
                write!(f, "token {token:?} is not in the vocabulary")
            }
            EmbeddingErr::DuplicateToken(token) => {
                write!(f, "token {token:?} appears more than once in the vocabulary")
            }
            EmbeddingErr::EmptyQuery => {
                write!(f, "a query needs at least one positive or negative token")
            }
            EmbeddingErr::EmptyVocabulary => {
                write!(f, "no token in the corpus reaches the minimum count")
            }
            EmbeddingErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch for {what}: got {got}, expected {expected}"),
            EmbeddingErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for EmbeddingErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EmbeddingErr::Io(e) => Some(e),
            EmbeddingErr::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for EmbeddingErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SafeTensorError> for EmbeddingErr {
    fn from(value: SafeTensorError) -> Self {
        Self::Format(value.to_string())
    }
}
