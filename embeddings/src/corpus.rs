//! Newline delimited JSON review records turned into token sequences.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info};
use serde_json::Value;

use crate::{EmbeddingErr, Result};

/// The field read from each record unless told otherwise.
pub const DEFAULT_TEXT_FIELD: &str = "text";

/// An ordered collection of tokenized sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    sentences: Vec<Vec<String>>,
}

impl Corpus {
    pub fn new(sentences: Vec<Vec<String>>) -> Self {
        Self { sentences }
    }

    /// Tokenizes every text with `tokenize`.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sentences = texts.into_iter().map(|t| tokenize(t.as_ref())).collect();
        Self { sentences }
    }

    /// Reads and tokenizes a JSON lines file.
    ///
    /// # Arguments
    /// * `path` - The file to read.
    /// * `field` - The string field holding each record's text.
    /// * `limit` - The maximum amount of records to read, all of them if `None`.
    pub fn open(path: &Path, field: &str, limit: Option<usize>) -> Result<Self> {
        let file = File::open(path)?;
        let corpus = read_json_lines(BufReader::new(file), field, limit)?;

        info!(
            sentences = corpus.len(), tokens = corpus.token_count();
            "read corpus from {}", path.display()
        );
        Ok(corpus)
    }

    pub fn sentences(&self) -> &[Vec<String>] {
        &self.sentences
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Total number of tokens over every sentence.
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }
}

/// Lowercases `text` and splits it on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Parses JSON lines records, tokenizing the `field` string of each one.
///
/// Blank lines are skipped and don't count towards `limit`. Line numbers in errors start at 1.
///
/// # Errors
/// * `EmbeddingErr::Json` if a line isn't valid JSON.
/// * `EmbeddingErr::MissingField` if a record has no string `field`.
/// * `EmbeddingErr::Io` if reading fails.
pub fn read_json_lines<R: BufRead>(
    reader: R,
    field: &str,
    limit: Option<usize>,
) -> Result<Corpus> {
    let limit = limit.unwrap_or(usize::MAX);
    let mut sentences = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        if sentences.len() >= limit {
            break;
        }

        let line = line?;
        let lineno = i + 1;

        if line.trim().is_empty() {
            continue;
        }

        let record: Value = serde_json::from_str(&line).map_err(|source| EmbeddingErr::Json {
            line: lineno,
            source,
        })?;

        let text = record
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| EmbeddingErr::MissingField {
                line: lineno,
                field: field.to_string(),
            })?;

        sentences.push(tokenize(text));
    }

    debug!(sentences = sentences.len(); "parsed json lines corpus");
    Ok(Corpus::new(sentences))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("  The Pasta was\tGREAT!\n"),
            ["the", "pasta", "was", "great!"]
        );
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn reads_records_and_skips_blank_lines() {
        let input = r#"{"text": "Great food", "stars": 5}

{"text": "Slow SERVICE"}
"#;
        let corpus = read_json_lines(Cursor::new(input), DEFAULT_TEXT_FIELD, None).unwrap();

        assert_eq!(
            corpus.sentences(),
            [vec!["great", "food"], vec!["slow", "service"]]
        );
        assert_eq!(corpus.token_count(), 4);
    }

    #[test]
    fn limit_bounds_the_records_read() {
        let input = "{\"text\": \"a\"}\n{\"text\": \"b\"}\nnot json\n";
        let corpus = read_json_lines(Cursor::new(input), "text", Some(2)).unwrap();

        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn malformed_json_reports_the_line() {
        let input = "{\"text\": \"ok\"}\n\n{\"text\": \n";
        let err = read_json_lines(Cursor::new(input), "text", None).unwrap_err();

        assert!(matches!(err, EmbeddingErr::Json { line: 3, .. }));
    }

    #[test]
    fn missing_or_non_string_field_fails() {
        let err = read_json_lines(Cursor::new("{\"review\": \"x\"}"), "text", None).unwrap_err();
        assert!(matches!(err, EmbeddingErr::MissingField { line: 1, .. }));

        let err = read_json_lines(Cursor::new("{\"text\": 4}"), "text", None).unwrap_err();
        assert!(matches!(err, EmbeddingErr::MissingField { line: 1, .. }));
    }
}
