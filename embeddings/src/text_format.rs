//! The plain text word2vec format: a `<count> <dim>` header followed by one `token v1 ... vdim`
//! line per token. Pre-trained models are usually distributed this way.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use log::info;
use ndarray::Array2;

use crate::{EmbeddingErr, Result, WordVectors};

/// Upper bound on what's reserved up front from the header, the rest grows as rows are read.
const MAX_RESERVED: usize = 1 << 16;

/// Parses a model in word2vec text format.
///
/// # Errors
/// * `EmbeddingErr::Format` on a malformed header (including one whose size overflows), a non
///   numeric component or a file with fewer rows than the header announces.
/// * `EmbeddingErr::SizeMismatch` on a row whose length isn't the header's dimension.
pub fn read_text<R: BufRead>(reader: R) -> Result<WordVectors> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| EmbeddingErr::Format("missing header".into()))??;
    let (count, dim) = parse_header(&header)?;

    let total = count.checked_mul(dim).ok_or_else(|| {
        EmbeddingErr::Format(format!("header size {count} x {dim} is too large"))
    })?;

    let mut tokens = Vec::with_capacity(count.min(MAX_RESERVED));
    let mut data = Vec::with_capacity(total.min(MAX_RESERVED));

    for (i, line) in lines.enumerate().take(count) {
        let line = line?;
        let lineno = i + 2;
        let mut fields = line.split_whitespace();

        let token = fields
            .next()
            .ok_or_else(|| EmbeddingErr::Format(format!("line {lineno} is empty")))?;

        let before = data.len();
        for field in fields {
            let value = field.parse::<f32>().map_err(|e| {
                EmbeddingErr::Format(format!("line {lineno}: {field:?} is not a number: {e}"))
            })?;
            data.push(value);
        }

        if data.len() - before != dim {
            return Err(EmbeddingErr::SizeMismatch {
                what: "word2vec row",
                got: data.len() - before,
                expected: dim,
            });
        }

        tokens.push(token.to_string());
    }

    if tokens.len() != count {
        return Err(EmbeddingErr::Format(format!(
            "header announces {count} tokens but the file has {}",
            tokens.len()
        )));
    }

    let vectors = Array2::from_shape_vec((count, dim), data)
        .map_err(|e| EmbeddingErr::Format(e.to_string()))?;
    WordVectors::new(tokens, vectors)
}

/// Writes `model` in word2vec text format.
///
/// # Errors
/// `EmbeddingErr::Format` before writing anything if a token is empty or contains whitespace,
/// since the format couldn't read it back.
pub fn write_text<W: Write>(model: &WordVectors, mut writer: W) -> Result<()> {
    if let Some(token) = model
        .tokens()
        .iter()
        .find(|t| t.is_empty() || t.contains(char::is_whitespace))
    {
        return Err(EmbeddingErr::Format(format!(
            "token {token:?} can't be written as word2vec text"
        )));
    }

    writeln!(writer, "{} {}", model.len(), model.dim())?;

    for (token, row) in model.tokens().iter().zip(model.vectors().rows()) {
        write!(writer, "{token}")?;
        for v in row {
            write!(writer, " {v}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Loads a pre-trained model stored in word2vec text format.
pub fn load_pretrained(path: &Path) -> Result<WordVectors> {
    let file = File::open(path)?;
    let model = read_text(BufReader::new(file))?;

    info!(
        tokens = model.len(), dim = model.dim();
        "loaded pre-trained vectors from {}", path.display()
    );
    Ok(model)
}

/// Exports `model` to `path` in word2vec text format.
pub fn save_text(model: &WordVectors, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_text(model, BufWriter::new(file))
}

fn parse_header(header: &str) -> Result<(usize, usize)> {
    let invalid = || EmbeddingErr::Format(format!("invalid header {header:?}"));

    let mut fields = header.split_whitespace();
    let count = fields.next().ok_or_else(invalid)?;
    let dim = fields.next().ok_or_else(invalid)?;

    if fields.next().is_some() {
        return Err(invalid());
    }

    let count = count.parse().map_err(|_| invalid())?;
    let dim = dim.parse().map_err(|_| invalid())?;
    Ok((count, dim))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use ndarray::array;

    use super::*;

    #[test]
    fn reads_a_small_model() {
        let text = "3 2\nthe 0.5 -1\nfood 1e-3 2\ngood 0 0\n";
        let model = read_text(Cursor::new(text)).unwrap();

        assert_eq!(model.tokens(), ["the", "food", "good"]);
        assert_eq!(model.dim(), 2);
        assert_eq!(model.vector("food").unwrap().to_vec(), [1e-3, 2.]);
    }

    #[test]
    fn written_text_reads_back() {
        let tokens = ["a", "b"].map(String::from).to_vec();
        let model = WordVectors::new(tokens, array![[0.1, 0.2, -0.3], [1e-8, 3.5, 0.]]).unwrap();

        let mut buf = Vec::new();
        write_text(&model, &mut buf).unwrap();
        let loaded = read_text(Cursor::new(buf)).unwrap();

        assert_eq!(loaded, model);
    }

    #[test]
    fn exported_files_load_as_pretrained() {
        let path = std::env::temp_dir().join(format!("word2vec-{}.txt", std::process::id()));
        let tokens = ["x", "y"].map(String::from).to_vec();
        let model = WordVectors::new(tokens, array![[1., 0.], [0.5, 0.5]]).unwrap();

        save_text(&model, &path).unwrap();
        let loaded = load_pretrained(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, model);
    }

    #[test]
    fn unwritable_tokens_fail() {
        for token in ["", "two words", "tab\there"] {
            let tokens = vec!["ok".to_string(), token.to_string()];
            let model = WordVectors::new(tokens, array![[1., 0.], [0., 1.]]).unwrap();

            let mut buf = Vec::new();
            assert!(
                matches!(write_text(&model, &mut buf), Err(EmbeddingErr::Format(_))),
                "{token:?} should be rejected"
            );
            assert!(buf.is_empty());
        }
    }

    #[test]
    fn malformed_files_fail() {
        let cases = [
            "",
            "two 2\na 1 2\n",
            "1 2 3\na 1 2\n",
            "2 2\na 1 2\n",
            "1 2\na 1 x\n",
            "18446744073709551615 2\na 1 2\n",
            "4000000000000000 1\na 1\n",
        ];

        for text in cases {
            assert!(
                matches!(read_text(Cursor::new(text)), Err(EmbeddingErr::Format(_))),
                "{text:?} should be rejected"
            );
        }

        assert!(matches!(
            read_text(Cursor::new("1 3\na 1 2\n")),
            Err(EmbeddingErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }
}
