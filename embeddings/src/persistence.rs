//! Native on-disk format of `WordVectors`: a safetensors file with a single `vectors` tensor and
//! the vocabulary stored as a JSON array in the header metadata.

use std::{collections::HashMap, fs, path::Path};

use log::debug;
use ndarray::Array2;
use safetensors::{Dtype, SafeTensors, tensor::TensorView};

use crate::{EmbeddingErr, Result, WordVectors};

const VECTORS_TENSOR: &str = "vectors";
const TOKENS_KEY: &str = "tokens";

/// Serializes `model` into safetensors bytes.
pub fn to_bytes(model: &WordVectors) -> Result<Vec<u8>> {
    let data: Vec<u8> = model
        .vectors()
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();

    let view = TensorView::new(Dtype::F32, vec![model.len(), model.dim()], &data)?;
    let tokens = serde_json::to_string(model.tokens())
        .map_err(|e| EmbeddingErr::Format(format!("failed to encode the vocabulary: {e}")))?;
    let metadata = HashMap::from([(TOKENS_KEY.to_string(), tokens)]);

    Ok(safetensors::serialize([(VECTORS_TENSOR, view)], &Some(metadata))?)
}

/// Deserializes a model out of bytes produced by `to_bytes`.
///
/// # Errors
/// `EmbeddingErr::Format` if the bytes aren't a safetensors buffer, the `vectors` tensor or the
/// vocabulary are missing, or the tensor isn't a 2 dimensional `f32` one.
pub fn from_bytes(bytes: &[u8]) -> Result<WordVectors> {
    let (_, header) = SafeTensors::read_metadata(bytes)?;
    let tokens = header
        .metadata()
        .as_ref()
        .and_then(|metadata| metadata.get(TOKENS_KEY))
        .ok_or_else(|| EmbeddingErr::Format("the vocabulary is missing".into()))?;
    let tokens: Vec<String> = serde_json::from_str(tokens)
        .map_err(|e| EmbeddingErr::Format(format!("failed to decode the vocabulary: {e}")))?;

    let tensors = SafeTensors::deserialize(bytes)?;
    let view = tensors.tensor(VECTORS_TENSOR)?;

    if view.dtype() != Dtype::F32 {
        return Err(EmbeddingErr::Format(format!(
            "expected F32 vectors, got {:?}",
            view.dtype()
        )));
    }

    let &[rows, cols] = view.shape() else {
        return Err(EmbeddingErr::Format(format!(
            "expected a 2 dimensional tensor, got shape {:?}",
            view.shape()
        )));
    };

    let data: Vec<f32> = view
        .data()
        .chunks_exact(size_of::<f32>())
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let vectors = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| EmbeddingErr::Format(e.to_string()))?;

    WordVectors::new(tokens, vectors)
}

/// Writes `model` to `path`, overwriting it if it exists.
pub fn save(model: &WordVectors, path: &Path) -> Result<()> {
    let bytes = to_bytes(model)?;
    fs::write(path, &bytes)?;

    debug!(
        tokens = model.len(), dim = model.dim(), bytes = bytes.len();
        "saved word vectors to {}", path.display()
    );
    Ok(())
}

/// Reads a model written by `save`.
pub fn load(path: &Path) -> Result<WordVectors> {
    let bytes = fs::read(path)?;
    let model = from_bytes(&bytes)?;

    debug!(
        tokens = model.len(), dim = model.dim();
        "loaded word vectors from {}", path.display()
    );
    Ok(model)
}
