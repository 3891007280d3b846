use crate::error::StoreError;
use tracing::debug;

const DEFAULT: usize = 384;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// External embedding capability: one call per batch, one
/// unit-normalized vector per input text, in input order.
pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, StoreError>;
}

/// Deterministic in-process embedder hashing character trigrams into a
/// fixed-size bucket vector, L2-normalized. Not semantically strong,
/// but stable across runs and batch layouts.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl CharacterNgramEmbedder {
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

impl Embedder for CharacterNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, StoreError> {
        Ok(batch.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Drives the embedder over `texts` in consecutive batches of at most
/// `batch_size`, preserving order: output `i` embeds input `i`.
///
/// Batch size is a throughput knob only; vectors must not depend on
/// it. A provider failure or a vector of the wrong dimension aborts
/// the whole run, since downstream writes need a full aligned set.
pub fn embed_in_batches<E: Embedder>(
    embedder: &E,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, StoreError> {
    if batch_size == 0 {
        return Err(StoreError::Request(
            "embedding batch_size must be greater than zero".to_string(),
        ));
    }

    let expected = embedder.dimensions();
    let mut vectors = Vec::with_capacity(texts.len());
    let total_batches = texts.len().div_ceil(batch_size);

    for (number, batch) in texts.chunks(batch_size).enumerate() {
        debug!(
            batch = number + 1,
            total_batches,
            size = batch.len(),
            "embedding batch"
        );

        let batch_vectors = embedder.encode(batch)?;
        if batch_vectors.len() != batch.len() {
            return Err(StoreError::Embedding(format!(
                "provider returned {} vectors for a batch of {}",
                batch_vectors.len(),
                batch.len()
            )));
        }

        for vector in batch_vectors {
            if vector.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            vectors.push(vector);
        }
    }

    Ok(vectors)
}
