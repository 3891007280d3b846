use crate::embeddings::Embedder;
use crate::error::StoreError;
use crate::models::CollectionHandle;
use crate::traits::VectorIndex;
use std::collections::HashMap;

/// One ranked probe result; similarity is `1 - distance` under the
/// cosine metric the collection was created with.
#[derive(Debug, Clone)]
pub struct ProbeHit {
    pub chunk_id: String,
    pub similarity: f64,
    pub document: String,
    pub metadata: HashMap<String, String>,
}

/// Read-only query against a populated collection, used to validate
/// ingestion quality. Never mutates the store.
pub struct SearchProbe<S: VectorIndex, E: Embedder> {
    store: S,
    embedder: E,
}

impl<S: VectorIndex + Send + Sync, E: Embedder> SearchProbe<S, E> {
    pub fn new(store: S, embedder: E) -> Self {
        Self { store, embedder }
    }

    pub async fn search(
        &self,
        collection: &CollectionHandle,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<ProbeHit>, StoreError> {
        if query_text.trim().is_empty() {
            return Err(StoreError::Request("query is empty".to_string()));
        }

        let query_vectors = self.embedder.encode(&[query_text.to_string()])?;
        let query_vector = query_vectors
            .first()
            .ok_or_else(|| StoreError::Embedding("provider returned no query vector".to_string()))?;

        let mut hits: Vec<ProbeHit> = self
            .store
            .query(collection, query_vector, k)
            .await?
            .into_iter()
            .map(|hit| ProbeHit {
                chunk_id: hit.chunk_id,
                similarity: 1.0 - hit.distance,
                document: hit.document,
                metadata: hit.metadata,
            })
            .collect();

        hits.sort_by(|left, right| right.similarity.total_cmp(&left.similarity));
        Ok(hits)
    }
}
