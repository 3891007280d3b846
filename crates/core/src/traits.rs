use crate::error::StoreError;
use crate::models::{CollectionHandle, QueryHit};
use async_trait::async_trait;
use std::collections::HashMap;

/// Capability surface of the external vector index.
///
/// `reset_and_create` is the single entry point for the
/// delete-then-recreate collection reset; the arrays handed to `add`
/// must be index-aligned and equal length.
#[async_trait]
pub trait VectorIndex {
    /// Drops any existing collection of this name and creates a fresh
    /// one configured for cosine-similarity search.
    async fn reset_and_create(&self, name: &str) -> Result<CollectionHandle, StoreError>;

    async fn delete_collection(&self, name: &str) -> Result<(), StoreError>;

    async fn add(
        &self,
        collection: &CollectionHandle,
        ids: &[String],
        vectors: &[Vec<f32>],
        documents: &[String],
        metadatas: &[HashMap<String, String>],
    ) -> Result<(), StoreError>;

    async fn query(
        &self,
        collection: &CollectionHandle,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>, StoreError>;

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, StoreError>;
}
