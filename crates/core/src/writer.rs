use crate::error::StoreError;
use crate::models::{Chunk, CollectionHandle};
use crate::traits::VectorIndex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const DEFAULT_WRITE_BATCH_SIZE: usize = 100;

const METADATA_TITLE_CHARS: usize = 100;

/// What an ingestion run left behind: the live collection plus the
/// post-write verification numbers. `count_verified` false means the
/// store reports a different item count than was written — a
/// partial-write fault to investigate, not retried here.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub collection: CollectionHandle,
    pub written: usize,
    pub stored_count: usize,
    pub count_verified: bool,
}

/// Writes chunk vectors, documents and metadata into a named
/// collection, resetting it first so a re-run never sees stale
/// entries. Not safe for concurrent runs against the same collection
/// name; the caller must ensure a single writer.
pub struct VectorStoreWriter<S: VectorIndex> {
    store: S,
    write_batch_size: usize,
}

impl<S: VectorIndex + Send + Sync> VectorStoreWriter<S> {
    pub fn new(store: S, write_batch_size: usize) -> Self {
        Self {
            store,
            write_batch_size: write_batch_size.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn ingest(
        &self,
        collection_name: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<IngestOutcome, StoreError> {
        if chunks.len() != vectors.len() {
            return Err(StoreError::Request(format!(
                "vector count {} does not match chunk count {}",
                vectors.len(),
                chunks.len()
            )));
        }

        let collection = self.store.reset_and_create(collection_name).await?;
        info!(collection = %collection_name, chunks = chunks.len(), "collection reset, writing chunks");

        let total_batches = chunks.len().div_ceil(self.write_batch_size);
        for (number, (chunk_batch, vector_batch)) in chunks
            .chunks(self.write_batch_size)
            .zip(vectors.chunks(self.write_batch_size))
            .enumerate()
        {
            let ids: Vec<String> = chunk_batch
                .iter()
                .map(|chunk| chunk.chunk_id.clone())
                .collect();
            let documents: Vec<String> =
                chunk_batch.iter().map(|chunk| chunk.text.clone()).collect();
            let metadatas: Vec<HashMap<String, String>> =
                chunk_batch.iter().map(flatten_metadata).collect();

            debug!(
                batch = number + 1,
                total_batches,
                size = chunk_batch.len(),
                "writing batch"
            );
            self.store
                .add(&collection, &ids, vector_batch, &documents, &metadatas)
                .await?;
        }

        let stored_count = self.store.count(&collection).await?;
        let count_verified = stored_count == chunks.len();
        if !count_verified {
            warn!(
                expected = chunks.len(),
                stored = stored_count,
                collection = %collection_name,
                "stored item count does not match written chunks"
            );
        }

        Ok(IngestOutcome {
            collection,
            written: chunks.len(),
            stored_count,
            count_verified,
        })
    }
}

/// Flattens a chunk's denormalized fields into the scalar string map
/// the store's metadata interface requires. Price keeps its full
/// decimal rendering; booleans use the canonical "True"/"False"
/// tokens; the title is truncated to a snippet.
pub fn flatten_metadata(chunk: &Chunk) -> HashMap<String, String> {
    let mut metadata = HashMap::new();
    metadata.insert("product_id".to_string(), chunk.product_id.clone());
    metadata.insert("chunk_index".to_string(), chunk.chunk_index.to_string());
    metadata.insert("word_count".to_string(), chunk.word_count.to_string());
    metadata.insert("brand".to_string(), chunk.brand.clone());
    metadata.insert("category".to_string(), chunk.category.clone());
    metadata.insert("price".to_string(), chunk.price.to_string());
    metadata.insert(
        "availability".to_string(),
        if chunk.availability { "True" } else { "False" }.to_string(),
    );
    metadata.insert(
        "title".to_string(),
        chunk
            .original_title
            .chars()
            .take(METADATA_TITLE_CHARS)
            .collect(),
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::QueryHit;
    use crate::traits::VectorIndex;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    struct StoredItem {
        id: String,
        vector: Vec<f32>,
        document: String,
        metadata: HashMap<String, String>,
    }

    #[derive(Default)]
    struct FakeVectorIndex {
        collections: Mutex<HashMap<String, Vec<StoredItem>>>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VectorIndex for FakeVectorIndex {
        async fn reset_and_create(&self, name: &str) -> Result<CollectionHandle, StoreError> {
            let mut collections = self.collections.lock().unwrap();
            collections.insert(name.to_string(), Vec::new());
            Ok(CollectionHandle {
                id: format!("id-{name}"),
                name: name.to_string(),
            })
        }

        async fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
            self.collections.lock().unwrap().remove(name);
            Ok(())
        }

        async fn add(
            &self,
            collection: &CollectionHandle,
            ids: &[String],
            vectors: &[Vec<f32>],
            documents: &[String],
            metadatas: &[HashMap<String, String>],
        ) -> Result<(), StoreError> {
            assert_eq!(ids.len(), vectors.len());
            assert_eq!(ids.len(), documents.len());
            assert_eq!(ids.len(), metadatas.len());
            self.batch_sizes.lock().unwrap().push(ids.len());

            let mut collections = self.collections.lock().unwrap();
            let items = collections.get_mut(&collection.name).unwrap();
            for index in 0..ids.len() {
                items.push(StoredItem {
                    id: ids[index].clone(),
                    vector: vectors[index].clone(),
                    document: documents[index].clone(),
                    metadata: metadatas[index].clone(),
                });
            }
            Ok(())
        }

        async fn query(
            &self,
            collection: &CollectionHandle,
            _vector: &[f32],
            k: usize,
        ) -> Result<Vec<QueryHit>, StoreError> {
            let collections = self.collections.lock().unwrap();
            let items = collections.get(&collection.name).cloned().unwrap_or_default();
            Ok(items
                .into_iter()
                .take(k)
                .map(|item| QueryHit {
                    chunk_id: item.id,
                    distance: 0.25,
                    document: item.document,
                    metadata: item.metadata,
                })
                .collect())
        }

        async fn count(&self, collection: &CollectionHandle) -> Result<usize, StoreError> {
            let collections = self.collections.lock().unwrap();
            Ok(collections
                .get(&collection.name)
                .map(|items| items.len())
                .unwrap_or(0))
        }
    }

    fn chunk(id: usize) -> Chunk {
        Chunk {
            chunk_id: format!("prod_1_chunk_{id}"),
            chunk_index: id,
            text: format!("chunk text {id}"),
            word_count: 3,
            product_id: "prod_1".to_string(),
            original_title: "Wireless Mouse".to_string(),
            brand: "acme".to_string(),
            category: "electronics/computers".to_string(),
            price: 19.99,
            availability: true,
        }
    }

    fn vectors(count: usize) -> Vec<Vec<f32>> {
        (0..count).map(|index| vec![index as f32, 1.0]).collect()
    }

    #[tokio::test]
    async fn every_chunk_is_stored_exactly_once() {
        let chunks: Vec<Chunk> = (0..5).map(chunk).collect();
        let writer = VectorStoreWriter::new(FakeVectorIndex::default(), 2);

        let outcome = writer
            .ingest("products", &chunks, &vectors(5))
            .await
            .unwrap();

        assert_eq!(outcome.written, 5);
        assert_eq!(outcome.stored_count, 5);
        assert!(outcome.count_verified);
        assert_eq!(*writer.store().batch_sizes.lock().unwrap(), vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn reingest_replaces_previous_collection_contents() {
        let writer = VectorStoreWriter::new(FakeVectorIndex::default(), 10);

        let first: Vec<Chunk> = (0..4).map(chunk).collect();
        writer.ingest("products", &first, &vectors(4)).await.unwrap();

        let second: Vec<Chunk> = (0..2).map(chunk).collect();
        let outcome = writer
            .ingest("products", &second, &vectors(2))
            .await
            .unwrap();

        assert_eq!(outcome.stored_count, 2);
        let collections = writer.store().collections.lock().unwrap();
        let ids: Vec<&str> = collections["products"]
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(ids, vec!["prod_1_chunk_0", "prod_1_chunk_1"]);
    }

    #[tokio::test]
    async fn misaligned_vectors_are_rejected_before_any_write() {
        let chunks: Vec<Chunk> = (0..3).map(chunk).collect();
        let writer = VectorStoreWriter::new(FakeVectorIndex::default(), 10);

        let result = writer.ingest("products", &chunks, &vectors(2)).await;
        assert!(matches!(result, Err(StoreError::Request(_))));
        assert!(writer.store().collections.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stored_vectors_stay_aligned_with_ids() {
        let chunks: Vec<Chunk> = (0..4).map(chunk).collect();
        let writer = VectorStoreWriter::new(FakeVectorIndex::default(), 3);
        writer.ingest("products", &chunks, &vectors(4)).await.unwrap();

        let collections = writer.store().collections.lock().unwrap();
        for (index, item) in collections["products"].iter().enumerate() {
            assert_eq!(item.id, format!("prod_1_chunk_{index}"));
            assert_eq!(item.vector[0], index as f32);
            assert_eq!(item.document, format!("chunk text {index}"));
        }
    }

    #[test]
    fn metadata_is_flat_and_lossless() {
        let metadata = flatten_metadata(&chunk(2));
        assert_eq!(metadata["product_id"], "prod_1");
        assert_eq!(metadata["chunk_index"], "2");
        assert_eq!(metadata["word_count"], "3");
        assert_eq!(metadata["price"], "19.99");
        assert_eq!(metadata["availability"], "True");
        assert_eq!(metadata["title"], "Wireless Mouse");
    }

    #[test]
    fn metadata_title_is_truncated_to_snippet() {
        let mut long = chunk(0);
        long.original_title = "t".repeat(250);
        let metadata = flatten_metadata(&long);
        assert_eq!(metadata["title"].chars().count(), 100);
    }
}
