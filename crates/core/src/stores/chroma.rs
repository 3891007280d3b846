use crate::error::StoreError;
use crate::models::{CollectionHandle, QueryHit};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;

const HNSW_CONSTRUCTION_EF: u64 = 200;
const HNSW_M: u64 = 16;

/// Chroma REST client.
///
/// Collections are created for cosine-similarity search; the HNSW
/// construction parameters are index quality/speed knobs, not
/// semantic. At most one ingestion run may target a collection name
/// at a time: the reset in `reset_and_create` races with concurrent
/// writers, and nothing here locks against that.
pub struct ChromaStore {
    endpoint: String,
    client: Client,
    vector_size: usize,
}

impl ChromaStore {
    pub fn new(endpoint: impl Into<String>, vector_size: usize) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
            vector_size,
        }
    }

    fn collections_url(&self) -> String {
        format!("{}/api/v1/collections", self.endpoint)
    }

    /// Looks up an existing collection by name, for read-only probes
    /// against a previously ingested collection.
    pub async fn get_collection(&self, name: &str) -> Result<CollectionHandle, StoreError> {
        let response = self
            .client
            .get(format!("{}/{}", self.collections_url(), name))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "get collection {name}: {}",
                response.status()
            )));
        }

        let parsed: Value = response.json().await?;
        let id = parsed
            .pointer("/id")
            .and_then(Value::as_str)
            .ok_or_else(|| Self::backend_error("get response missing collection id"))?
            .to_string();

        Ok(CollectionHandle {
            id,
            name: name.to_string(),
        })
    }

    fn backend_error(details: impl Into<String>) -> StoreError {
        StoreError::BackendResponse {
            backend: "chroma".to_string(),
            details: details.into(),
        }
    }
}

#[async_trait]
impl VectorIndex for ChromaStore {
    async fn reset_and_create(&self, name: &str) -> Result<CollectionHandle, StoreError> {
        let delete = self
            .client
            .delete(format!("{}/{}", self.collections_url(), name))
            .send()
            .await?;

        // A client error here means the collection did not exist,
        // which is exactly the state the reset wants.
        if delete.status().is_server_error() {
            return Err(Self::backend_error(format!(
                "delete collection {name}: {}",
                delete.status()
            )));
        }

        let response = self
            .client
            .post(self.collections_url())
            .json(&json!({
                "name": name,
                "get_or_create": false,
                "metadata": {
                    "hnsw:space": "cosine",
                    "hnsw:construction_ef": HNSW_CONSTRUCTION_EF,
                    "hnsw:M": HNSW_M,
                },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "create collection {name}: {}",
                response.status()
            )));
        }

        let parsed: Value = response.json().await?;
        let id = parsed
            .pointer("/id")
            .and_then(Value::as_str)
            .ok_or_else(|| Self::backend_error("create response missing collection id"))?
            .to_string();

        Ok(CollectionHandle {
            id,
            name: name.to_string(),
        })
    }

    async fn delete_collection(&self, name: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.collections_url(), name))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "delete collection {name}: {}",
                response.status()
            )));
        }

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
        if ids.len() != vectors.len()
            || ids.len() != documents.len()
            || ids.len() != metadatas.len()
        {
            return Err(StoreError::Request(format!(
                "write batch arrays are misaligned: {} ids, {} vectors, {} documents, {} metadatas",
                ids.len(),
                vectors.len(),
                documents.len(),
                metadatas.len()
            )));
        }

        if ids.is_empty() {
            return Ok(());
        }

        for vector in vectors {
            if vector.len() != self.vector_size {
                return Err(StoreError::DimensionMismatch {
                    expected: self.vector_size,
                    actual: vector.len(),
                });
            }
        }

        let response = self
            .client
            .post(format!("{}/{}/add", self.collections_url(), collection.id))
            .json(&json!({
                "ids": ids,
                "embeddings": vectors,
                "documents": documents,
                "metadatas": metadatas,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "add to collection {}: {}",
                collection.name,
                response.status()
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<QueryHit>, StoreError> {
        if vector.len() != self.vector_size {
            return Err(StoreError::DimensionMismatch {
                expected: self.vector_size,
                actual: vector.len(),
            });
        }

        let response = self
            .client
            .post(format!(
                "{}/{}/query",
                self.collections_url(),
                collection.id
            ))
            .json(&json!({
                "query_embeddings": [vector],
                "n_results": k,
                "include": ["documents", "metadatas", "distances"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "query collection {}: {}",
                collection.name,
                response.status()
            )));
        }

        let parsed: Value = response.json().await?;
        let ids = string_rows(&parsed, "/ids/0");
        let documents = string_rows(&parsed, "/documents/0");
        let distances = parsed
            .pointer("/distances/0")
            .and_then(Value::as_array)
            .map(|row| {
                row.iter()
                    .map(|value| value.as_f64().unwrap_or(1.0))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let metadatas = parsed
            .pointer("/metadatas/0")
            .and_then(Value::as_array)
            .map(|row| row.iter().map(metadata_map).collect::<Vec<_>>())
            .unwrap_or_default();

        let mut hits = Vec::new();
        for (position, chunk_id) in ids.into_iter().enumerate() {
            hits.push(QueryHit {
                chunk_id,
                distance: distances.get(position).copied().unwrap_or(1.0),
                document: documents.get(position).cloned().unwrap_or_default(),
                metadata: metadatas.get(position).cloned().unwrap_or_default(),
            });
        }

        Ok(hits)
    }

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, StoreError> {
        let response = self
            .client
            .get(format!(
                "{}/{}/count",
                self.collections_url(),
                collection.id
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(format!(
                "count collection {}: {}",
                collection.name,
                response.status()
            )));
        }

        let parsed: Value = response.json().await?;
        parsed
            .as_u64()
            .map(|count| count as usize)
            .ok_or_else(|| Self::backend_error("count response is not an integer"))
    }
}

fn string_rows(parsed: &Value, pointer: &str) -> Vec<String> {
    parsed
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|row| {
            row.iter()
                .map(|value| value.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn metadata_map(value: &Value) -> HashMap<String, String> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| {
                    let rendered = value
                        .as_str()
                        .map(|text| text.to_string())
                        .unwrap_or_else(|| value.to_string());
                    (key.clone(), rendered)
                })
                .collect()
        })
        .unwrap_or_default()
}
