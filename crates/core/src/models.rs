use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One normalized catalog item as handed over by the tabular loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_brand")]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_availability")]
    pub availability: bool,
}

fn default_brand() -> String {
    "unknown".to_string()
}

fn default_availability() -> bool {
    true
}

/// One retrievable passage cut from a record's assembled text.
///
/// Field order matches the persisted chunk-table layout, one row per
/// chunk in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub chunk_index: usize,
    pub text: String,
    pub word_count: usize,
    pub product_id: String,
    pub original_title: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub availability: bool,
}

/// Knobs for the sentence-greedy chunker.
///
/// `target_words` bounds a chunk's word budget, `overlap_words` is the
/// tail of the previous chunk repeated at the start of the next, and
/// texts under `min_chunk_words` skip splitting entirely. The regex
/// patterns drive text cleanup and the fallback sentence splitter.
#[derive(Debug, Clone)]
pub struct ChunkingOptions {
    pub target_words: usize,
    pub overlap_words: usize,
    pub min_chunk_words: usize,
    pub final_chunk_min_words: usize,
    pub repeated_period_regex: &'static str,
    pub sentence_split_regex: &'static str,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            target_words: 125,
            overlap_words: 25,
            min_chunk_words: 50,
            final_chunk_min_words: 30,
            repeated_period_regex: r"\.(\s*\.)+",
            sentence_split_regex: r"[.!?]+",
        }
    }
}

/// Handle to a live collection in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionHandle {
    pub id: String,
    pub name: String,
}

/// One ranked row returned by a collection query, distance as reported
/// by the store under the cosine metric.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub chunk_id: String,
    pub distance: f64,
    pub document: String,
    pub metadata: HashMap<String, String>,
}
