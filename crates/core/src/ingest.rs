use crate::assemble::assemble_product_text;
use crate::chunking::build_chunks;
use crate::error::IngestError;
use crate::models::{Chunk, ChunkingOptions, SourceRecord};
use crate::records::{load_records, SkippedRecord};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

/// Output of the chunking stage for one run.
#[derive(Debug)]
pub struct ChunkingReport {
    pub chunks: Vec<Chunk>,
    pub products: usize,
    pub skipped: Vec<SkippedRecord>,
    pub generated_at: DateTime<Utc>,
}

/// Assembles and chunks every record in order. Chunk indices restart
/// at 0 for each record and stay independent across records.
pub fn chunk_records(
    records: &[SourceRecord],
    options: &ChunkingOptions,
) -> Result<Vec<Chunk>, IngestError> {
    let mut chunks = Vec::new();
    for record in records {
        let assembled = assemble_product_text(record);
        chunks.extend(build_chunks(record, &assembled, options)?);
    }
    Ok(chunks)
}

/// Record-stream-to-chunks stage: load and validate the CSV, assemble
/// each record's text, chunk it.
pub fn load_and_chunk(
    path: &Path,
    options: &ChunkingOptions,
) -> Result<ChunkingReport, IngestError> {
    let batch = load_records(path)?;
    let chunks = chunk_records(&batch.records, options)?;

    info!(
        products = batch.records.len(),
        chunks = chunks.len(),
        "chunked catalog records"
    );

    Ok(ChunkingReport {
        chunks,
        products: batch.records.len(),
        skipped: batch.skipped,
        generated_at: Utc::now(),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct ChunkStats {
    pub chunks: usize,
    pub average_words: f64,
    pub min_words: usize,
    pub max_words: usize,
    /// Chunks inside the 100-150 word band around the default target.
    pub within_target: usize,
}

pub fn chunk_stats(chunks: &[Chunk]) -> ChunkStats {
    if chunks.is_empty() {
        return ChunkStats {
            chunks: 0,
            average_words: 0.0,
            min_words: 0,
            max_words: 0,
            within_target: 0,
        };
    }

    let counts: Vec<usize> = chunks.iter().map(|chunk| chunk.word_count).collect();
    let total: usize = counts.iter().sum();

    ChunkStats {
        chunks: chunks.len(),
        average_words: total as f64 / counts.len() as f64,
        min_words: *counts.iter().min().unwrap_or(&0),
        max_words: *counts.iter().max().unwrap_or(&0),
        within_target: counts
            .iter()
            .filter(|count| (100..=150).contains(*count))
            .count(),
    }
}
