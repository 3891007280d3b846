pub mod assemble;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod models;
pub mod probe;
pub mod records;
pub mod stores;
pub mod traits;
pub mod validate;
pub mod writer;

pub use assemble::{assemble_product_text, PRICE_CURRENCY};
pub use chunking::{
    build_chunks, clean_text, word_count, RegexSentenceSplitter, SentenceSplit,
    UnicodeSentenceSplitter,
};
pub use embeddings::{
    embed_in_batches, CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS,
};
pub use error::{IngestError, StoreError};
pub use ingest::{chunk_records, chunk_stats, load_and_chunk, ChunkStats, ChunkingReport};
pub use models::{Chunk, ChunkingOptions, CollectionHandle, QueryHit, SourceRecord};
pub use probe::{ProbeHit, SearchProbe};
pub use records::{load_records, write_chunk_table, RecordBatch, SkippedRecord};
pub use stores::ChromaStore;
pub use traits::VectorIndex;
pub use validate::{validate_record, FieldError, RecordValidation};
pub use writer::{flatten_metadata, IngestOutcome, VectorStoreWriter, DEFAULT_WRITE_BATCH_SIZE};
