use catalog_search_core::{
    chunk_stats, embed_in_batches, load_and_chunk, write_chunk_table, CharacterNgramEmbedder,
    ChromaStore, ChunkingOptions, SearchProbe, VectorStoreWriter, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_WRITE_BATCH_SIZE,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog-search-engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Chroma base URL
    #[arg(long, default_value = "http://localhost:8000")]
    chroma_url: String,

    /// Target collection name
    #[arg(long, default_value = "product_embeddings")]
    collection: String,

    /// Embedding dimension
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    dimensions: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk a catalog CSV, embed the chunks and rebuild the collection.
    Ingest {
        /// Catalog CSV with product_id, title, description, brand,
        /// category, price and availability columns.
        #[arg(long)]
        csv: PathBuf,
        /// Optional CSV path to persist the chunk table for inspection.
        #[arg(long)]
        chunk_table: Option<PathBuf>,
        /// Word budget per chunk.
        #[arg(long, default_value = "125")]
        target_words: usize,
        /// Words repeated from the previous chunk's tail.
        #[arg(long, default_value = "25")]
        overlap_words: usize,
        /// Texts per embedding-provider call.
        #[arg(long, default_value = "32")]
        embed_batch_size: usize,
        /// Chunks per store write call.
        #[arg(long, default_value_t = DEFAULT_WRITE_BATCH_SIZE)]
        write_batch_size: usize,
    },
    /// Probe the populated collection with a query.
    Search {
        /// Query text
        #[arg(long)]
        query: String,
        /// Number of hits to return.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let embedder = CharacterNgramEmbedder {
        dimensions: cli.dimensions,
    };
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "catalog-search-engine boot"
    );

    match cli.command {
        Command::Ingest {
            csv,
            chunk_table,
            target_words,
            overlap_words,
            embed_batch_size,
            write_batch_size,
        } => {
            let options = ChunkingOptions {
                target_words,
                overlap_words,
                ..ChunkingOptions::default()
            };

            let report = load_and_chunk(&csv, &options)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if !report.skipped.is_empty() {
                warn!(skipped = report.skipped.len(), csv = %csv.display(), "some rows were skipped");
                for skipped in &report.skipped {
                    warn!(line = skipped.line, reason = %skipped.reason, "skipped record");
                }
            }

            let stats = chunk_stats(&report.chunks);
            println!(
                "{} chunks from {} products (avg {:.1} words, min {}, max {}, {} in 100-150 band)",
                stats.chunks,
                report.products,
                stats.average_words,
                stats.min_words,
                stats.max_words,
                stats.within_target
            );

            if let Some(table_path) = chunk_table {
                write_chunk_table(&table_path, &report.chunks)
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
                info!(path = %table_path.display(), "chunk table written");
            }

            let texts: Vec<String> = report
                .chunks
                .iter()
                .map(|chunk| chunk.text.clone())
                .collect();
            let vectors = embed_in_batches(&embedder, &texts, embed_batch_size)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            info!(vectors = vectors.len(), dimensions = cli.dimensions, "embeddings generated");

            let store = ChromaStore::new(&cli.chroma_url, cli.dimensions);
            let writer = VectorStoreWriter::new(store, write_batch_size);
            let outcome = writer
                .ingest(&cli.collection, &report.chunks, &vectors)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if !outcome.count_verified {
                println!(
                    "warning: collection {} reports {} items, expected {}",
                    cli.collection, outcome.stored_count, outcome.written
                );
            }

            println!(
                "{} chunks ingested into {} at {}",
                outcome.written,
                cli.collection,
                Utc::now().to_rfc3339()
            );
        }
        Command::Search { query, top_k } => {
            let store = ChromaStore::new(&cli.chroma_url, cli.dimensions);
            let collection = store
                .get_collection(&cli.collection)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            let probe = SearchProbe::new(store, embedder);
            let hits = probe
                .search(&collection, &query, top_k)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("query: {query}");
            for (position, hit) in hits.iter().enumerate() {
                println!(
                    "{}. similarity={:.3} chunk={}",
                    position + 1,
                    hit.similarity,
                    hit.chunk_id
                );
                if let Some(title) = hit.metadata.get("title") {
                    println!("   product: {title}");
                }
                if let Some(brand) = hit.metadata.get("brand") {
                    println!("   brand: {brand}");
                }
                if let Some(price) = hit.metadata.get("price") {
                    println!("   price: ₹{price}");
                }
                let snippet: String = hit.document.chars().take(100).collect();
                println!("   text: {snippet}...");
            }
        }
    }

    Ok(())
}
