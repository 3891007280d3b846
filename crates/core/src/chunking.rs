use crate::error::IngestError;
use crate::models::{Chunk, ChunkingOptions, SourceRecord};
use regex::Regex;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Sentence segmentation strategy. The engine tries a language-aware
/// splitter first and falls back to the regex splitter when the
/// primary yields nothing usable.
pub trait SentenceSplit {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Language-aware splitter on Unicode sentence boundaries (UAX #29).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplit for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(|sentence| sentence.trim().to_string())
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }
}

/// Naive splitter on sentence-terminating punctuation runs.
#[derive(Debug, Clone)]
pub struct RegexSentenceSplitter {
    boundary: Regex,
}

impl RegexSentenceSplitter {
    pub fn new(pattern: &str) -> Result<Self, IngestError> {
        Ok(Self {
            boundary: Regex::new(pattern)?,
        })
    }
}

impl SentenceSplit for RegexSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        self.boundary
            .split(text)
            .map(|sentence| sentence.trim().to_string())
            .filter(|sentence| !sentence.is_empty())
            .collect()
    }
}

/// Normalizes a text for sentence segmentation: pipes, newlines and
/// tabs become sentence-like separators, whitespace runs collapse to
/// single spaces, and repeated periods collapse to one.
pub fn clean_text(text: &str, repeated_period: &Regex) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let separated = text
        .replace('|', ". ")
        .replace('\n', ". ")
        .replace('\t', " ");
    let collapsed = separated.split_whitespace().collect::<Vec<_>>().join(" ");

    repeated_period
        .replace_all(&collapsed, ".")
        .trim()
        .to_string()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits one record's assembled text into overlapping chunks bounded
/// by the configured word budget.
///
/// Indices are contiguous from 0 per record and chunk ids derive as
/// `{product_id}_chunk_{index}`. Any input text yields at least one
/// chunk; the only error paths are config-level (zero budget, overlap
/// at or above the budget, a bad cleanup pattern).
pub fn build_chunks(
    record: &SourceRecord,
    text: &str,
    options: &ChunkingOptions,
) -> Result<Vec<Chunk>, IngestError> {
    if options.target_words == 0 {
        return Err(IngestError::InvalidChunkConfig(
            "target_words must be greater than zero".to_string(),
        ));
    }
    if options.overlap_words >= options.target_words {
        return Err(IngestError::InvalidChunkConfig(format!(
            "overlap_words {} must be below target_words {}",
            options.overlap_words, options.target_words
        )));
    }

    let repeated_period = Regex::new(options.repeated_period_regex)?;
    let fallback = RegexSentenceSplitter::new(options.sentence_split_regex)?;

    // Tiny records skip splitting so they stay retrievable as-is.
    if word_count(text.trim()) < options.min_chunk_words {
        return Ok(vec![make_chunk(record, text.to_string(), 0)]);
    }

    let cleaned = clean_text(text, &repeated_period);
    let sentences = segment_sentences(&cleaned, &fallback);

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_words = 0usize;
    let mut index = 0usize;

    for sentence in sentences {
        let sentence_words = word_count(&sentence);

        if buffer_words + sentence_words > options.target_words && !buffer.is_empty() {
            let closed = buffer.trim().to_string();
            chunks.push(make_chunk(record, closed.clone(), index));
            index += 1;

            let overlap = overlap_tail(&closed, options.overlap_words);
            buffer = if overlap.is_empty() {
                sentence
            } else {
                format!("{overlap} {sentence}")
            };
            buffer_words = word_count(&buffer);
        } else {
            if buffer.is_empty() {
                buffer = sentence;
            } else {
                buffer.push(' ');
                buffer.push_str(&sentence);
            }
            buffer_words += sentence_words;
        }
    }

    if !buffer.is_empty()
        && (buffer_words >= options.final_chunk_min_words || chunks.is_empty())
    {
        chunks.push(make_chunk(record, buffer.trim().to_string(), index));
    }

    // Degenerate input can leave nothing; fall back to one chunk with
    // the whole cleaned text.
    if chunks.is_empty() {
        chunks.push(make_chunk(record, cleaned, 0));
    }

    Ok(chunks)
}

fn segment_sentences(text: &str, fallback: &RegexSentenceSplitter) -> Vec<String> {
    let primary = UnicodeSentenceSplitter.split(text);
    if primary.len() > 1 {
        return primary;
    }

    // UAX #29 refuses to break before lowercase sentence starts, which
    // leaves catalog prose as one giant sentence. Re-split on raw
    // terminators when the primary gave us nothing to budget with.
    debug!("unicode sentence splitter yielded nothing usable, using regex fallback");
    let relaxed = fallback.split(text);
    if relaxed.is_empty() {
        primary
    } else {
        relaxed
    }
}

/// Last `overlap_words` whole words of a closed chunk. Taken from the
/// joined chunk text, not a sentence boundary, so a sentence can wrap
/// mid-way; chunks at or under the overlap size carry no tail.
fn overlap_tail(text: &str, overlap_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > overlap_words {
        words[words.len() - overlap_words..].join(" ")
    } else {
        String::new()
    }
}

fn make_chunk(record: &SourceRecord, text: String, index: usize) -> Chunk {
    let words = word_count(&text);
    Chunk {
        chunk_id: format!("{}_chunk_{index}", record.product_id),
        chunk_index: index,
        word_count: words,
        text,
        product_id: record.product_id.clone(),
        original_title: record.title.clone(),
        brand: record.brand.clone(),
        category: record.category.clone(),
        price: record.price,
        availability: record.availability,
    }
}
