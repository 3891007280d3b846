use crate::error::IngestError;
use crate::models::{Chunk, SourceRecord};
use crate::validate::{validate_record, RecordValidation};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// A row that did not survive loading; the run continues without it.
#[derive(Debug)]
pub struct SkippedRecord {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug)]
pub struct RecordBatch {
    pub records: Vec<SourceRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Loads and validates catalog records from a CSV file, best-effort:
/// rows that fail to parse or validate are collected as skipped, and
/// duplicate product ids keep the first occurrence. A file yielding no
/// valid record at all is an error.
pub fn load_records(path: &Path) -> Result<RecordBatch, IngestError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (row, parsed) in reader.deserialize::<SourceRecord>().enumerate() {
        // Header occupies line 1.
        let line = row as u64 + 2;

        let raw = match parsed {
            Ok(raw) => raw,
            Err(error) => {
                skipped.push(SkippedRecord {
                    line,
                    reason: error.to_string(),
                });
                continue;
            }
        };

        match validate_record(raw) {
            RecordValidation::Valid(record) => {
                if seen_ids.insert(record.product_id.clone()) {
                    records.push(record);
                } else {
                    skipped.push(SkippedRecord {
                        line,
                        reason: format!("duplicate product_id {}", record.product_id),
                    });
                }
            }
            RecordValidation::Invalid(errors) => {
                let reason = errors
                    .iter()
                    .map(|error| format!("{}: {}", error.field, error.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                skipped.push(SkippedRecord { line, reason });
            }
        }
    }

    if records.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no valid records in {}",
            path.display()
        )));
    }

    info!(
        loaded = records.len(),
        skipped = skipped.len(),
        path = %path.display(),
        "loaded catalog records"
    );

    Ok(RecordBatch { records, skipped })
}

/// Persists chunks as a CSV table for downstream inspection, one row
/// per chunk in creation order.
pub fn write_chunk_table(path: &Path, chunks: &[Chunk]) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path)?;
    for chunk in chunks {
        writer.serialize(chunk)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str = "product_id,title,description,brand,category,price,availability";

    fn write_csv(rows: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.csv");
        let mut content = HEADER.to_string();
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn valid_rows_load_and_coerce() {
        let (_dir, path) = write_csv(&[
            "prod_1,Wireless Mouse,A compact mouse.,Acme,electronics/computers,19.99,true",
        ]);
        let batch = load_records(&path).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].brand, "acme");
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn invalid_rows_are_skipped_not_fatal() {
        let (_dir, path) = write_csv(&[
            "prod_1,Wireless Mouse,A compact mouse.,Acme,electronics,19.99,true",
            "prod_2,abc,Too short a title.,Acme,electronics,5.0,true",
        ]);
        let batch = load_records(&path).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].line, 3);
        assert!(batch.skipped[0].reason.contains("title"));
    }

    #[test]
    fn duplicate_product_ids_keep_the_first() {
        let (_dir, path) = write_csv(&[
            "prod_1,Wireless Mouse,First copy.,Acme,electronics,19.99,true",
            "prod_1,Wireless Mouse,Second copy.,Acme,electronics,24.99,true",
        ]);
        let batch = load_records(&path).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].price, 19.99);
        assert_eq!(batch.skipped.len(), 1);
        assert!(batch.skipped[0].reason.contains("duplicate"));
    }

    #[test]
    fn file_with_no_valid_rows_is_an_error() {
        let (_dir, path) = write_csv(&["prod_1,abc,Bad title.,Acme,electronics,0,true"]);
        let result = load_records(&path);
        assert!(matches!(result, Err(IngestError::InvalidArgument(_))));
    }

    #[test]
    fn chunk_table_has_the_expected_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunks.csv");
        let chunk = Chunk {
            chunk_id: "prod_1_chunk_0".to_string(),
            chunk_index: 0,
            text: "Product: Wireless Mouse".to_string(),
            word_count: 3,
            product_id: "prod_1".to_string(),
            original_title: "Wireless Mouse".to_string(),
            brand: "acme".to_string(),
            category: "electronics".to_string(),
            price: 19.99,
            availability: true,
        };

        write_chunk_table(&path, &[chunk]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let header = written.lines().next().unwrap();
        assert_eq!(
            header,
            "chunk_id,chunk_index,text,word_count,product_id,original_title,brand,category,price,availability"
        );
        assert_eq!(written.lines().count(), 2);
    }
}
