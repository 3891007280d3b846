use crate::models::SourceRecord;

const MAX_TITLE_CHARS: usize = 200;
const MIN_TITLE_CHARS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 1_000;
const DEFAULT_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_BRAND: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of validating a raw record: either a coerced record ready
/// for the pipeline, or the full list of field-level problems.
#[derive(Debug, Clone)]
pub enum RecordValidation {
    Valid(SourceRecord),
    Invalid(Vec<FieldError>),
}

/// Validates and coerces one raw record.
///
/// Fixable problems are coerced (long fields truncated, missing brand
/// and description replaced with sentinels, price rounded to cents);
/// unfixable ones accumulate as field errors rather than stopping at
/// the first.
pub fn validate_record(raw: SourceRecord) -> RecordValidation {
    let mut errors = Vec::new();

    let title = truncate_chars(raw.title.trim(), MAX_TITLE_CHARS);
    if title.chars().count() < MIN_TITLE_CHARS {
        errors.push(FieldError {
            field: "title",
            message: format!("title must be at least {MIN_TITLE_CHARS} characters"),
        });
    }

    let product_id = raw.product_id.trim().to_string();
    if product_id.is_empty() {
        errors.push(FieldError {
            field: "product_id",
            message: "product_id must not be empty".to_string(),
        });
    }

    if raw.price <= 0.0 {
        errors.push(FieldError {
            field: "price",
            message: "price must be positive".to_string(),
        });
    }

    if !errors.is_empty() {
        return RecordValidation::Invalid(errors);
    }

    let description = match raw.description.trim() {
        "" => DEFAULT_DESCRIPTION.to_string(),
        trimmed => truncate_chars(trimmed, MAX_DESCRIPTION_CHARS),
    };

    let brand = match raw.brand.trim() {
        "" => UNKNOWN_BRAND.to_string(),
        trimmed => trimmed.to_lowercase(),
    };

    RecordValidation::Valid(SourceRecord {
        product_id,
        title,
        description,
        brand,
        category: raw.category.trim().to_string(),
        price: (raw.price * 100.0).round() / 100.0,
        availability: raw.availability,
    })
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SourceRecord {
        SourceRecord {
            product_id: "prod_1".to_string(),
            title: "Wireless Mouse".to_string(),
            description: "A compact mouse.".to_string(),
            brand: "Acme".to_string(),
            category: "electronics/computers".to_string(),
            price: 19.994,
            availability: true,
        }
    }

    #[test]
    fn valid_record_is_coerced() {
        let validated = validate_record(record());
        let RecordValidation::Valid(valid) = validated else {
            panic!("expected valid record");
        };
        assert_eq!(valid.brand, "acme");
        assert_eq!(valid.price, 19.99);
    }

    #[test]
    fn empty_description_gets_placeholder() {
        let mut raw = record();
        raw.description = "   ".to_string();
        let RecordValidation::Valid(valid) = validate_record(raw) else {
            panic!("expected valid record");
        };
        assert_eq!(valid.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn long_title_is_truncated_not_rejected() {
        let mut raw = record();
        raw.title = "x".repeat(300);
        let RecordValidation::Valid(valid) = validate_record(raw) else {
            panic!("expected valid record");
        };
        assert_eq!(valid.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn invalid_fields_accumulate() {
        let mut raw = record();
        raw.title = "abc".to_string();
        raw.price = 0.0;
        let RecordValidation::Invalid(errors) = validate_record(raw) else {
            panic!("expected invalid record");
        };
        let fields: Vec<_> = errors.iter().map(|error| error.field).collect();
        assert_eq!(fields, vec!["title", "price"]);
    }

    #[test]
    fn missing_brand_becomes_unknown() {
        let mut raw = record();
        raw.brand = " ".to_string();
        let RecordValidation::Valid(valid) = validate_record(raw) else {
            panic!("expected valid record");
        };
        assert_eq!(valid.brand, UNKNOWN_BRAND);
    }
}
