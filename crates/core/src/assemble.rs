use crate::models::SourceRecord;
use crate::validate::UNKNOWN_BRAND;

pub const PRICE_CURRENCY: &str = "₹";

/// Builds the single text blob the chunker splits for one record.
///
/// Clauses are emitted in a fixed order and joined with `". "`; a
/// clause is skipped when its field is missing or a sentinel default.
/// Deterministic, no failure path.
pub fn assemble_product_text(record: &SourceRecord) -> String {
    let mut parts = Vec::new();

    let title = record.title.trim();
    if !title.is_empty() {
        parts.push(format!("Product: {title}"));
    }

    let brand = record.brand.trim();
    if !brand.is_empty() && !brand.eq_ignore_ascii_case(UNKNOWN_BRAND) {
        parts.push(format!("Brand: {brand}"));
    }

    let category = record.category.trim();
    if !category.is_empty() {
        let readable = category.replace('&', " and ").replace('|', " > ");
        parts.push(format!("Category: {readable}"));
    }

    if record.price > 0.0 {
        parts.push(format!("Price: {PRICE_CURRENCY}{}", record.price));
    }

    let description = record.description.trim();
    if !description.is_empty() {
        parts.push(format!("Description: {description}"));
    }

    parts.join(". ")
}
