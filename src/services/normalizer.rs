// src/services/normalizer.rs
use crate::models::{DividendRecord, RawRow, VALUE_HEADER};

/// Rewrite comma decimal separators as periods ("0,85" -> "0.85").
pub fn normalize_amount(raw: &str) -> String {
    raw.replace(',', ".")
}

/// Build the cached record from the first (most recent) table row.
///
/// Returns `None` when there are no rows or the first row has no cells.
pub fn normalize(rows: &[RawRow]) -> Option<DividendRecord> {
    let first = rows.first()?;
    if first.is_empty() {
        return None;
    }

    let mut fields = first.clone();
    if let Some(value) = fields.get_mut(VALUE_HEADER) {
        *value = normalize_amount(value);
    }

    Some(DividendRecord::new(fields))
}
