//! Extraction records and the keyed extraction store

use crate::{RowId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// EXTRACTION RECORD
// ============================================================================

/// Key identifying one extraction: (row, source column, tag).
pub type ExtractionKey = (RowId, String, String);

/// One piece of tagged content extracted from a completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Row the completion was produced for
    pub row_id: RowId,
    /// Column whose prompt produced the response
    pub column: String,
    /// Extraction tag name
    pub tag: String,
    /// Inner text of the tag (may be empty when the tag was absent)
    pub content: String,
    /// When the extraction happened
    pub extracted_at: Timestamp,
}

impl ExtractionRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        row_id: RowId,
        column: impl Into<String>,
        tag: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            row_id,
            column: column.into(),
            tag: tag.into(),
            content: content.into(),
            extracted_at: Utc::now(),
        }
    }

    /// The store key for this record.
    pub fn key(&self) -> ExtractionKey {
        (self.row_id, self.column.clone(), self.tag.clone())
    }
}

// ============================================================================
// EXTRACTION STORE
// ============================================================================

/// Keyed store of extraction records.
///
/// Keyed by (row id, column, tag); a re-run overwrites the prior record for
/// the same key rather than accumulating history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractionStore {
    records: HashMap<ExtractionKey, ExtractionRecord>,
}

impl ExtractionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for its key.
    pub fn upsert(&mut self, record: ExtractionRecord) {
        self.records.insert(record.key(), record);
    }

    /// Get the record for a key, if present.
    pub fn get(&self, row_id: RowId, column: &str, tag: &str) -> Option<&ExtractionRecord> {
        self.records
            .get(&(row_id, column.to_string(), tag.to_string()))
    }

    /// All records for one tag, sorted by row id then column for stable
    /// worksheet output.
    pub fn records_for_tag(&self, tag: &str) -> Vec<&ExtractionRecord> {
        let mut records: Vec<&ExtractionRecord> = self
            .records
            .values()
            .filter(|r| r.tag.eq_ignore_ascii_case(tag))
            .collect();
        records.sort_by(|a, b| a.row_id.cmp(&b.row_id).then_with(|| a.column.cmp(&b.column)));
        records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records for rows no longer present in `live_rows`.
    pub fn retain_rows(&mut self, live_rows: &[RowId]) {
        self.records.retain(|(row_id, _, _), _| live_rows.contains(row_id));
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_row_id;

    #[test]
    fn test_upsert_overwrites_same_key() {
        let mut store = ExtractionStore::new();
        let row = new_row_id();
        store.upsert(ExtractionRecord::new(row, "summary", "answer", "first"));
        store.upsert(ExtractionRecord::new(row, "summary", "answer", "second"));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(row, "summary", "answer").unwrap().content,
            "second"
        );
    }

    #[test]
    fn test_distinct_keys_accumulate() {
        let mut store = ExtractionStore::new();
        let row = new_row_id();
        store.upsert(ExtractionRecord::new(row, "summary", "answer", "a"));
        store.upsert(ExtractionRecord::new(row, "summary", "sources", "b"));
        store.upsert(ExtractionRecord::new(new_row_id(), "summary", "answer", "c"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_records_for_tag_sorted_by_key() {
        let mut store = ExtractionStore::new();
        let a = new_row_id();
        let b = new_row_id();
        store.upsert(ExtractionRecord::new(b, "summary", "answer", "from b"));
        store.upsert(ExtractionRecord::new(a, "summary", "answer", "from a"));
        store.upsert(ExtractionRecord::new(a, "summary", "sources", "other tag"));
        let records = store.records_for_tag("answer");
        assert_eq!(records.len(), 2);
        assert!(records
            .windows(2)
            .all(|pair| (pair[0].row_id, &pair[0].column) <= (pair[1].row_id, &pair[1].column)));
    }

    #[test]
    fn test_retain_rows_drops_deleted() {
        let mut store = ExtractionStore::new();
        let keep = new_row_id();
        let drop = new_row_id();
        store.upsert(ExtractionRecord::new(keep, "summary", "answer", "k"));
        store.upsert(ExtractionRecord::new(drop, "summary", "answer", "d"));
        store.retain_rows(&[keep]);
        assert_eq!(store.len(), 1);
        assert!(store.get(drop, "summary", "answer").is_none());
    }
}
