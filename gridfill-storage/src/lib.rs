//! Gridfill Storage - Sheet Store Trait and Mock Implementation
//!
//! Defines the spreadsheet-backend abstraction. A real backend (e.g. a
//! Google Sheets connector) implements `SheetStore`; the in-memory
//! `MockSheetStore` here backs tests and offline use.

pub mod sheet_id;

pub use sheet_id::extract_sheet_id;

use gridfill_core::{
    ColumnPromptConfig, ExtractionRecord, GridfillResult, RowTable, StoreError, Timestamp,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

// ============================================================================
// WORKSHEET NAMING
// ============================================================================

/// Worksheet holding the row table.
pub const MAIN_WORKSHEET: &str = "Main";

/// Worksheet holding the prompt configuration.
pub const PROMPT_CONFIG_WORKSHEET: &str = "Prompt_Config";

/// Worksheet name for one extraction tag.
///
/// The four built-in tags map to their title-cased names (`Sources`,
/// `Reasoning`, `Annotations`, `Answer`); custom tags get an `Extract_`
/// prefix.
pub fn extraction_worksheet(tag: &str) -> String {
    let lowered = tag.to_ascii_lowercase();
    match lowered.as_str() {
        "sources" | "reasoning" | "annotations" | "answer" => title_case(&lowered),
        _ => format!("Extract_{}", title_case(&lowered)),
    }
}

/// Backup worksheet name for a snapshot taken at `at`.
pub fn backup_worksheet_name(at: Timestamp) -> String {
    format!("Backup_{}", at.format("%Y%m%d_%H%M%S"))
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// SHEET STORE TRAIT
// ============================================================================

/// Spreadsheet backend abstraction.
///
/// Reads return full contents; writes replace the prior contents of their
/// location. Connectivity failures surface as `StoreError::Unavailable` and
/// abort the operation with no partial writes.
pub trait SheetStore: Send + Sync {
    // === Row Table ===

    /// Load the full row table (including system fields).
    fn load_rows(&self) -> GridfillResult<RowTable>;

    /// Replace the stored row table.
    fn save_rows(&self, table: &RowTable) -> GridfillResult<()>;

    // === Prompt Configuration ===

    /// Load the full prompt configuration.
    fn load_prompt_config(&self) -> GridfillResult<Vec<ColumnPromptConfig>>;

    /// Replace the stored prompt configuration.
    fn save_prompt_config(&self, configs: &[ColumnPromptConfig]) -> GridfillResult<()>;

    // === Extraction Sets ===

    /// Load the extraction set for one tag.
    ///
    /// # Returns
    /// * `Err(StoreError::WorksheetMissing)` - if no set was ever saved for this tag
    fn load_extractions(&self, tag: &str) -> GridfillResult<Vec<ExtractionRecord>>;

    /// Replace the extraction set for one tag.
    fn save_extractions(&self, tag: &str, records: &[ExtractionRecord]) -> GridfillResult<()>;

    // === Backups ===

    /// Write a named backup of the row table.
    fn save_backup(&self, name: &str, table: &RowTable) -> GridfillResult<()>;
}

// ============================================================================
// MOCK SHEET STORE
// ============================================================================

#[derive(Debug, Default)]
struct MockSheetStoreInner {
    rows: RowTable,
    prompt_config: Vec<ColumnPromptConfig>,
    extractions: HashMap<String, Vec<ExtractionRecord>>,
    backups: HashMap<String, RowTable>,
}

/// In-memory mock store for testing and offline use.
///
/// `set_unavailable(true)` makes every operation fail with
/// `StoreError::Unavailable`, for connectivity-error tests.
#[derive(Debug, Default)]
pub struct MockSheetStore {
    inner: RwLock<MockSheetStoreInner>,
    unavailable: AtomicBool,
}

impl MockSheetStore {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated connectivity failure.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Names of backups written so far.
    pub fn backup_names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|inner| inner.backups.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> GridfillResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable {
                reason: "mock store marked unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl SheetStore for MockSheetStore {
    fn load_rows(&self) -> GridfillResult<RowTable> {
        self.check_available()?;
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.rows.clone())
    }

    fn save_rows(&self, table: &RowTable) -> GridfillResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.rows = table.clone();
        Ok(())
    }

    fn load_prompt_config(&self) -> GridfillResult<Vec<ColumnPromptConfig>> {
        self.check_available()?;
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner.prompt_config.clone())
    }

    fn save_prompt_config(&self, configs: &[ColumnPromptConfig]) -> GridfillResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.prompt_config = configs.to_vec();
        Ok(())
    }

    fn load_extractions(&self, tag: &str) -> GridfillResult<Vec<ExtractionRecord>> {
        self.check_available()?;
        let worksheet = extraction_worksheet(tag);
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        inner
            .extractions
            .get(&worksheet)
            .cloned()
            .ok_or_else(|| StoreError::WorksheetMissing { worksheet }.into())
    }

    fn save_extractions(&self, tag: &str, records: &[ExtractionRecord]) -> GridfillResult<()> {
        self.check_available()?;
        let worksheet = extraction_worksheet(tag);
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.extractions.insert(worksheet, records.to_vec());
        Ok(())
    }

    fn save_backup(&self, name: &str, table: &RowTable) -> GridfillResult<()> {
        self.check_available()?;
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        inner.backups.insert(name.to_string(), table.clone());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gridfill_core::{CellValue, ExtractionRecord, GridfillError, new_row_id};
    use std::collections::HashMap as Map;

    fn sample_table() -> RowTable {
        let mut table = RowTable::new();
        let mut values = Map::new();
        values.insert("name".to_string(), CellValue::text("Alice"));
        table.add_row(values);
        table
    }

    #[test]
    fn test_rows_roundtrip() {
        let store = MockSheetStore::new();
        let table = sample_table();
        store.save_rows(&table).unwrap();
        assert_eq!(store.load_rows().unwrap(), table);
    }

    #[test]
    fn test_save_replaces_prior_contents() {
        let store = MockSheetStore::new();
        store.save_rows(&sample_table()).unwrap();
        store.save_rows(&RowTable::new()).unwrap();
        assert!(store.load_rows().unwrap().is_empty());
    }

    #[test]
    fn test_prompt_config_roundtrip() {
        let store = MockSheetStore::new();
        let configs = vec![ColumnPromptConfig::placeholder("summary")];
        store.save_prompt_config(&configs).unwrap();
        assert_eq!(store.load_prompt_config().unwrap(), configs);
    }

    #[test]
    fn test_extractions_missing_worksheet() {
        let store = MockSheetStore::new();
        let err = store.load_extractions("answer").unwrap_err();
        assert!(matches!(
            err,
            GridfillError::Store(StoreError::WorksheetMissing { .. })
        ));
    }

    #[test]
    fn test_extractions_roundtrip_per_tag() {
        let store = MockSheetStore::new();
        let records = vec![ExtractionRecord::new(new_row_id(), "summary", "answer", "42")];
        store.save_extractions("answer", &records).unwrap();
        assert_eq!(store.load_extractions("answer").unwrap(), records);
        assert!(store.load_extractions("sources").is_err());
    }

    #[test]
    fn test_unavailable_fails_everything() {
        let store = MockSheetStore::new();
        store.set_unavailable(true);
        let err = store.load_rows().unwrap_err();
        assert!(matches!(
            err,
            GridfillError::Store(StoreError::Unavailable { .. })
        ));
        assert!(store.save_rows(&sample_table()).is_err());
        // Nothing was written.
        store.set_unavailable(false);
        assert!(store.load_rows().unwrap().is_empty());
    }

    #[test]
    fn test_backups_are_named() {
        let store = MockSheetStore::new();
        store.save_backup("Backup_20250101_120000", &sample_table()).unwrap();
        assert_eq!(store.backup_names(), vec!["Backup_20250101_120000"]);
    }

    #[test]
    fn test_extraction_worksheet_builtins() {
        assert_eq!(extraction_worksheet("sources"), "Sources");
        assert_eq!(extraction_worksheet("Reasoning"), "Reasoning");
        assert_eq!(extraction_worksheet("annotations"), "Annotations");
        assert_eq!(extraction_worksheet("ANSWER"), "Answer");
    }

    #[test]
    fn test_extraction_worksheet_custom_tag() {
        assert_eq!(extraction_worksheet("citations"), "Extract_Citations");
    }

    #[test]
    fn test_backup_worksheet_name_format() {
        use chrono::TimeZone;
        let at = chrono::Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(backup_worksheet_name(at), "Backup_20250304_050607");
    }
}
