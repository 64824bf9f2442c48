//! Gridfill Engine - Batch Orchestration
//!
//! The batch orchestrator turns a table, a prompt configuration, and a tag
//! set into staged cell updates and extraction records, dispatching
//! completion calls with bounded concurrency. The surrounding UI layer owns
//! the application state and passes it in explicitly as a `GridState`; the
//! orchestrator and the backup tracker are services over that state, not
//! holders of it.

pub mod orchestrator;
pub mod snapshot;

pub use orchestrator::{BatchOrchestrator, BatchReport, CancelHandle, ProgressCallback};
pub use snapshot::{BackupTracker, Snapshot};

use gridfill_core::{ensure_configs_for_columns, ColumnPromptConfig, ExtractionStore, RowTable, TagSet};
use serde::{Deserialize, Serialize};

// ============================================================================
// GRID STATE
// ============================================================================

/// The application state a batch run operates on.
///
/// Owned by the caller and passed in by `&mut` reference; the orchestrator
/// assumes exclusive access for the duration of one run, which also
/// serializes apply steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridState {
    /// The row table
    pub table: RowTable,
    /// Per-column prompt configuration
    pub prompts: Vec<ColumnPromptConfig>,
    /// Global extraction tag configuration
    pub tags: TagSet,
    /// Extraction records keyed by (row, column, tag)
    pub extractions: ExtractionStore,
}

impl GridState {
    /// Create an empty state with the default extraction tags.
    pub fn new() -> Self {
        Self {
            table: RowTable::new(),
            prompts: Vec::new(),
            tags: TagSet::default(),
            extractions: ExtractionStore::new(),
        }
    }

    /// Seed placeholder prompt configs for data columns that have none yet.
    pub fn sync_prompt_configs(&mut self) {
        ensure_configs_for_columns(&mut self.prompts, self.table.columns());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gridfill_core::CellValue;
    use std::collections::HashMap;

    #[test]
    fn test_new_state_has_default_tags() {
        let state = GridState::new();
        assert!(state.tags.contains("answer"));
        assert!(state.table.is_empty());
        assert!(state.prompts.is_empty());
    }

    #[test]
    fn test_sync_prompt_configs_seeds_placeholders() {
        let mut state = GridState::new();
        let mut values = HashMap::new();
        values.insert("name".to_string(), CellValue::text("Alice"));
        state.table.add_row(values);
        state.sync_prompt_configs();
        assert_eq!(state.prompts.len(), 1);
        assert_eq!(state.prompts[0].column, "name");
        assert!(!state.prompts[0].active);
    }
}
