//! Pre-run snapshots and restore

use crate::GridState;
use chrono::Utc;
use gridfill_core::{ColumnPromptConfig, RowTable, Timestamp};
use serde::{Deserialize, Serialize};

/// An immutable copy of the row table and prompt configuration, captured
/// before a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The row table at capture time
    pub table: RowTable,
    /// The prompt configuration at capture time
    pub prompts: Vec<ColumnPromptConfig>,
    /// When the snapshot was taken
    pub taken_at: Timestamp,
}

/// Retains the most recent pre-run snapshot and restores it on demand.
///
/// Snapshots are not versioned history: capturing again replaces the
/// previous snapshot.
#[derive(Debug, Clone, Default)]
pub struct BackupTracker {
    last: Option<Snapshot>,
}

impl BackupTracker {
    /// Create a tracker with no snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the table and prompt configuration, replacing any prior
    /// snapshot. Returns a reference to the new snapshot.
    pub fn capture(&mut self, state: &GridState) -> &Snapshot {
        self.last = Some(Snapshot {
            table: state.table.clone(),
            prompts: state.prompts.clone(),
            taken_at: Utc::now(),
        });
        self.last.as_ref().expect("snapshot just captured")
    }

    /// The most recent snapshot, if any.
    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    /// Restore the last snapshot's table and prompt configuration into
    /// `state`. Extraction records are untouched.
    ///
    /// # Returns
    /// Whether a snapshot existed to restore.
    pub fn restore_into(&self, state: &mut GridState) -> bool {
        match &self.last {
            Some(snapshot) => {
                state.table = snapshot.table.clone();
                state.prompts = snapshot.prompts.clone();
                true
            }
            None => false,
        }
    }

    /// Drop the retained snapshot.
    pub fn clear(&mut self) {
        self.last = None;
    }
}

// ============================================================================
// TESTS
// ============================================================================
