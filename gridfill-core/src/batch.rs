//! Batch run bookkeeping types

use crate::{CompletionError, RowId};
use serde::{Deserialize, Serialize};

// ============================================================================
// WORK ITEM
// ============================================================================

/// One (row, column) unit of work, with its prompt resolved at planning time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Target row
    pub row_id: RowId,
    /// Target column
    pub column: String,
    /// Fully resolved prompt text
    pub prompt: String,
    /// Whether the completion call should attach web search
    pub web_search: bool,
}

// ============================================================================
// BATCH STATE
// ============================================================================

/// Lifecycle of a batch run.
///
/// There is no `Paused` state: cancellation requests a transition directly
/// to `Completed` with partial results preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchState {
    /// Building the work list
    Planning,
    /// Dispatching work items
    Running,
    /// All work finished, cancelled, or short-circuited on an empty plan
    Completed,
}

// ============================================================================
// ITEM OUTCOME
// ============================================================================

/// Terminal status of one work item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    /// The completion call succeeded
    Succeeded {
        /// Raw response text from the provider
        response: String,
    },
    /// The completion call failed after retry exhaustion (or immediately,
    /// for fatal errors)
    Failed { error: CompletionError },
}

/// Result of one work item, with the retries it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    /// The work item this outcome belongs to
    pub item: WorkItem,
    /// Terminal status
    pub status: ItemStatus,
    /// Number of retries consumed (0 for first-attempt outcomes)
    pub retries: u32,
}

impl ItemOutcome {
    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, ItemStatus::Succeeded { .. })
    }
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

/// Aggregate counters for a batch run.
///
/// `succeeded + failed` always equals `total`, the work-list size at the
/// moment dispatching stopped (cancellation removes never-dispatched items
/// from `total`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Work items dispatched
    pub total: usize,
    /// Items that produced a response
    pub succeeded: usize,
    /// Items that failed after retries (or fatally)
    pub failed: usize,
    /// Total retries consumed across all items
    pub retried: u64,
}

impl BatchSummary {
    /// Fold one item outcome into the counters.
    pub fn record(&mut self, outcome: &ItemOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.retried += u64::from(outcome.retries);
    }
}

// ============================================================================
// TESTS
// ============================================================================
