//! Gridfill Core - Entity Types
//!
//! Pure data structures for the prompt-execution pipeline. All other crates
//! depend on this. This crate contains ONLY data types plus their
//! constructors, accessors, and validation - no orchestration logic.

pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod prompt;
pub mod table;
pub mod value;

pub use batch::{BatchState, BatchSummary, ItemOutcome, ItemStatus, WorkItem};
pub use config::{EngineConfig, RetryPolicy};
pub use error::{
    CompletionError, ConfigError, GridfillError, GridfillResult, StoreError, ValidationError,
};
pub use extraction::{ExtractionKey, ExtractionRecord, ExtractionStore};
pub use prompt::{
    ensure_configs_for_columns, ColumnPromptConfig, ReplacePolicy, TagSet, ANSWER_TAG,
    DEFAULT_TAGS,
};
pub use table::{Row, RowTable};
pub use value::CellValue;

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Row identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, so ids sort in creation order and are
/// never reused after a row is deleted.
pub type RowId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 RowId (timestamp-sortable).
pub fn new_row_id() -> RowId {
    Uuid::now_v7()
}

// ============================================================================
// TESTS
// ============================================================================
