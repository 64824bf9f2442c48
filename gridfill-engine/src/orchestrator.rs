//! Batch orchestrator: planning, bounded dispatch, staged apply

use crate::GridState;
use gridfill_core::{
    BatchState, BatchSummary, CellValue, ColumnPromptConfig, EngineConfig, ExtractionRecord,
    GridfillResult, ItemOutcome, ItemStatus, ReplacePolicy, WorkItem, ANSWER_TAG,
};
use gridfill_llm::{CompletionAdapter, CompletionProvider, CompletionRequest};
use gridfill_parse::{extract_tags, fallback_answer, resolve_template};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared cancellation flag for a batch run.
///
/// Cancelling stops dispatch of not-yet-started work items immediately;
/// in-flight requests finish or fail naturally and their results are still
/// applied.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Progress hook invoked as `(completed, planned)` after each dispatched
/// item lands.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

// ============================================================================
// BATCH REPORT
// ============================================================================

/// Result of one batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Terminal lifecycle state (always `Completed`)
    pub state: BatchState,
    /// Aggregate counters
    pub summary: BatchSummary,
    /// Per-item outcomes for dispatched items, in completion order
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    fn empty() -> Self {
        Self {
            state: BatchState::Completed,
            summary: BatchSummary::default(),
            outcomes: Vec::new(),
        }
    }
}

// ============================================================================
// BATCH ORCHESTRATOR
// ============================================================================

/// Plans and runs batch prompt execution over a `GridState`.
///
/// Stateless across runs; one instance can serve any number of sequential
/// batches. Concurrency within a run is bounded by
/// `EngineConfig::max_concurrent_requests`.
pub struct BatchOrchestrator {
    config: EngineConfig,
    adapter: Arc<CompletionAdapter>,
}

impl BatchOrchestrator {
    /// Create an orchestrator over a completion provider.
    ///
    /// # Returns
    /// * `Err(GridfillError::Config)` - if the configuration fails validation
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        config: EngineConfig,
    ) -> GridfillResult<Self> {
        config.validate()?;
        let adapter = Arc::new(CompletionAdapter::new(
            provider,
            config.retry.clone(),
            config.request_timeout,
        ));
        Ok(Self { config, adapter })
    }

    /// Build the work list for a run.
    ///
    /// A row/column pair is included when its config is active, its column
    /// exists in the schema, its template is not the locked placeholder, and
    /// the replace policy admits the cell (`ReplaceAll` always does;
    /// `FillEmptyOnly` only for currently-empty cells). A config whose
    /// column has vanished plans as inactive. Templates are resolved against
    /// each row here, at planning time.
    pub fn plan(&self, state: &GridState) -> Vec<WorkItem> {
        let mut planned_columns: HashSet<&str> = HashSet::new();
        let mut items = Vec::new();

        for config in &state.prompts {
            if !self.config_plannable(config, state) {
                continue;
            }
            // One config per column; the first wins.
            if !planned_columns.insert(config.column.as_str()) {
                continue;
            }

            for row in state.table.rows() {
                let include = match config.replace {
                    ReplacePolicy::ReplaceAll => true,
                    ReplacePolicy::FillEmptyOnly => row.cell(&config.column).is_empty(),
                };
                if include {
                    items.push(WorkItem {
                        row_id: row.id,
                        column: config.column.clone(),
                        prompt: resolve_template(&config.template, &row.values),
                        web_search: config.web_search,
                    });
                }
            }
        }

        items
    }

    fn config_plannable(&self, config: &ColumnPromptConfig, state: &GridState) -> bool {
        if !config.active {
            return false;
        }
        if config.template.trim() == ColumnPromptConfig::LOCKED_TEMPLATE {
            return false;
        }
        // Schema mismatch: treated as inactive rather than erroring.
        if !state.table.has_column(&config.column) {
            tracing::debug!(
                column = %config.column,
                "prompt config references a column not in the schema, skipping"
            );
            return false;
        }
        true
    }

    /// Run a batch to completion and apply its results.
    pub async fn run(&self, state: &mut GridState) -> BatchReport {
        self.run_with(state, CancelHandle::new(), None).await
    }

    /// Run a batch with an external cancellation handle and an optional
    /// progress callback.
    ///
    /// All staged cell updates and extraction records are applied to
    /// `state` in one synchronous step before returning, so callers observe
    /// either none or all of the batch's changes. Per-item failures are
    /// recorded in the report; they never abort the run.
    pub async fn run_with(
        &self,
        state: &mut GridState,
        cancel: CancelHandle,
        progress: Option<ProgressCallback>,
    ) -> BatchReport {
        // Planning
        let work = self.plan(state);
        let planned = work.len();
        if work.is_empty() {
            tracing::info!("batch plan is empty, nothing to do");
            return BatchReport::empty();
        }

        tracing::info!(
            items = planned,
            max_in_flight = self.config.max_concurrent_requests,
            model = %self.config.default_model,
            "batch run starting"
        );

        // Running
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_requests));
        let mut tasks: JoinSet<Option<ItemOutcome>> = JoinSet::new();

        for item in work {
            let adapter = Arc::clone(&self.adapter);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let model = self.config.default_model.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("batch semaphore closed");
                // Items cancelled before their request starts are dropped
                // from the run; in-flight items always land.
                if cancel.is_cancelled() {
                    return None;
                }

                let mut request = CompletionRequest::new(item.prompt.clone(), model);
                request.web_search = item.web_search;

                let outcome = match adapter.execute(&request).await {
                    Ok(done) => ItemOutcome {
                        item,
                        status: ItemStatus::Succeeded {
                            response: done.text,
                        },
                        retries: done.retries,
                    },
                    Err(failure) => ItemOutcome {
                        item,
                        status: ItemStatus::Failed {
                            error: failure.error,
                        },
                        retries: failure.retries,
                    },
                };
                Some(outcome)
            });
        }

        let mut summary = BatchSummary::default();
        let mut outcomes = Vec::with_capacity(planned);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(outcome)) => {
                    summary.record(&outcome);
                    if let ItemStatus::Failed { error } = &outcome.status {
                        tracing::warn!(
                            row = %outcome.item.row_id,
                            column = %outcome.item.column,
                            retries = outcome.retries,
                            error = %error,
                            "work item failed"
                        );
                    }
                    if let Some(callback) = progress.as_ref() {
                        callback(summary.total, planned);
                    }
                    outcomes.push(outcome);
                }
                Ok(None) => {
                    // Skipped by cancellation before dispatch.
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "batch worker task failed to join");
                }
            }
        }

        // Completed: apply all staged changes in one step.
        self.apply(state, &outcomes);

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            retried = summary.retried,
            cancelled = cancel.is_cancelled(),
            "batch run completed"
        );

        BatchReport {
            state: BatchState::Completed,
            summary,
            outcomes,
        }
    }

    /// Merge outcomes into the state: cell values for successes, error
    /// markers for failures, and one extraction record per matched tag.
    fn apply(&self, state: &mut GridState, outcomes: &[ItemOutcome]) {
        for outcome in outcomes {
            let row_id = outcome.item.row_id;
            let column = &outcome.item.column;

            let cell_text = match &outcome.status {
                ItemStatus::Succeeded { response } => {
                    let extracted = extract_tags(response, &state.tags);
                    for (tag, content) in &extracted {
                        if !content.is_empty() {
                            state.extractions.upsert(ExtractionRecord::new(
                                row_id,
                                column.clone(),
                                tag.clone(),
                                content.clone(),
                            ));
                        }
                    }
                    match extracted.get(ANSWER_TAG).filter(|a| !a.is_empty()) {
                        Some(answer) => answer.clone(),
                        None => fallback_answer(response),
                    }
                }
                ItemStatus::Failed { error } => format!("#ERROR: {}", error.class()),
            };

            if let Err(error) = state.table.set_cell(row_id, column, CellValue::Text(cell_text)) {
                // The run assumes exclusive table access; a vanished row or
                // column here means that contract was broken by the caller.
                tracing::warn!(
                    row = %row_id,
                    column = %column,
                    error = %error,
                    "staged update no longer applies"
                );
            }
        }
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use gridfill_core::{EngineConfig, TagSet};
    use gridfill_llm::MockCompletionProvider;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn build_state(cells: &[Option<String>], replace: ReplacePolicy) -> GridState {
        let mut state = GridState {
            table: Default::default(),
            prompts: Vec::new(),
            tags: TagSet::default(),
            extractions: Default::default(),
        };
        state.table.add_column("name").unwrap();
        state.table.add_column("summary").unwrap();
        for cell in cells {
            let mut values = HashMap::new();
            values.insert("name".to_string(), CellValue::text("x"));
            if let Some(text) = cell {
                values.insert("summary".to_string(), CellValue::text(text.clone()));
            }
            state.table.add_row(values);
        }
        state.prompts.push(ColumnPromptConfig {
            column: "summary".to_string(),
            template: "Summarize: {name}".to_string(),
            replace,
            active: true,
            web_search: false,
        });
        state
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// `FillEmptyOnly` plans exactly the rows whose target cell is
        /// empty; `ReplaceAll` plans every row.
        #[test]
        fn prop_replace_policy_governs_plan(
            cells in proptest::collection::vec(
                proptest::option::of("[a-z ]{0,10}"), 0..8,
            ),
        ) {
            let orchestrator = BatchOrchestrator::new(
                Arc::new(MockCompletionProvider::new()),
                EngineConfig::default(),
            )
            .unwrap();

            let fill_empty = build_state(&cells, ReplacePolicy::FillEmptyOnly);
            let planned = orchestrator.plan(&fill_empty);
            let expected: usize = fill_empty
                .table
                .rows()
                .iter()
                .filter(|row| row.cell("summary").is_empty())
                .count();
            prop_assert_eq!(planned.len(), expected);
            for item in &planned {
                prop_assert!(fill_empty.table.cell(item.row_id, "summary").is_empty());
            }

            let replace_all = build_state(&cells, ReplacePolicy::ReplaceAll);
            prop_assert_eq!(orchestrator.plan(&replace_all).len(), cells.len());
        }
    }
}
