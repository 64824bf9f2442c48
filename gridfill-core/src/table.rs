//! Row and table types

use crate::{new_row_id, CellValue, GridfillResult, RowId, Timestamp, ValidationError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// ROW
// ============================================================================

/// A single data row.
///
/// System fields (id, created_at, updated_at) live on the struct; everything
/// else is a named cell in `values`. Cells absent from the map read as
/// `CellValue::Empty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable identifier, assigned at creation, never reused
    pub id: RowId,
    /// Column name -> cell value
    pub values: HashMap<String, CellValue>,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp, refreshed on every cell write
    pub updated_at: Timestamp,
}

impl Row {
    /// Create a new row with a fresh id and the given cell values.
    pub fn new(values: HashMap<String, CellValue>) -> Self {
        let now = Utc::now();
        Self {
            id: new_row_id(),
            values,
            created_at: now,
            updated_at: now,
        }
    }

    /// Read a cell. Absent cells read as `Empty`.
    pub fn cell(&self, column: &str) -> CellValue {
        self.values.get(column).cloned().unwrap_or(CellValue::Empty)
    }

    /// Write a cell and refresh `updated_at`.
    pub fn set_cell(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.insert(column.into(), value);
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// ROW TABLE
// ============================================================================

/// The full row table: an ordered column schema plus ordered rows.
///
/// The orchestrator assumes exclusive access to a table for the duration of
/// one batch run; mutation goes through `&mut self` so applies serialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RowTable {
    /// Ordered data column names (system fields are not listed here)
    columns: Vec<String>,
    /// Ordered rows
    rows: Vec<Row>,
}

impl RowTable {
    /// Create an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given column schema.
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// The ordered column schema.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether a column exists in the schema.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Add a column to the schema.
    ///
    /// # Returns
    /// * `Err(ValidationError::DuplicateColumn)` - if the column already exists
    pub fn add_column(&mut self, column: impl Into<String>) -> GridfillResult<()> {
        let column = column.into();
        if self.has_column(&column) {
            return Err(ValidationError::DuplicateColumn { column }.into());
        }
        self.columns.push(column);
        Ok(())
    }

    /// The rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a new row built from the given values, returning its id.
    /// Columns not yet in the schema are added to it.
    pub fn add_row(&mut self, values: HashMap<String, CellValue>) -> RowId {
        for column in values.keys() {
            if !self.has_column(column) {
                self.columns.push(column.clone());
            }
        }
        let row = Row::new(values);
        let id = row.id;
        self.rows.push(row);
        id
    }

    /// Insert a pre-built row (used when loading from the backend).
    ///
    /// # Returns
    /// * `Err(ValidationError::DuplicateRowId)` - if the id is already present
    pub fn insert_row(&mut self, row: Row) -> GridfillResult<()> {
        if self.rows.iter().any(|r| r.id == row.id) {
            return Err(ValidationError::DuplicateRowId { id: row.id }.into());
        }
        for column in row.values.keys() {
            if !self.has_column(column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.push(row);
        Ok(())
    }

    /// Delete a row by id.
    ///
    /// # Returns
    /// * `Err(ValidationError::UnknownRow)` - if no row has this id
    pub fn delete_row(&mut self, id: RowId) -> GridfillResult<()> {
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        if self.rows.len() == before {
            return Err(ValidationError::UnknownRow { id }.into());
        }
        Ok(())
    }

    /// Get a row by id.
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Read a cell. Unknown rows and absent cells read as `Empty`.
    pub fn cell(&self, id: RowId, column: &str) -> CellValue {
        self.row(id).map(|r| r.cell(column)).unwrap_or(CellValue::Empty)
    }

    /// Write a cell, refreshing the row's `updated_at`.
    ///
    /// # Returns
    /// * `Err(ValidationError::UnknownColumn)` - if the column is not in the schema
    /// * `Err(ValidationError::UnknownRow)` - if no row has this id
    pub fn set_cell(
        &mut self,
        id: RowId,
        column: &str,
        value: CellValue,
    ) -> GridfillResult<()> {
        if !self.has_column(column) {
            return Err(ValidationError::UnknownColumn {
                column: column.to_string(),
            }
            .into());
        }
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ValidationError::UnknownRow { id })?;
        row.set_cell(column, value);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
