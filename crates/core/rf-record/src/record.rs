//! Records and the termination sentinel.

use crate::Column;
use rf_error::{RecordError, Result};

/// One row of data flowing through the pipeline.
///
/// Columns keep insertion order, which is the schema order. The byte-size
/// estimate is maintained incrementally so capacity accounting never walks
/// the columns.
///
/// Records are value-like: after a record is handed to the transport layer
/// it is owned exclusively by whichever stage holds it, and crosses the
/// channel boundary by move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<Column>,
    byte_size: usize,
    terminator: bool,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from an ordered column sequence.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let byte_size = columns.iter().map(Column::byte_size).sum();
        Self {
            columns,
            byte_size,
            terminator: false,
        }
    }

    /// Creates the termination sentinel.
    ///
    /// The sentinel carries no columns and is exempt from capacity
    /// accounting. It is pushed through a channel by the transport layer
    /// to signal end-of-stream and must never reach writer business
    /// logic.
    pub fn terminator() -> Self {
        Self {
            columns: Vec::new(),
            byte_size: 0,
            terminator: true,
        }
    }

    /// Returns true when this record is the termination sentinel.
    pub fn is_terminator(&self) -> bool {
        self.terminator
    }

    /// Appends a column, keeping the running byte estimate current.
    pub fn add_column(&mut self, column: Column) {
        self.byte_size += column.byte_size();
        self.columns.push(column);
    }

    /// Returns the column at `index`, if present.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Replaces the column at `index`.
    pub fn set_column(&mut self, index: usize, column: Column) -> Result<()> {
        let len = self.columns.len();
        let slot = self
            .columns
            .get_mut(index)
            .ok_or(RecordError::ColumnOutOfBounds { index, len })?;
        self.byte_size = self.byte_size - slot.byte_size() + column.byte_size();
        *slot = column;
        Ok(())
    }

    /// Number of columns in this record.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Ordered view of the columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consumes the record, yielding its columns.
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Estimated payload size in bytes, the unit of channel byte
    /// accounting.
    pub fn memory_size(&self) -> usize {
        self.byte_size
    }
}
