//! Synthetic Row Cursor
//!
//! Forward-only cursor over pre-supplied tabular data, plus typed helpers
//! that turn record slices into cursors.

use super::types::Value;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Row cursor handed back by query calls
///
/// Columns are fixed for the cursor's lifetime. The read position starts at 0
/// and only moves forward; once it reaches the row count every further read
/// reports exhaustion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    #[serde(skip)]
    position: usize,
}

impl RowCursor {
    /// Create a cursor from column names and row data
    ///
    /// Rows are not checked against the column count here; a row of the wrong
    /// width fails when it is read.
    pub fn new<C, S>(columns: C, rows: Vec<Vec<Value>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
            position: 0,
        }
    }

    /// Empty cursor: no columns, no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cursor from records that know their own row shape
    pub fn from_records<T: IntoRow>(records: &[T]) -> Self {
        Self::new(
            T::columns().iter().copied(),
            records.iter().map(IntoRow::to_row).collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet read
    pub fn remaining(&self) -> usize {
        self.rows.len().saturating_sub(self.position)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Copy the next row into `dest`
    ///
    /// Returns `Ok(false)` at end of data (repeatedly, never wrapping), and
    /// `ArityMismatch` if `dest` is not exactly as wide as the row.
    pub fn next_into(&mut self, dest: &mut [Value]) -> Result<bool> {
        let Some(row) = self.rows.get(self.position) else {
            return Ok(false);
        };

        if dest.len() != row.len() {
            return Err(Error::ArityMismatch {
                expected: row.len(),
                actual: dest.len(),
            });
        }

        dest.clone_from_slice(row);
        self.position += 1;
        trace!(position = self.position, total = self.rows.len(), "cursor advanced");
        Ok(true)
    }

    /// Cursors hold no external resource.
    pub fn close(&mut self) {}

    /// Same data, read position back at the first row
    pub(crate) fn rewound(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            position: 0,
        }
    }
}

impl Iterator for RowCursor {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.get(self.position)?.clone();
        self.position += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// A record type that can be laid out as a row
///
/// `columns()` and `to_row()` must agree on order and width.
pub trait IntoRow {
    fn columns() -> &'static [&'static str];

    fn to_row(&self) -> Vec<Value>;
}

type Extractor<'a, T> = Box<dyn Fn(&T) -> Value + 'a>;

/// Builds a cursor from records through named value extractors
///
/// Columns appear in the order they were declared; rows follow record order.
pub struct RowsBuilder<'a, T> {
    columns: Vec<(String, Extractor<'a, T>)>,
}

impl<'a, T> Default for RowsBuilder<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> RowsBuilder<'a, T> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn column<F>(mut self, name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> Value + 'a,
    {
        self.columns.push((name.into(), Box::new(extract)));
        self
    }

    pub fn build<'r, I>(&self, records: I) -> RowCursor
    where
        I: IntoIterator<Item = &'r T>,
        T: 'r,
    {
        let rows = records
            .into_iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|(_, extract)| extract(record))
                    .collect()
            })
            .collect();

        RowCursor::new(self.columns.iter().map(|(name, _)| name.clone()), rows)
    }
}
