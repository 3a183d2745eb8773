//! Offset tables for compressed variable-length relations.
//!
//! A relation with `rows` variable-length rows is stored as one flat entry
//! array plus an offset table: row `i` owns `offsets[i]..offsets[i + 1]`.
//! This is the same layout as the row pointer of a CSR matrix.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Row offsets of a compressed relation (length = rows + 1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    offsets: Vec<usize>,
}

impl OffsetTable {
    /// Creates an empty table with zero rows.
    pub fn new() -> Self {
        Self { offsets: vec![0] }
    }

    /// Builds the table from per-row entry counts (exclusive prefix sum).
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let counts = counts.into_iter();
        let mut offsets = Vec::with_capacity(counts.size_hint().0 + 1);
        let mut total = 0usize;
        offsets.push(0);
        for count in counts {
            total += count;
            offsets.push(total);
        }
        Self { offsets }
    }

    /// Builds a table where every row has the same number of entries.
    pub fn uniform(rows: usize, per_row: usize) -> Self {
        Self {
            offsets: (0..=rows).map(|i| i * per_row).collect(),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Total number of entries across all rows.
    #[inline]
    pub fn total(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Entry range owned by row `row`.
    #[inline]
    pub fn range(&self, row: usize) -> Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }

    /// Number of entries in row `row`.
    #[inline]
    pub fn count(&self, row: usize) -> usize {
        self.offsets[row + 1] - self.offsets[row]
    }

    /// Raw offsets (length = rows + 1).
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }

    /// Finds the row owning flat entry `entry` (binary search).
    pub fn row_of(&self, entry: usize) -> Option<usize> {
        if entry >= self.total() {
            return None;
        }
        // partition_point returns the first offset strictly greater than `entry`.
        Some(self.offsets.partition_point(|&o| o <= entry) - 1)
    }
}
