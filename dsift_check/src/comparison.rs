use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{Error, Result};

/// Number of descriptor rows the pinned regression compares.
pub const DEFAULT_ROW_COUNT: usize = 200;

/// Absolute tolerance of the pinned regression.
pub const DEFAULT_EPSILON: f32 = 2e-6;

/// Elementwise absolute-tolerance comparison over the first `row_count`
/// rows of two matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToleranceCheck {
    /// How many leading rows to compare.
    pub row_count: usize,
    /// Strict upper bound on `|produced - reference|` per cell.
    pub epsilon: f32,
}

impl Default for ToleranceCheck {
    fn default() -> Self {
        ToleranceCheck {
            row_count: DEFAULT_ROW_COUNT,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

/// Summary of a passed comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckReport {
    /// Rows that were compared.
    pub rows_checked: usize,
    /// Width of the compared rows.
    pub descriptor_width: usize,
    /// Largest `|produced - reference|` seen over all compared cells.
    pub max_delta: f32,
}

impl ToleranceCheck {
    /// Creates a check over the first `row_count` rows with the given
    /// absolute tolerance.
    pub fn new(row_count: usize, epsilon: f32) -> Self {
        ToleranceCheck { row_count, epsilon }
    }

    /// Compares `produced` against `reference`.
    ///
    /// Both matrices must have the same width and at least `row_count` rows;
    /// a shorter matrix is an explicit error, never a truncated check. The
    /// first cell (scanning rows, then columns) whose absolute difference
    /// reaches the tolerance fails the comparison, reporting its row and
    /// column. A `NaN` in either matrix fails the cell it occurs in.
    pub fn compare(&self, produced: &DMatrix<f32>, reference: &DMatrix<f32>) -> Result<CheckReport> {
        if produced.ncols() != reference.ncols() {
            return Err(Error::WidthMismatch {
                produced: produced.ncols(),
                reference: reference.ncols(),
            });
        }
        if produced.nrows() < self.row_count {
            return Err(Error::RowOutOfRange {
                which: "produced",
                requested: self.row_count,
                available: produced.nrows(),
            });
        }
        if reference.nrows() < self.row_count {
            return Err(Error::RowOutOfRange {
                which: "reference",
                requested: self.row_count,
                available: reference.nrows(),
            });
        }

        let mut max_delta = 0.0f32;
        for row in 0..self.row_count {
            for col in 0..produced.ncols() {
                let a = produced[(row, col)];
                let b = reference[(row, col)];
                let delta = (a - b).abs();
                // Written so a NaN delta fails rather than slipping through.
                if !(delta < self.epsilon) {
                    return Err(Error::ToleranceExceeded {
                        row,
                        col,
                        produced: a,
                        reference: b,
                        delta,
                        epsilon: self.epsilon,
                    });
                }
                if delta > max_delta {
                    max_delta = delta;
                }
            }
        }

        debug!(
            rows = self.row_count,
            width = produced.ncols(),
            max_delta,
            "tolerance check passed"
        );
        Ok(CheckReport {
            rows_checked: self.row_count,
            descriptor_width: produced.ncols(),
            max_delta,
        })
    }
}
