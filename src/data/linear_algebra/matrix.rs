//! # Sparse constraint matrix
//!
//! The constraint matrix is stored twice: column-major, for computing transformed columns, and
//! row-major, for computing a row of the tableau from a row of the basis inverse.
use std::slice::Iter;

use itertools::Itertools;

use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::IndexedVector;
use crate::error::ProblemError;

/// Uses two indices as underlying data structures: a row-major `Vec<Vec<(usize, f64)>>` as well
/// as a column-major `Vec<Vec<(usize, f64)>>`. Indices start at `0`.
///
/// Within each column, entries are sorted by row index and within each row by column index, such
/// that iteration is deterministic regardless of the order in which the data was provided.
#[derive(Clone, Debug, PartialEq)]
pub struct SparseMatrix {
    columns: Vec<Vec<SparseTuple<f64>>>,
    rows: Vec<Vec<SparseTuple<f64>>>,
    nr_rows: usize,
}

impl SparseMatrix {
    /// Create a matrix from compressed sparse column data.
    ///
    /// # Arguments
    ///
    /// * `nr_rows`: Number of rows of the matrix.
    /// * `start`: For each column, the position of its first entry in `index` and `value`.
    /// * `length`: For each column, its number of entries.
    /// * `index`: Row indices, not necessarily sorted within a column.
    /// * `value`: Coefficients, parallel to `index`.
    ///
    /// # Return value
    ///
    /// The matrix, or an error when the arrays are inconsistent, refer to rows that don't exist,
    /// contain NaN or contain a row twice in one column. Explicit zeros are dropped.
    pub fn new(
        nr_rows: usize,
        start: &[usize],
        length: &[usize],
        index: &[usize],
        value: &[f64],
    ) -> Result<Self, ProblemError> {
        if length.len() != start.len() {
            return Err(ProblemError::DimensionMismatch {
                what: "column lengths", expected: start.len(), actual: length.len(),
            });
        }
        if value.len() != index.len() {
            return Err(ProblemError::DimensionMismatch {
                what: "matrix values", expected: index.len(), actual: value.len(),
            });
        }

        let columns = start.iter().zip(length)
            .map(|(&first, &count)| {
                let end = first + count;
                if end > index.len() {
                    Err(ProblemError::DimensionMismatch {
                        what: "matrix indices", expected: end, actual: index.len(),
                    })
                } else {
                    Ok(index[first..end].iter().copied().zip(value[first..end].iter().copied()).collect())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_columns(nr_rows, columns)
    }

    /// Create a matrix from a list of sparse columns.
    pub fn from_columns(
        nr_rows: usize,
        columns: Vec<Vec<SparseTuple<f64>>>,
    ) -> Result<Self, ProblemError> {
        let mut sorted_columns = Vec::with_capacity(columns.len());
        for (j, column) in columns.into_iter().enumerate() {
            let mut column = column.into_iter()
                .filter(|&(_, value)| value != 0_f64)
                .collect::<Vec<_>>();
            for &(i, value) in &column {
                if i >= nr_rows {
                    return Err(ProblemError::RowIndexOutOfRange { column: j, row: i, nr_rows });
                }
                if value.is_nan() {
                    return Err(ProblemError::NotANumber { what: "matrix", index: j });
                }
            }
            column.sort_unstable_by_key(|&(i, _)| i);
            if let Some((&(i, _), _)) = column.iter().tuple_windows().find(|((a, _), (b, _))| a == b) {
                return Err(ProblemError::DuplicateEntry { column: j, row: i });
            }
            sorted_columns.push(column);
        }

        Ok(Self::from_sorted_columns(nr_rows, sorted_columns))
    }

    /// Create a matrix from `(row, column, value)` triplets.
    pub fn from_triplets(
        nr_rows: usize,
        nr_columns: usize,
        triplets: &[(usize, usize, f64)],
    ) -> Result<Self, ProblemError> {
        let mut columns = vec![Vec::new(); nr_columns];
        for &(i, j, value) in triplets {
            if j >= nr_columns {
                return Err(ProblemError::DimensionMismatch {
                    what: "triplet column index", expected: nr_columns, actual: j + 1,
                });
            }
            columns[j].push((i, value));
        }

        Self::from_columns(nr_rows, columns)
    }

    /// Create a matrix from dense rows.
    ///
    /// All rows should have the same length.
    pub fn from_dense(data: &[Vec<f64>]) -> Self {
        let nr_rows = data.len();
        let nr_columns = data.first().map_or(0, Vec::len);
        debug_assert!(data.iter().all(|row| row.len() == nr_columns));
        debug_assert!(data.iter().flatten().all(|v| !v.is_nan()));

        let columns = (0..nr_columns)
            .map(|j| (0..nr_rows)
                .filter(|&i| data[i][j] != 0_f64)
                .map(|i| (i, data[i][j]))
                .collect())
            .collect();

        Self::from_sorted_columns(nr_rows, columns)
    }

    fn from_sorted_columns(nr_rows: usize, columns: Vec<Vec<SparseTuple<f64>>>) -> Self {
        debug_assert!(columns.iter().all(|column| column.is_sorted_by_key(|&(i, _)| i)));

        let mut rows = vec![Vec::new(); nr_rows];
        for (j, column) in columns.iter().enumerate() {
            for &(i, value) in column {
                rows[i].push((j, value));
            }
        }

        Self { columns, rows, nr_rows }
    }

    /// Get all (`row`, `value`) tuples of column `j`.
    pub fn column(&self, j: usize) -> &[SparseTuple<f64>] {
        debug_assert!(j < self.nr_columns());

        &self.columns[j]
    }

    /// Get all (`column`, `value`) tuples of row `i`.
    pub fn row(&self, i: usize) -> Iter<'_, SparseTuple<f64>> {
        debug_assert!(i < self.nr_rows);

        self.rows[i].iter()
    }

    /// Get the number of rows in this matrix.
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Get the number of columns in this matrix.
    pub fn nr_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of explicitly stored values.
    pub fn nr_nonzeros(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Compute `A x` for a dense `x`.
    pub fn times(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.nr_columns());

        let mut result = vec![0_f64; self.nr_rows];
        for (column, &value) in self.columns.iter().zip(x) {
            if value != 0_f64 {
                for &(i, coefficient) in column {
                    result[i] += coefficient * value;
                }
            }
        }
        result
    }

    /// Compute `y' A` for a sparse `y`, adding the result into `result`.
    ///
    /// Iterates over the rows of `A` that `y` touches, so the cost is proportional to the number
    /// of nonzeros in those rows.
    pub fn transpose_times(&self, y: &IndexedVector<f64>, result: &mut IndexedVector<f64>) {
        debug_assert_eq!(y.len(), self.nr_rows);
        debug_assert_eq!(result.len(), self.nr_columns());

        for (i, multiplier) in y.iter() {
            if multiplier != 0_f64 {
                for &(j, coefficient) in &self.rows[i] {
                    result.add(j, multiplier * coefficient);
                }
            }
        }
    }
}
