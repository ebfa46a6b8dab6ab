//! # LU decomposition
//!
//! Left-looking decomposition with partial pivoting, updated in product form.
use std::fmt;

use itertools::repeat_n;

use crate::algorithm::factorization::{BasisFactorization, classify_pivot, UpdateQuality, ZERO_PIVOT_TOLERANCE};
use crate::algorithm::factorization::eta_file::EtaFile;
use crate::data::linear_algebra::{EPSILON, SparseTuple};
use crate::data::linear_algebra::vector::IndexedVector;
use crate::error::FactorizationError;

/// Candidates within this fraction of the largest value in the column are acceptable pivots.
const PIVOT_THRESHOLD: f64 = 0.1;
/// Initial number of values the update file may hold, per row.
const UPDATE_AREA_FACTOR: usize = 20;

/// Decompose a matrix `B` into `P B Q = L U` where
///
/// * `P` is a row permutation
/// * `Q` is a column permutation
/// * `L` is lower triangular with `1`'s on the diagonal
/// * `U` is upper triangular
///
/// Both permutations are stored as the order in which rows and columns were pivoted on. Column
/// replacements after the decomposition are kept in a list of eta files.
#[derive(PartialEq, Clone, Debug)]
pub struct LUDecomposition {
    m: usize,
    /// Row pivoted on in each step.
    row_of_step: Vec<usize>,
    /// Basis position pivoted on in each step.
    position_of_step: Vec<usize>,
    /// Lower triangular matrix `L`.
    ///
    /// Column major, indexed by step, one's on diagonal implied. Row indices are those of `B`.
    lower_triangular: Vec<Vec<SparseTuple<f64>>>,
    /// Upper triangular matrix `U` without its diagonal.
    ///
    /// Column major, indexed by step. Row indices are steps.
    upper_triangular: Vec<Vec<SparseTuple<f64>>>,
    diagonal: Vec<f64>,

    updates: Vec<EtaFile>,
    update_capacity: usize,
}

impl LUDecomposition {
    fn update_size(&self) -> usize {
        self.updates.iter().map(EtaFile::len).sum()
    }

    /// Solve `L U y = P a` and write `y` into `vector`, permuted to basis positions.
    fn solve_lower_upper(&self, vector: &mut IndexedVector<f64>) {
        let mut work = vector.values().to_vec();

        let mut y = Vec::with_capacity(self.m);
        for (step, &row) in self.row_of_step.iter().enumerate() {
            let value = work[row];
            if value != 0_f64 {
                for &(i, l) in &self.lower_triangular[step] {
                    work[i] -= l * value;
                }
            }
            y.push(value);
        }

        for step in (0..self.m).rev() {
            let value = y[step];
            if value != 0_f64 {
                let value = value / self.diagonal[step];
                y[step] = value;
                for &(j, u) in &self.upper_triangular[step] {
                    y[j] -= u * value;
                }
            }
        }

        vector.clear();
        for (step, value) in y.into_iter().enumerate() {
            if value.abs() > EPSILON {
                vector.set(self.position_of_step[step], value);
            }
        }
    }

    /// Solve `x' L U = c' Q` and write `x` into `vector`, permuted to rows.
    fn solve_lower_upper_transposed(&self, vector: &mut IndexedVector<f64>) {
        let mut z = self.position_of_step.iter()
            .map(|&position| vector[position])
            .collect::<Vec<_>>();
        for step in 0..self.m {
            let total = self.upper_triangular[step].iter()
                .map(|&(j, u)| u * z[j])
                .sum::<f64>();
            z[step] = (z[step] - total) / self.diagonal[step];
        }

        let mut by_row = vec![0_f64; self.m];
        for step in (0..self.m).rev() {
            let total = self.lower_triangular[step].iter()
                .map(|&(i, l)| l * by_row[i])
                .sum::<f64>();
            by_row[self.row_of_step[step]] = z[step] - total;
        }

        vector.clear();
        for (row, value) in by_row.into_iter().enumerate() {
            if value.abs() > EPSILON {
                vector.set(row, value);
            }
        }
    }
}

impl BasisFactorization for LUDecomposition {
    fn new(m: usize) -> Self {
        Self {
            m,
            row_of_step: (0..m).collect(),
            position_of_step: (0..m).collect(),
            lower_triangular: vec![Vec::new(); m],
            upper_triangular: vec![Vec::new(); m],
            diagonal: repeat_n(1_f64, m).collect(),
            updates: Vec::new(),
            update_capacity: UPDATE_AREA_FACTOR * m.max(1),
        }
    }

    fn factorize(&mut self, columns: &[Vec<SparseTuple<f64>>]) -> Result<(), FactorizationError> {
        let m = self.m;
        if columns.len() != m {
            return Err(FactorizationError::DimensionMismatch { expected: m, actual: columns.len() });
        }

        // Sparse columns first, such that the many logical columns cause no fill
        let mut order = (0..m).collect::<Vec<_>>();
        order.sort_by_key(|&position| columns[position].len());

        let mut row_pivoted = vec![false; m];
        let mut row_of_step: Vec<usize> = Vec::with_capacity(m);
        let mut position_of_step = Vec::with_capacity(m);
        let mut lower_triangular: Vec<Vec<SparseTuple<f64>>> = Vec::with_capacity(m);
        let mut upper_triangular = Vec::with_capacity(m);
        let mut diagonal = Vec::with_capacity(m);
        let mut dependent = Vec::new();

        let mut work = vec![0_f64; m];
        for position in order {
            for &(i, value) in &columns[position] {
                work[i] = value;
            }

            // Eliminate using the previous steps
            let mut upper = Vec::new();
            for (step, &row) in row_of_step.iter().enumerate() {
                let value = work[row];
                if value != 0_f64 {
                    for &(i, l) in &lower_triangular[step] {
                        work[i] -= l * value;
                    }
                    if value.abs() > EPSILON {
                        upper.push((step, value));
                    }
                }
            }

            let largest = (0..m)
                .filter(|&i| !row_pivoted[i])
                .map(|i| work[i].abs())
                .fold(0_f64, f64::max);
            if largest < ZERO_PIVOT_TOLERANCE {
                dependent.push(position);
                work.iter_mut().for_each(|v| *v = 0_f64);
                continue;
            }
            // Among the acceptable candidates, the lowest row index keeps the result deterministic
            let pivot_row = (0..m)
                .filter(|&i| !row_pivoted[i])
                .find(|&i| work[i].abs() >= PIVOT_THRESHOLD * largest)
                .unwrap_or_default();
            let pivot_value = work[pivot_row];

            let lower = (0..m)
                .filter(|&i| !row_pivoted[i] && i != pivot_row)
                .filter(|&i| work[i].abs() > EPSILON)
                .map(|i| (i, work[i] / pivot_value))
                .collect::<Vec<_>>();

            row_pivoted[pivot_row] = true;
            row_of_step.push(pivot_row);
            position_of_step.push(position);
            lower_triangular.push(lower);
            upper_triangular.push(upper);
            diagonal.push(pivot_value);
            work.iter_mut().for_each(|v| *v = 0_f64);
        }

        if !dependent.is_empty() {
            return Err(FactorizationError::Singular {
                rank: m - dependent.len(),
                dimension: m,
                dependent,
            });
        }

        self.row_of_step = row_of_step;
        self.position_of_step = position_of_step;
        self.lower_triangular = lower_triangular;
        self.upper_triangular = upper_triangular;
        self.diagonal = diagonal;
        self.updates.clear();

        Ok(())
    }

    fn ftran(&self, vector: &mut IndexedVector<f64>) {
        debug_assert_eq!(vector.len(), self.m);

        self.solve_lower_upper(vector);
        for update in &self.updates {
            update.apply_right(vector);
        }
    }

    fn btran(&self, vector: &mut IndexedVector<f64>) {
        debug_assert_eq!(vector.len(), self.m);

        for update in self.updates.iter().rev() {
            update.apply_left(vector);
        }
        self.solve_lower_upper_transposed(vector);
    }

    fn check_replace_column(
        &self,
        pivot_row: usize,
        column: &IndexedVector<f64>,
        btran_alpha: f64,
    ) -> UpdateQuality {
        debug_assert!(pivot_row < self.m);

        if self.update_size() + column.nr_nonzeros() > self.update_capacity {
            return UpdateQuality::OutOfMemory;
        }

        classify_pivot(column[pivot_row], btran_alpha)
    }

    fn replace_column(&mut self, pivot_row: usize, column: &IndexedVector<f64>) {
        debug_assert!(column[pivot_row].abs() >= ZERO_PIVOT_TOLERANCE);

        self.updates.push(EtaFile::new(column, pivot_row, EPSILON));
    }

    fn pivots(&self) -> usize {
        self.updates.len()
    }

    fn m(&self) -> usize {
        self.m
    }

    fn grow(&mut self) {
        self.update_capacity += self.update_capacity / 10 + self.m;
    }
}

impl fmt::Display for LUDecomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lower triangular:")?;
        for (step, column) in self.lower_triangular.iter().enumerate() {
            writeln!(f, "{}: {:?}", step, column)?;
        }
        writeln!(f, "Upper triangular:")?;
        for (step, column) in self.upper_triangular.iter().enumerate() {
            writeln!(f, "{}: {:?} | {}", step, column, self.diagonal[step])?;
        }
        writeln!(f, "Row order: {:?}", self.row_of_step)?;
        writeln!(f, "Column order: {:?}", self.position_of_step)?;
        writeln!(f, "Updates: {}", self.updates.len())
    }
}
