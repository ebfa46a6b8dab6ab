//! # Bounded linear programs
//!
//! The input to the solver: `minimize c' x` subject to `row_lower <= A x <= row_upper` and
//! `column_lower <= x <= column_upper`. Infinite bounds are represented by `f64::INFINITY` and
//! `f64::NEG_INFINITY`; any bound with a magnitude of at least `INFINITE_BOUND` is treated as
//! infinite.
use crate::data::linear_algebra::matrix::SparseMatrix;
use crate::data::linear_algebra::SparseTuple;
use crate::error::ProblemError;

/// Bounds at least this large in magnitude are considered absent.
pub const INFINITE_BOUND: f64 = 1e30;

/// A validated linear program.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
    column_lower: Vec<f64>,
    column_upper: Vec<f64>,
    objective: Vec<f64>,
    matrix: SparseMatrix,
}

impl Problem {
    /// Create a new problem, validating the input.
    ///
    /// # Arguments
    ///
    /// * `row_lower`, `row_upper`: Bounds on the row activities `A x`, one per row of `matrix`.
    /// * `column_lower`, `column_upper`: Bounds on the variables, one per column of `matrix`.
    /// * `objective`: Cost per column, to be minimized.
    /// * `matrix`: The constraint matrix.
    ///
    /// # Return value
    ///
    /// The problem, or the first violation of the input contract that was found.
    pub fn new(
        row_lower: Vec<f64>,
        row_upper: Vec<f64>,
        column_lower: Vec<f64>,
        column_upper: Vec<f64>,
        objective: Vec<f64>,
        matrix: SparseMatrix,
    ) -> Result<Self, ProblemError> {
        let problem = Self {
            row_lower: normalize_lower(row_lower),
            row_upper: normalize_upper(row_upper),
            column_lower: normalize_lower(column_lower),
            column_upper: normalize_upper(column_upper),
            objective,
            matrix,
        };
        problem.validate()?;

        Ok(problem)
    }

    fn validate(&self) -> Result<(), ProblemError> {
        let nr_rows = self.matrix.nr_rows();
        let nr_columns = self.matrix.nr_columns();

        for (what, values, expected) in [
            ("row lower bounds", &self.row_lower, nr_rows),
            ("row upper bounds", &self.row_upper, nr_rows),
            ("column lower bounds", &self.column_lower, nr_columns),
            ("column upper bounds", &self.column_upper, nr_columns),
            ("objective", &self.objective, nr_columns),
        ] {
            if values.len() != expected {
                return Err(ProblemError::DimensionMismatch { what, expected, actual: values.len() });
            }
            if let Some(index) = values.iter().position(|v| v.is_nan()) {
                return Err(ProblemError::NotANumber { what, index });
            }
        }

        if let Some(column) = self.objective.iter().position(|v| v.is_infinite()) {
            return Err(ProblemError::InfiniteCost { column });
        }

        for (kind, lower, upper) in [
            ("row", &self.row_lower, &self.row_upper),
            ("column", &self.column_lower, &self.column_upper),
        ] {
            for (index, (&lower, &upper)) in lower.iter().zip(upper).enumerate() {
                if lower > upper || lower == f64::INFINITY || upper == f64::NEG_INFINITY {
                    return Err(ProblemError::InconsistentBounds { kind, index, lower, upper });
                }
            }
        }

        Ok(())
    }

    /// Append a row.
    ///
    /// # Arguments
    ///
    /// * `lower`, `upper`: Bounds on the activity of the new row.
    /// * `entries`: `(column, coefficient)` pairs.
    pub fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        entries: &[SparseTuple<f64>],
    ) -> Result<(), ProblemError> {
        let new_row = self.matrix.nr_rows();
        let mut columns = (0..self.matrix.nr_columns())
            .map(|j| self.matrix.column(j).to_vec())
            .collect::<Vec<_>>();
        for &(j, value) in entries {
            if j >= columns.len() {
                return Err(ProblemError::DimensionMismatch {
                    what: "row entry column index", expected: columns.len(), actual: j + 1,
                });
            }
            columns[j].push((new_row, value));
        }

        let mut extended = self.clone();
        extended.matrix = SparseMatrix::from_columns(new_row + 1, columns)?;
        extended.row_lower.push(normalize_lower(vec![lower])[0]);
        extended.row_upper.push(normalize_upper(vec![upper])[0]);
        extended.validate()?;

        *self = extended;
        Ok(())
    }

    /// Number of constraints.
    pub fn nr_rows(&self) -> usize {
        self.matrix.nr_rows()
    }

    /// Number of variables.
    pub fn nr_columns(&self) -> usize {
        self.matrix.nr_columns()
    }

    /// Lower bounds on the row activities.
    pub fn row_lower(&self) -> &[f64] {
        &self.row_lower
    }

    /// Upper bounds on the row activities.
    pub fn row_upper(&self) -> &[f64] {
        &self.row_upper
    }

    /// Lower bounds on the variables.
    pub fn column_lower(&self) -> &[f64] {
        &self.column_lower
    }

    /// Upper bounds on the variables.
    pub fn column_upper(&self) -> &[f64] {
        &self.column_upper
    }

    /// Cost per variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// The constraint matrix.
    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }
}

fn normalize_lower(mut bounds: Vec<f64>) -> Vec<f64> {
    for bound in &mut bounds {
        if *bound <= -INFINITE_BOUND {
            *bound = f64::NEG_INFINITY;
        }
    }
    bounds
}

fn normalize_upper(mut bounds: Vec<f64>) -> Vec<f64> {
    for bound in &mut bounds {
        if *bound >= INFINITE_BOUND {
            *bound = f64::INFINITY;
        }
    }
    bounds
}
