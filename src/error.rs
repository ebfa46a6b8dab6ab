//! # Errors
//!
//! Only contract violations are errors. Numerical trouble during a solve is handled inside the
//! algorithm and, when it can't be recovered from, is reported through
//! [`Status::DualFallback`](crate::data::linear_program::solution::Status::DualFallback).
use thiserror::Error;

/// Problems with the input data, detected before any iteration is done.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    /// Two arrays that should describe the same set of rows or columns differ in length.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the offending array.
        what: &'static str,
        /// Length implied by the rest of the data.
        expected: usize,
        /// Length that was provided.
        actual: usize,
    },
    /// A lower bound exceeds its upper bound.
    #[error("inconsistent bounds for {kind} {index}: lower {lower} > upper {upper}")]
    InconsistentBounds {
        /// Either "row" or "column".
        kind: &'static str,
        /// Index of the row or column.
        index: usize,
        /// Provided lower bound.
        lower: f64,
        /// Provided upper bound.
        upper: f64,
    },
    /// A bound, cost or coefficient is NaN.
    #[error("value for {what} at index {index} is not a number")]
    NotANumber {
        /// Name of the offending array.
        what: &'static str,
        /// Index into that array.
        index: usize,
    },
    /// An objective coefficient is infinite.
    #[error("objective coefficient of column {column} is infinite")]
    InfiniteCost {
        /// Index of the column.
        column: usize,
    },
    /// A coefficient refers to a row that does not exist.
    #[error("row index {row} out of range in column {column} (there are {nr_rows} rows)")]
    RowIndexOutOfRange {
        /// Column containing the entry.
        column: usize,
        /// Offending row index.
        row: usize,
        /// Number of rows of the matrix.
        nr_rows: usize,
    },
    /// A column contains the same row more than once.
    #[error("duplicate entry for row {row} in column {column}")]
    DuplicateEntry {
        /// Column containing the entries.
        column: usize,
        /// Row that appears twice.
        row: usize,
    },
}

/// The basis factorization failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FactorizationError {
    /// No pivot of sufficient magnitude could be found for some of the basis columns.
    #[error("basis is singular: rank {rank} of {dimension}")]
    Singular {
        /// Number of columns that could be pivoted on.
        rank: usize,
        /// Size of the basis.
        dimension: usize,
        /// Basis positions whose column could not be pivoted on.
        dependent: Vec<usize>,
    },
    /// The number of basis columns doesn't match the number of rows.
    #[error("expected {expected} basis columns, got {actual}")]
    DimensionMismatch {
        /// Number of rows.
        expected: usize,
        /// Number of columns provided.
        actual: usize,
    },
}

/// An internal consistency check failed.
///
/// These checks run when debug assertions are enabled or when
/// [`Settings::check_invariants`](crate::algorithm::primal::settings::Settings::check_invariants)
/// is set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantError {
    /// The basis rows don't map one-to-one onto the basic variables.
    #[error("basis is not a bijection: {0}")]
    BasisNotBijective(String),
    /// A sequence's status doesn't agree with its membership of the basis.
    #[error("status of sequence {sequence} doesn't agree with the basis")]
    BasicStatusMismatch {
        /// The offending sequence.
        sequence: usize,
    },
    /// The running count of infeasibilities disagrees with a full recount.
    #[error("infeasibility accounting drifted: incremental {incremental}, recomputed {recomputed}")]
    InfeasibilityAccounting {
        /// Count maintained while iterating.
        incremental: usize,
        /// Count from scratch.
        recomputed: usize,
    },
    /// The running sum of infeasibilities disagrees with a full recomputation.
    #[error("sum of infeasibilities drifted: incremental {incremental:e}, recomputed {recomputed:e}")]
    InfeasibilitySum {
        /// Sum maintained while iterating.
        incremental: f64,
        /// Sum from scratch.
        recomputed: f64,
    },
}

/// Errors returned by a solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// The input is not a valid problem.
    #[error(transparent)]
    Problem(#[from] ProblemError),
    /// The algorithm detected corruption of its own state.
    #[error(transparent)]
    Invariant(#[from] InvariantError),
}
