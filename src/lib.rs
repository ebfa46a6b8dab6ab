//! # A primal simplex solver for bounded linear programs
//!
//! Linear programs of the form
//!
//! ```text
//! minimize c' x   subject to   row_lower <= A x <= row_upper,   column_lower <= x <= column_upper
//! ```
//!
//! are solved with a bounded-variable primal simplex method. Infeasible starting points are not
//! handled with a separate phase: bound violations are priced with a piecewise-linear penalty
//! cost, such that the same pivoting machinery first drives the solution towards feasibility and
//! then towards optimality.
//!
//! The main entry point is [`solve`], or [`PrimalSimplex`] for more control over the
//! factorization and the event hooks.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod error;

pub use algorithm::primal::{PrimalSimplex, solve};
pub use algorithm::primal::settings::{Perturbation, PivotRuleKind, Settings};
pub use data::linear_algebra::matrix::SparseMatrix;
pub use data::linear_program::problem::Problem;
pub use data::linear_program::solution::{Solution, Status};

#[cfg(test)]
mod tests;
