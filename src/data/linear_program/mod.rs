//! # Representing linear programs
//!
//! A linear program is given by bounds on its rows and columns, an objective and a sparse
//! constraint matrix. Solving it produces a `Solution`.
pub mod problem;
pub mod solution;
