//! # Linear algebra primitives
//!
//! Linear algebra primitives used to represent data in either a dense or a sparse format.

pub mod matrix;
pub mod vector;

/// A single value in a sparse vector, together with its index.
pub type SparseTuple<F> = (usize, F);

/// Values below this magnitude are treated as zero when vectors are cleaned.
pub const EPSILON: f64 = 1e-12;
