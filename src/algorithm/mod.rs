//! # Algorithms
pub mod factorization;
pub mod primal;
