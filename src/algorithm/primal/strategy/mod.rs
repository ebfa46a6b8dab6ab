//! # Strategies
//!
//! Decisions of the primal simplex method that have several reasonable answers.
pub mod pivot_rule;
