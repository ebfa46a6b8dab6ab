//! # Basis factorization
//!
//! The simplex method needs to solve linear systems with the basis matrix `B` and its transpose:
//! `B x = a` to compute a transformed column ("ftran") and `x' B = c'` to compute duals and rows
//! of the basis inverse ("btran"). After each pivot, one column of `B` is replaced.
//!
//! The algorithm only depends on the `BasisFactorization` trait. The default implementation is an
//! LU decomposition with a file of product form updates.
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::IndexedVector;
use crate::error::FactorizationError;

pub mod lower_upper;
mod eta_file;

/// Pivots smaller than this in magnitude are treated as zero.
pub const ZERO_PIVOT_TOLERANCE: f64 = 1e-11;

/// How trustworthy a column replacement would be.
///
/// The transformed column gives the pivot element as computed through a forward solve; the row
/// of the basis inverse gives it through a backward solve. How much they disagree measures the
/// error that accumulated in the factorization.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UpdateQuality {
    /// The two computations agree.
    Stable,
    /// Small disagreement: the update can be done, but the basis should be refactorized soon.
    SlightError,
    /// Large disagreement: the update should not be done and the basis needs refactorization.
    MajorError,
    /// The update storage is full. It has to grow and the basis needs refactorization.
    OutOfMemory,
    /// The pivot element is too small.
    Singular,
}

/// Maintains a representation of the inverse of the basis matrix.
///
/// Basis positions are the indices `0..m` of the columns of `B`. Forward solves take a vector
/// indexed by row and produce one indexed by basis position; backward solves the other way
/// around.
pub trait BasisFactorization {
    /// Create an instance for bases of `m` rows.
    ///
    /// The instance represents the identity until `factorize` is called.
    fn new(m: usize) -> Self
    where
        Self: Sized;

    /// Factorize a basis from scratch, discarding all updates.
    ///
    /// # Arguments
    ///
    /// * `columns`: For each basis position, the sparse column of `B` at that position.
    ///
    /// # Return value
    ///
    /// An error if the columns are linearly dependent, listing the positions that could not be
    /// pivoted on. The instance should not be used for solves until a factorization succeeded.
    fn factorize(&mut self, columns: &[Vec<SparseTuple<f64>>]) -> Result<(), FactorizationError>;

    /// Solve `B x = a` in place.
    fn ftran(&self, vector: &mut IndexedVector<f64>);

    /// Solve `x' B = c'` in place.
    fn btran(&self, vector: &mut IndexedVector<f64>);

    /// Judge the replacement of the column at a basis position, without doing it.
    ///
    /// # Arguments
    ///
    /// * `pivot_row`: Basis position that will change.
    /// * `column`: The new column, transformed by `ftran`.
    /// * `btran_alpha`: The pivot element as computed from the row of the basis inverse.
    fn check_replace_column(
        &self,
        pivot_row: usize,
        column: &IndexedVector<f64>,
        btran_alpha: f64,
    ) -> UpdateQuality;

    /// Replace the column at a basis position.
    ///
    /// Should only be called after `check_replace_column` judged the replacement acceptable.
    fn replace_column(&mut self, pivot_row: usize, column: &IndexedVector<f64>);

    /// Number of column replacements since the last factorization.
    fn pivots(&self) -> usize;

    /// Size of the basis.
    fn m(&self) -> usize;

    /// Increase the storage for updates after `UpdateQuality::OutOfMemory`.
    fn grow(&mut self);
}

/// Judge the agreement of the pivot element as computed in two different ways.
pub(crate) fn classify_pivot(ftran_alpha: f64, btran_alpha: f64) -> UpdateQuality {
    if ftran_alpha.abs() < ZERO_PIVOT_TOLERANCE || btran_alpha.abs() < ZERO_PIVOT_TOLERANCE {
        return UpdateQuality::Singular;
    }

    let difference = (ftran_alpha - btran_alpha).abs();
    let scale = 1_f64 + ftran_alpha.abs();
    if difference <= 1e-9 * scale {
        UpdateQuality::Stable
    } else if difference <= 1e-7 * scale {
        UpdateQuality::SlightError
    } else {
        UpdateQuality::MajorError
    }
}
