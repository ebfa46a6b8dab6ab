//! # Product form updates
//!
//! Replacing column `r` of `B` by `a` gives `B' = B E` where `E` is the identity with column `r`
//! replaced by `alpha = B^-1 a`. Each update stores that column, such that `E^-1` can be applied
//! from either side.
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::IndexedVector;

/// Update column or "file".
#[derive(PartialEq, Clone, Debug)]
pub struct EtaFile {
    /// Off-pivot values of the transformed column, sorted by index.
    values: Vec<SparseTuple<f64>>,
    pivot: usize,
    pivot_value: f64,
}

impl EtaFile {
    /// Create a new instance.
    ///
    /// # Arguments
    ///
    /// * `column`: Transformed entering column `B^-1 a`.
    /// * `pivot`: Basis position being replaced.
    /// * `drop_tolerance`: Off-pivot values smaller than this are not stored.
    pub fn new(column: &IndexedVector<f64>, pivot: usize, drop_tolerance: f64) -> Self {
        debug_assert!(pivot < column.len());
        debug_assert_ne!(column[pivot], 0_f64);

        let mut values = column.iter()
            .filter(|&(i, value)| i != pivot && value.abs() >= drop_tolerance)
            .collect::<Vec<_>>();
        values.sort_unstable_by_key(|&(i, _)| i);

        Self {
            values,
            pivot,
            pivot_value: column[pivot],
        }
    }

    /// Column-multiply with the inverse of this matrix (from the right, i.e. `E^-1 x`).
    pub fn apply_right(&self, vector: &mut IndexedVector<f64>) {
        let value = vector[self.pivot];
        if value != 0_f64 {
            let value = value / self.pivot_value;
            vector.set(self.pivot, value);
            for &(i, alpha) in &self.values {
                vector.add(i, -alpha * value);
            }
        }
    }

    /// Row-multiply with the inverse of this matrix (from the left, i.e. `x' E^-1`).
    pub fn apply_left(&self, vector: &mut IndexedVector<f64>) {
        let total = self.values.iter()
            .map(|&(i, alpha)| alpha * vector[i])
            .sum::<f64>();
        let value = vector[self.pivot];
        if value != 0_f64 || total != 0_f64 {
            vector.set(self.pivot, (value - total) / self.pivot_value);
        }
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.values.len() + 1
    }
}
