//! # Vector types for the simplex method
//!
//! The transformed columns and rows of the simplex method are sparse, but need random access by
//! index. The `IndexedVector` keeps a dense array of values together with a list of the indices
//! that are in use, so both are cheap.
use std::fmt::{Debug, Display, Error, Formatter};
use std::ops::Index;

use num_traits::Float;

use crate::data::linear_algebra::SparseTuple;

/// Dense storage with a list of the positions that might be nonzero.
///
/// Every index in `indices` is also marked in `present`, and every position not marked is zero.
/// Positions may be marked while their value became zero through cancellation; use `clean` to
/// drop them.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedVector<F> {
    values: Vec<F>,
    indices: Vec<usize>,
    present: Vec<bool>,
}

impl<F: Float> IndexedVector<F> {
    /// Create a vector of zeros.
    ///
    /// # Arguments
    ///
    /// * `len`: Length of the vector represented.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![F::zero(); len],
            indices: Vec::new(),
            present: vec![false; len],
        }
    }

    /// Create a vector from sparse tuples.
    ///
    /// Duplicate indices are summed.
    pub fn from_tuples(tuples: impl IntoIterator<Item=SparseTuple<F>>, len: usize) -> Self {
        let mut vector = Self::new(len);
        for (i, value) in tuples {
            vector.add(i, value);
        }
        vector
    }

    /// Create a vector from dense data, marking only the nonzero values.
    pub fn from_dense(values: Vec<F>) -> Self {
        let len = values.len();
        let indices = (0..len).filter(|&i| !values[i].is_zero()).collect::<Vec<_>>();
        let mut present = vec![false; len];
        for &i in &indices {
            present[i] = true;
        }

        Self { values, indices, present }
    }

    /// Standard basis vector `e_i`.
    pub fn unit(i: usize, len: usize) -> Self {
        debug_assert!(i < len);

        let mut vector = Self::new(len);
        vector.set(i, F::one());
        vector
    }

    /// Set all values to zero, in time proportional to the number of marked positions.
    pub fn clear(&mut self) {
        for &i in &self.indices {
            self.values[i] = F::zero();
            self.present[i] = false;
        }
        self.indices.clear();

        debug_assert!(self.values.iter().all(|v| v.is_zero()));
    }

    /// Add `value` to the value at index `i`.
    pub fn add(&mut self, i: usize, value: F) {
        debug_assert!(i < self.len());

        if !self.present[i] {
            self.present[i] = true;
            self.indices.push(i);
        }
        self.values[i] = self.values[i] + value;
    }

    /// Overwrite the value at index `i`.
    pub fn set(&mut self, i: usize, value: F) {
        debug_assert!(i < self.len());

        if !self.present[i] {
            self.present[i] = true;
            self.indices.push(i);
        }
        self.values[i] = value;
    }

    /// Value at index `i`.
    pub fn get(&self, i: usize) -> F {
        self.values[i]
    }

    /// Marked positions, in insertion order unless `sort_indices` was called.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Dense view of all values.
    pub fn values(&self) -> &[F] {
        &self.values
    }

    /// Iterate over the marked `(index, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item=SparseTuple<F>> + '_ {
        self.indices.iter().map(move |&i| (i, self.values[i]))
    }

    /// Length of the vector represented.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector has length zero.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of marked positions.
    pub fn nr_nonzeros(&self) -> usize {
        self.indices.len()
    }

    /// Order the marked positions by index, for deterministic iteration.
    pub fn sort_indices(&mut self) {
        self.indices.sort_unstable();
    }

    /// Remove all values with a magnitude below `tolerance`.
    pub fn clean(&mut self, tolerance: F) {
        let values = &mut self.values;
        let present = &mut self.present;
        self.indices.retain(|&i| {
            if values[i].abs() < tolerance {
                values[i] = F::zero();
                present[i] = false;
                false
            } else {
                true
            }
        });
    }

    /// Inner product with a dense slice of the same length.
    pub fn dot(&self, other: &[F]) -> F {
        debug_assert_eq!(other.len(), self.len());

        self.iter().fold(F::zero(), |total, (i, value)| total + value * other[i])
    }

    /// Inner product with sparse tuples.
    pub fn sparse_dot<'a>(&self, tuples: impl IntoIterator<Item=&'a SparseTuple<F>>) -> F
    where
        F: 'a,
    {
        tuples.into_iter()
            .filter(|&&(i, _)| self.present[i])
            .fold(F::zero(), |total, &(i, value)| total + value * self.values[i])
    }

    /// Largest magnitude of any value.
    pub fn infinity_norm(&self) -> F {
        self.iter().fold(F::zero(), |largest, (_, value)| largest.max(value.abs()))
    }

    /// Sum of the squares of the values.
    pub fn squared_norm(&self) -> F {
        self.iter().fold(F::zero(), |total, (_, value)| total + value * value)
    }
}

impl<F> Index<usize> for IndexedVector<F> {
    type Output = F;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl<F: Float + Display> Display for IndexedVector<F> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "[")?;
        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        for (k, i) in sorted.into_iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", i, self.values[i])?;
        }
        write!(f, "]")
    }
}
