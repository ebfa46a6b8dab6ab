//! # Per-sequence state of the simplex method
//!
//! Rows and columns are treated uniformly as "sequences": the logical variable of row `i` is
//! sequence `i` and column `j` is sequence `nr_rows + j`. The logical of a row equals the row
//! activity, such that the constraints read `A x - s = 0` and the logical columns are `-e_i`.
//!
//! All per-sequence arrays are owned by the `Workspace` and indexed by sequence.
use crate::algorithm::factorization::BasisFactorization;
use crate::data::linear_algebra::matrix::SparseMatrix;
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::problem::Problem;
use crate::data::linear_program::solution::VariableStatus;
use crate::error::InvariantError;

/// Bounds, costs, values and statuses of all sequences, together with the basis.
#[derive(Clone, Debug)]
pub struct Workspace {
    matrix: SparseMatrix,
    nr_rows: usize,

    /// Live lower bounds. These may be fake while a sequence is infeasible or perturbed.
    pub(crate) lower: Vec<f64>,
    /// Live upper bounds.
    pub(crate) upper: Vec<f64>,
    /// Live costs, including penalties for infeasibility.
    pub(crate) cost: Vec<f64>,
    /// Current values.
    pub(crate) solution: Vec<f64>,
    /// Reduced costs. Zero for basic sequences.
    pub(crate) dj: Vec<f64>,
    pub(crate) status: Vec<VariableStatus>,
    /// Sequences temporarily excluded from pricing.
    pub(crate) flagged: Vec<bool>,
    /// Basic sequence at each basis position.
    pub(crate) pivot_variable: Vec<usize>,
}

impl Workspace {
    /// Set up the slack basis: all logicals basic, all columns at a bound.
    pub fn new(problem: &Problem) -> Self {
        let nr_rows = problem.nr_rows();
        let nr_sequences = nr_rows + problem.nr_columns();

        let lower = problem.row_lower().iter().chain(problem.column_lower()).copied().collect::<Vec<_>>();
        let upper = problem.row_upper().iter().chain(problem.column_upper()).copied().collect::<Vec<_>>();
        let cost = itertools::repeat_n(0_f64, nr_rows).chain(problem.objective().iter().copied()).collect();

        let mut workspace = Self {
            matrix: problem.matrix().clone(),
            nr_rows,
            lower,
            upper,
            cost,
            solution: vec![0_f64; nr_sequences],
            dj: vec![0_f64; nr_sequences],
            status: vec![VariableStatus::Basic; nr_sequences],
            flagged: vec![false; nr_sequences],
            pivot_variable: (0..nr_rows).collect(),
        };

        for sequence in nr_rows..nr_sequences {
            let (status, value) = initial_nonbasic(workspace.lower[sequence], workspace.upper[sequence]);
            workspace.status[sequence] = status;
            workspace.solution[sequence] = value;
        }

        workspace
    }

    /// Number of rows, which is also the size of the basis.
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Number of structural columns.
    pub fn nr_columns(&self) -> usize {
        self.matrix.nr_columns()
    }

    /// Number of rows plus the number of columns.
    pub fn nr_sequences(&self) -> usize {
        self.lower.len()
    }

    /// Whether a sequence is the logical variable of a row.
    pub fn is_logical(&self, sequence: usize) -> bool {
        sequence < self.nr_rows
    }

    /// Status of a sequence.
    pub fn status(&self, sequence: usize) -> VariableStatus {
        self.status[sequence]
    }

    /// Value of a sequence.
    pub fn value(&self, sequence: usize) -> f64 {
        self.solution[sequence]
    }

    /// The column of `[-I A]` belonging to a sequence.
    pub fn column(&self, sequence: usize) -> Vec<SparseTuple<f64>> {
        if self.is_logical(sequence) {
            vec![(sequence, -1_f64)]
        } else {
            self.matrix.column(sequence - self.nr_rows).to_vec()
        }
    }

    /// Add a multiple of the column of a sequence to a vector indexed by row.
    pub fn add_column(&self, sequence: usize, multiplier: f64, vector: &mut IndexedVector<f64>) {
        if self.is_logical(sequence) {
            vector.add(sequence, -multiplier);
        } else {
            for &(i, value) in self.matrix.column(sequence - self.nr_rows) {
                vector.add(i, multiplier * value);
            }
        }
    }

    /// Inner product of a vector indexed by row with the column of a sequence.
    pub fn column_dot(&self, sequence: usize, vector: &IndexedVector<f64>) -> f64 {
        if self.is_logical(sequence) {
            -vector[sequence]
        } else {
            vector.sparse_dot(self.matrix.column(sequence - self.nr_rows))
        }
    }

    /// Compute `B^-1 a_q` for a sequence `q`.
    pub fn transformed_column<BF: BasisFactorization>(
        &self,
        sequence: usize,
        factorization: &BF,
        column: &mut IndexedVector<f64>,
    ) {
        column.clear();
        self.add_column(sequence, 1_f64, column);
        factorization.ftran(column);
    }

    /// Compute `rho' [-I A]` for a vector `rho` indexed by row.
    ///
    /// The result is indexed by sequence; values of basic sequences are also computed.
    pub fn tableau_row(&self, rho: &IndexedVector<f64>, row: &mut IndexedVector<f64>) {
        debug_assert_eq!(row.len(), self.nr_sequences());

        row.clear();
        for (i, value) in rho.iter() {
            if value != 0_f64 {
                row.add(i, -value);
                for &(j, coefficient) in self.matrix.row(i) {
                    row.add(self.nr_rows + j, value * coefficient);
                }
            }
        }
    }

    /// Columns of the basis matrix, in basis position order.
    pub fn basis_columns(&self) -> Vec<Vec<SparseTuple<f64>>> {
        self.pivot_variable.iter().map(|&sequence| self.column(sequence)).collect()
    }

    /// Recompute the values of the basic sequences from the nonbasic ones.
    pub fn compute_primal<BF: BasisFactorization>(&mut self, factorization: &BF) {
        let mut rhs = IndexedVector::new(self.nr_rows);
        for sequence in 0..self.nr_sequences() {
            if !self.status[sequence].is_basic() && self.solution[sequence] != 0_f64 {
                self.add_column(sequence, -self.solution[sequence], &mut rhs);
            }
        }

        factorization.ftran(&mut rhs);
        for row in 0..self.nr_rows {
            self.solution[self.pivot_variable[row]] = rhs[row];
        }
    }

    /// Recompute the duals and all reduced costs from the live costs.
    ///
    /// # Return value
    ///
    /// The duals, indexed by row.
    pub fn compute_duals<BF: BasisFactorization>(&mut self, factorization: &BF) -> IndexedVector<f64> {
        let mut duals = IndexedVector::new(self.nr_rows);
        for (row, &sequence) in self.pivot_variable.iter().enumerate() {
            if self.cost[sequence] != 0_f64 {
                duals.set(row, self.cost[sequence]);
            }
        }
        factorization.btran(&mut duals);

        let mut products = IndexedVector::new(self.nr_columns());
        self.matrix.transpose_times(&duals, &mut products);
        for sequence in 0..self.nr_sequences() {
            self.dj[sequence] = if self.status[sequence].is_basic() {
                0_f64
            } else if self.is_logical(sequence) {
                self.cost[sequence] + duals[sequence]
            } else {
                self.cost[sequence] - products[sequence - self.nr_rows]
            };
        }

        duals
    }

    /// Largest violation of `A x - s = 0`.
    pub fn primal_residual(&self) -> f64 {
        let activity = self.matrix.times(&self.solution[self.nr_rows..]);
        activity.iter().zip(&self.solution[..self.nr_rows])
            .map(|(a, s)| (a - s).abs())
            .fold(0_f64, f64::max)
    }

    /// Largest reduced cost of a basic sequence with respect to some duals.
    pub fn dual_residual(&self, duals: &IndexedVector<f64>) -> f64 {
        self.pivot_variable.iter()
            .map(|&sequence| (self.cost[sequence] - self.column_dot(sequence, duals)).abs())
            .fold(0_f64, f64::max)
    }

    /// Exclude a sequence from pricing until `unflag` is called.
    pub fn flag(&mut self, sequence: usize) {
        self.flagged[sequence] = true;
    }

    /// Whether a sequence is excluded from pricing.
    pub fn is_flagged(&self, sequence: usize) -> bool {
        self.flagged[sequence]
    }

    /// Number of flagged sequences.
    pub fn nr_flagged(&self) -> usize {
        self.flagged.iter().filter(|&&flagged| flagged).count()
    }

    /// Clear all flags.
    ///
    /// # Return value
    ///
    /// The number of sequences that were flagged.
    pub fn unflag(&mut self) -> usize {
        let count = self.nr_flagged();
        self.flagged.iter_mut().for_each(|flagged| *flagged = false);
        count
    }

    /// Copy of the basis and the values, to go back to when a later basis turns out singular.
    pub fn save_basis(&self) -> SavedBasis {
        SavedBasis {
            status: self.status.clone(),
            solution: self.solution.clone(),
            pivot_variable: self.pivot_variable.clone(),
        }
    }

    /// Go back to a saved basis.
    pub fn restore_basis(&mut self, saved: SavedBasis) {
        debug_assert_eq!(saved.status.len(), self.nr_sequences());

        self.status = saved.status;
        self.solution = saved.solution;
        self.pivot_variable = saved.pivot_variable;
    }

    /// Make all logicals basic, keeping the values of the columns that leave the basis.
    pub fn reset_to_slack_basis(&mut self, tolerance: f64) {
        for sequence in 0..self.nr_sequences() {
            if self.is_logical(sequence) {
                self.status[sequence] = VariableStatus::Basic;
            } else if self.status[sequence].is_basic() {
                self.status[sequence] = nonbasic_status(
                    self.lower[sequence], self.upper[sequence], self.solution[sequence], tolerance,
                );
            }
        }
        self.pivot_variable = (0..self.nr_rows).collect();
    }

    /// Whether at each basis position a basic sequence sits, and no sequence twice.
    pub fn check_basis(&self) -> Result<(), InvariantError> {
        if self.pivot_variable.len() != self.nr_rows {
            return Err(InvariantError::BasisNotBijective(format!(
                "{} basis positions for {} rows", self.pivot_variable.len(), self.nr_rows,
            )));
        }

        let mut seen = vec![false; self.nr_sequences()];
        for (row, &sequence) in self.pivot_variable.iter().enumerate() {
            if sequence >= self.nr_sequences() || seen[sequence] {
                return Err(InvariantError::BasisNotBijective(format!(
                    "sequence {} at basis position {} is invalid or repeated", sequence, row,
                )));
            }
            seen[sequence] = true;
        }

        match (0..self.nr_sequences()).find(|&sequence| seen[sequence] != self.status[sequence].is_basic()) {
            Some(sequence) => Err(InvariantError::BasicStatusMismatch { sequence }),
            None => Ok(()),
        }
    }
}

/// Basis and values at some earlier point of a solve.
#[derive(Clone, Debug)]
pub struct SavedBasis {
    status: Vec<VariableStatus>,
    solution: Vec<f64>,
    pivot_variable: Vec<usize>,
}

/// Where a nonbasic sequence starts: at its bound closest to zero, or at zero when free.
fn initial_nonbasic(lower: f64, upper: f64) -> (VariableStatus, f64) {
    if lower == upper {
        (VariableStatus::IsFixed, lower)
    } else if lower.is_finite() && (!upper.is_finite() || lower.abs() <= upper.abs()) {
        (VariableStatus::AtLowerBound, lower)
    } else if upper.is_finite() {
        (VariableStatus::AtUpperBound, upper)
    } else {
        (VariableStatus::IsFree, 0_f64)
    }
}

/// Status of a nonbasic sequence with a given value.
pub(crate) fn nonbasic_status(lower: f64, upper: f64, value: f64, tolerance: f64) -> VariableStatus {
    if lower == upper {
        VariableStatus::IsFixed
    } else if (value - lower).abs() <= tolerance {
        VariableStatus::AtLowerBound
    } else if (value - upper).abs() <= tolerance {
        VariableStatus::AtUpperBound
    } else if !lower.is_finite() && !upper.is_finite() && value == 0_f64 {
        VariableStatus::IsFree
    } else {
        VariableStatus::SuperBasic
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::factorization::BasisFactorization;
    use crate::algorithm::factorization::lower_upper::LUDecomposition;
    use crate::algorithm::primal::workspace::{nonbasic_status, Workspace};
    use crate::data::linear_algebra::vector::IndexedVector;
    use crate::data::linear_program::solution::VariableStatus;
    use crate::error::InvariantError;
    use crate::tests::problem_1;

    #[test]
    fn slack_basis() {
        let workspace = Workspace::new(&problem_1::create());
        assert_eq!(workspace.nr_rows(), 2);
        assert_eq!(workspace.nr_sequences(), 5);
        assert_eq!(workspace.pivot_variable, vec![0, 1]);
        assert_eq!(&workspace.status[2..], &[
            VariableStatus::AtLowerBound, VariableStatus::AtLowerBound, VariableStatus::AtLowerBound,
        ]);
        assert!(workspace.check_basis().is_ok());
    }

    #[test]
    fn primal_and_duals() {
        let mut workspace = Workspace::new(&problem_1::create());
        let mut factorization = LUDecomposition::new(2);
        // Move x to its upper bound 2 and compute the logicals
        workspace.solution[2] = 2_f64;
        workspace.status[2] = VariableStatus::AtUpperBound;
        factorization.factorize(&workspace.basis_columns()).unwrap();
        workspace.compute_primal(&factorization);
        assert_eq!(&workspace.solution[..2], &[2_f64, 2_f64]);
        assert!(workspace.primal_residual() < 1e-12);

        // Price a cost on the first logical
        workspace.cost[0] = -1_f64;
        let duals = workspace.compute_duals(&factorization);
        assert_eq!(duals.values(), &[1_f64, 0_f64]);
        assert!(workspace.dual_residual(&duals) < 1e-12);
        // dj of x = 1 - (1 * 1 + 0 * 1)
        assert_eq!(workspace.dj[2], 0_f64);
        // dj of z = 4 - 1
        assert_eq!(workspace.dj[4], 3_f64);
    }

    #[test]
    fn tableau_row() {
        let workspace = Workspace::new(&problem_1::create());
        let rho = IndexedVector::from_dense(vec![1_f64, 2_f64]);
        let mut row = IndexedVector::new(5);
        workspace.tableau_row(&rho, &mut row);
        assert_eq!(row.values(), &[-1_f64, -2_f64, 3_f64, -10_f64, 3_f64]);
        assert_eq!(workspace.column_dot(3, &rho), -10_f64);
    }

    #[test]
    fn broken_basis() {
        let mut workspace = Workspace::new(&problem_1::create());
        workspace.pivot_variable[1] = 0;
        assert!(matches!(workspace.check_basis(), Err(InvariantError::BasisNotBijective(_))));

        let mut workspace = Workspace::new(&problem_1::create());
        workspace.status[3] = VariableStatus::Basic;
        assert_eq!(workspace.check_basis(), Err(InvariantError::BasicStatusMismatch { sequence: 3 }));
    }

    #[test]
    fn flags() {
        let mut workspace = Workspace::new(&problem_1::create());
        workspace.flag(3);
        workspace.flag(4);
        assert!(workspace.is_flagged(3));
        assert_eq!(workspace.unflag(), 2);
        assert_eq!(workspace.nr_flagged(), 0);
    }

    #[test]
    fn save_and_restore() {
        let mut workspace = Workspace::new(&problem_1::create());
        let saved = workspace.save_basis();

        // x replaces the second logical, which leaves at its value 1
        workspace.pivot_variable[1] = 2;
        workspace.status[2] = VariableStatus::Basic;
        workspace.status[1] = VariableStatus::IsFixed;
        workspace.solution[1] = 1_f64;
        workspace.solution[2] = 1_f64;
        assert!(workspace.check_basis().is_ok());

        let mut slack = workspace.clone();
        slack.reset_to_slack_basis(1e-7);
        assert_eq!(slack.pivot_variable, vec![0, 1]);
        assert_eq!(slack.status[1], VariableStatus::Basic);
        assert_eq!(slack.status[2], VariableStatus::SuperBasic);
        assert_eq!(slack.solution[2], 1_f64);
        assert!(slack.check_basis().is_ok());

        workspace.restore_basis(saved);
        assert_eq!(workspace.pivot_variable, vec![0, 1]);
        assert_eq!(workspace.status[2], VariableStatus::AtLowerBound);
        assert_eq!(workspace.solution[2], 0_f64);
    }

    #[test]
    fn statuses() {
        assert_eq!(nonbasic_status(0_f64, 1_f64, 1e-9, 1e-7), VariableStatus::AtLowerBound);
        assert_eq!(nonbasic_status(0_f64, 1_f64, 1_f64, 1e-7), VariableStatus::AtUpperBound);
        assert_eq!(nonbasic_status(0_f64, 1_f64, 0.5, 1e-7), VariableStatus::SuperBasic);
        assert_eq!(nonbasic_status(2_f64, 2_f64, 2_f64, 1e-7), VariableStatus::IsFixed);
        assert_eq!(
            nonbasic_status(f64::NEG_INFINITY, f64::INFINITY, 0_f64, 1e-7),
            VariableStatus::IsFree,
        );
    }
}
