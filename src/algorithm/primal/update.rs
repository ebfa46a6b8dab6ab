//! # Update step
//!
//! Applying the step chosen by the ratio test: moving the primal values, maintaining the reduced
//! costs and the infeasibility regimes, and replacing a column of the basis.
//!
//! Reduced costs are updated with the row of the tableau at the pivot position instead of being
//! recomputed. Cost changes of basic sequences passing through a bound are collected per basis
//! position and applied through one extra backward solve.
use crate::algorithm::factorization::{BasisFactorization, UpdateQuality};
use crate::algorithm::primal::nonlinear_cost::NonLinearCost;
use crate::algorithm::primal::strategy::pivot_rule::{BasisChange, PivotRule};
use crate::algorithm::primal::workspace::{nonbasic_status, Workspace};
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::solution::VariableStatus;

/// Vectors reused across iterations. Each is cleared before use.
#[derive(Clone, Debug)]
pub struct Scratch {
    /// Row of the basis inverse, indexed by row.
    rho: IndexedVector<f64>,
    /// Row of the tableau, indexed by sequence.
    row: IndexedVector<f64>,
    /// Changes of the costs of basic sequences, indexed by basis position.
    cost_changes: IndexedVector<f64>,
}

impl Scratch {
    /// Allocate for a workspace.
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            rho: IndexedVector::new(workspace.nr_rows()),
            row: IndexedVector::new(workspace.nr_sequences()),
            cost_changes: IndexedVector::new(workspace.nr_rows()),
        }
    }
}

/// Compute the row of the tableau at the pivot position and judge the column replacement.
///
/// Nothing is modified except the scratch space.
pub fn prepare_pivot<BF: BasisFactorization>(
    workspace: &Workspace,
    factorization: &BF,
    scratch: &mut Scratch,
    pivot_row: usize,
    entering: usize,
    column: &IndexedVector<f64>,
) -> UpdateQuality {
    scratch.rho.clear();
    scratch.rho.set(pivot_row, 1_f64);
    factorization.btran(&mut scratch.rho);
    workspace.tableau_row(&scratch.rho, &mut scratch.row);

    factorization.check_replace_column(pivot_row, column, scratch.row[entering])
}

/// Description of an accepted pivot.
#[derive(Copy, Clone, Debug)]
pub struct Pivot {
    /// Entering sequence.
    pub entering: usize,
    /// Basis position of the leaving sequence.
    pub row: usize,
    /// Pivot element.
    pub alpha: f64,
    /// Signed change of the entering sequence.
    pub theta: f64,
    /// Reduced cost of the entering sequence.
    pub dual_in: f64,
    /// Value of the leaving sequence after the step, before it is moved onto its bound.
    pub value_out: f64,
}

/// Apply a pivot that `prepare_pivot` judged acceptable.
///
/// # Return value
///
/// The sequence that left the basis.
pub fn apply_pivot<BF: BasisFactorization>(
    workspace: &mut Workspace,
    cost: &mut NonLinearCost,
    factorization: &mut BF,
    pivot_rule: &mut dyn PivotRule,
    scratch: &mut Scratch,
    pivot: Pivot,
    column: &IndexedVector<f64>,
    tolerance: f64,
) -> usize {
    let Pivot { entering, row, alpha, theta, dual_in, value_out } = pivot;
    let leaving = workspace.pivot_variable[row];

    scratch.cost_changes.clear();
    update_primal(workspace, cost, &mut scratch.cost_changes, column, theta, Some(row), tolerance);

    let mut value_out = value_out;
    let (_, leaving_cost_change) = cost.set_one_outgoing(workspace, row, &mut value_out, tolerance);
    workspace.solution[leaving] = value_out;

    // The leaving sequence has a one in the tableau row, the entering sequence `alpha`.
    let ratio = dual_in / alpha;
    for (sequence, value) in scratch.row.iter() {
        if sequence == leaving || !workspace.status[sequence].is_basic() {
            workspace.dj[sequence] -= ratio * value;
        }
    }
    workspace.dj[entering] = 0_f64;

    workspace.pivot_variable[row] = entering;
    workspace.status[entering] = VariableStatus::Basic;
    workspace.status[leaving] = nonbasic_status(
        workspace.lower[leaving], workspace.upper[leaving], value_out, tolerance,
    );
    factorization.replace_column(row, column);

    pivot_rule.update_weights(&BasisChange { entering, leaving, alpha, column, row: &scratch.row });

    let value_in = workspace.solution[entering] + theta;
    let entering_cost_change = cost.set_one_basic(workspace, row, value_in, tolerance);
    workspace.solution[entering] = value_in;
    if entering_cost_change != 0_f64 {
        scratch.cost_changes.add(row, entering_cost_change);
    }
    workspace.dj[leaving] += leaving_cost_change;

    apply_cost_changes(workspace, factorization, scratch);

    leaving
}

/// Move the entering sequence without changing the basis, for a bound flip or a bounded step.
pub fn apply_move<BF: BasisFactorization>(
    workspace: &mut Workspace,
    cost: &mut NonLinearCost,
    factorization: &BF,
    scratch: &mut Scratch,
    entering: usize,
    theta: f64,
    column: &IndexedVector<f64>,
    tolerance: f64,
) {
    scratch.cost_changes.clear();
    update_primal(workspace, cost, &mut scratch.cost_changes, column, theta, None, tolerance);

    let value = workspace.solution[entering] + theta;
    workspace.dj[entering] += cost.set_one(workspace, entering, value, tolerance);
    workspace.solution[entering] = value;

    apply_cost_changes(workspace, factorization, scratch);
}

/// Move the basic values along the transformed column, reclassifying them.
///
/// The sequence at `pivot_row` is left alone; it is about to leave.
fn update_primal(
    workspace: &mut Workspace,
    cost: &mut NonLinearCost,
    cost_changes: &mut IndexedVector<f64>,
    column: &IndexedVector<f64>,
    theta: f64,
    pivot_row: Option<usize>,
    tolerance: f64,
) {
    for (row, alpha) in column.iter() {
        if alpha == 0_f64 {
            continue;
        }

        if Some(row) == pivot_row {
            continue;
        }

        let sequence = workspace.pivot_variable[row];
        let value = workspace.solution[sequence] - theta * alpha;
        let change = cost.set_one_basic(workspace, row, value, tolerance);
        workspace.solution[sequence] = value;
        if change != 0_f64 {
            cost_changes.add(row, change);
        }
    }
}

/// Update the reduced costs of nonbasic sequences for changed basic costs.
///
/// The duals change by `v' B^-1` where `v` holds the cost changes per basis position.
fn apply_cost_changes<BF: BasisFactorization>(
    workspace: &mut Workspace,
    factorization: &BF,
    scratch: &mut Scratch,
) {
    if scratch.cost_changes.nr_nonzeros() == 0 {
        return;
    }

    factorization.btran(&mut scratch.cost_changes);
    workspace.tableau_row(&scratch.cost_changes, &mut scratch.row);
    for (sequence, value) in scratch.row.iter() {
        if !workspace.status[sequence].is_basic() {
            workspace.dj[sequence] -= value;
        }
    }
    scratch.cost_changes.clear();
}
