//! # Piecewise-linear penalty for bound violations
//!
//! Each sequence is in one of three regimes with respect to its true bounds: below the lower
//! bound, between the bounds or above the upper bound. While a sequence is infeasible, its live
//! bounds in the `Workspace` are replaced by fake ones and its live cost is shifted by the
//! infeasibility weight:
//!
//! * below the lower bound: live bounds `[-inf, lower]`, live cost `cost - weight`
//! * above the upper bound: live bounds `[upper, inf]`, live cost `cost + weight`
//!
//! The true bound that was overwritten is stored here, such that the true bounds can always be
//! recovered. Minimizing the live cost first drives the sum of infeasibilities to zero (for a
//! large enough weight) and then optimizes the true objective.
use enum_map::Enum;
use log::debug;

use crate::algorithm::primal::workspace::Workspace;
use crate::data::linear_program::solution::VariableStatus;
use crate::error::InvariantError;

/// Weight used when the configured one is not positive.
const DEFAULT_WEIGHT: f64 = 1_f64;

/// Position of a value relative to the true bounds of its sequence.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Regime {
    /// Strictly below the lower bound, beyond tolerance.
    BelowLower,
    /// Between the bounds, within tolerance.
    Feasible,
    /// Strictly above the upper bound, beyond tolerance.
    AboveUpper,
}

/// Regime of a sequence, together with the true bound hidden by the fake live bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Record {
    Feasible,
    /// Live bounds are `[-inf, true lower]`.
    BelowLower { true_upper: f64 },
    /// Live bounds are `[true upper, inf]`.
    AboveUpper { true_lower: f64 },
}

impl Record {
    fn regime(self) -> Regime {
        match self {
            Record::Feasible => Regime::Feasible,
            Record::BelowLower { .. } => Regime::BelowLower,
            Record::AboveUpper { .. } => Regime::AboveUpper,
        }
    }
}

/// Infeasibility bookkeeping for all sequences.
#[derive(Clone, Debug)]
pub struct NonLinearCost {
    records: Vec<Record>,
    /// Tentative regime while a ratio test walks through breakpoints (`None` when unchanged).
    current: Vec<Option<Regime>>,
    true_cost: Vec<f64>,

    infeasibility_weight: f64,
    number_infeasibilities: usize,
    sum_infeasibilities: f64,
    largest_infeasibility: f64,
    /// True cost of the point at the last full check.
    feasible_cost: f64,
    /// Running average of step lengths, used to guess a first step in the ratio test.
    average_theta: f64,
}

impl NonLinearCost {
    /// Take the live bounds and costs of the workspace as the true ones.
    ///
    /// All sequences start in the feasible regime; `check_infeasibilities` should be called before
    /// the values are used. A weight that is not positive is replaced by a default of one.
    pub fn new(workspace: &Workspace, infeasibility_weight: f64) -> Self {
        let infeasibility_weight = if infeasibility_weight > 0_f64 {
            infeasibility_weight
        } else {
            debug!("infeasibility weight {:e} is not positive, using {:e}", infeasibility_weight, DEFAULT_WEIGHT);
            DEFAULT_WEIGHT
        };

        let nr_sequences = workspace.nr_sequences();
        Self {
            records: vec![Record::Feasible; nr_sequences],
            current: vec![None; nr_sequences],
            true_cost: workspace.cost.clone(),

            infeasibility_weight,
            number_infeasibilities: 0,
            sum_infeasibilities: 0_f64,
            largest_infeasibility: 0_f64,
            feasible_cost: 0_f64,
            average_theta: 1e3,
        }
    }

    /// True bounds of a sequence.
    pub fn true_bounds(&self, workspace: &Workspace, sequence: usize) -> (f64, f64) {
        let (lower, upper) = (workspace.lower[sequence], workspace.upper[sequence]);
        match self.records[sequence] {
            Record::Feasible => (lower, upper),
            Record::BelowLower { true_upper } => (upper, true_upper),
            Record::AboveUpper { true_lower } => (true_lower, lower),
        }
    }

    /// True cost of a sequence.
    pub fn true_cost(&self, sequence: usize) -> f64 {
        self.true_cost[sequence]
    }

    /// Regime of a sequence at the last update.
    pub fn regime(&self, sequence: usize) -> Regime {
        self.records[sequence].regime()
    }

    /// Recompute all regimes and the infeasibility statistics from scratch.
    ///
    /// Nonbasic sequences are moved to a valid bound. With a nonpositive `old_tolerance`, each is
    /// moved to its nearest bound. Otherwise the statuses are re-derived for a primal tolerance
    /// that changed from `old_tolerance` to `tolerance`: a value that was at its bound under the
    /// old tolerance but not under the new one is moved onto the bound, or becomes superbasic when
    /// it lies strictly between the bounds.
    ///
    /// Live costs are always reset, as the weight may have changed.
    pub fn check_infeasibilities(&mut self, workspace: &mut Workspace, old_tolerance: f64, tolerance: f64) {
        let to_nearest = old_tolerance <= 0_f64;
        let slack = old_tolerance * 1.0001;

        self.number_infeasibilities = 0;
        self.sum_infeasibilities = 0_f64;
        self.largest_infeasibility = 0_f64;
        self.feasible_cost = 0_f64;

        for sequence in 0..workspace.nr_sequences() {
            debug_assert!(self.current[sequence].is_none());

            let (lower, upper) = self.true_bounds(workspace, sequence);
            let mut status = workspace.status[sequence];
            if lower == upper && !status.is_basic() {
                status = VariableStatus::IsFixed;
            }

            let mut value = workspace.solution[sequence];
            let mut regime = Regime::Feasible;
            match status {
                VariableStatus::Basic | VariableStatus::SuperBasic => {
                    regime = classify(value, lower, upper, tolerance);
                    let distance = infeasibility(regime, value, lower, upper);
                    if regime != Regime::Feasible {
                        self.number_infeasibilities += 1;
                        self.sum_infeasibilities += distance;
                        self.largest_infeasibility = self.largest_infeasibility.max(distance);
                    }
                },
                VariableStatus::IsFree => {},
                VariableStatus::IsFixed => value = lower,
                VariableStatus::AtLowerBound | VariableStatus::AtUpperBound => {
                    let at_lower = status == VariableStatus::AtLowerBound;
                    let (at, other) = if at_lower { (lower, upper) } else { (upper, lower) };
                    if to_nearest {
                        if (value - lower).abs() < (value - upper).abs() {
                            value = lower;
                            status = VariableStatus::AtLowerBound;
                        } else {
                            value = upper;
                            status = VariableStatus::AtUpperBound;
                        }
                    } else if (value - at).abs() > slack {
                        if (value - other).abs() <= slack {
                            if (value - other).abs() > tolerance {
                                value = other;
                            }
                            status = if at_lower { VariableStatus::AtUpperBound } else { VariableStatus::AtLowerBound };
                        } else if value < upper && value > lower {
                            status = VariableStatus::SuperBasic;
                        } else if value <= lower {
                            value = lower;
                            status = VariableStatus::AtLowerBound;
                        } else {
                            value = upper;
                            status = VariableStatus::AtUpperBound;
                        }
                    } else if (value - at).abs() > tolerance {
                        value = at;
                    }
                },
            }

            workspace.status[sequence] = status;
            workspace.solution[sequence] = value;
            self.apply(workspace, sequence, regime, lower, upper);
            self.feasible_cost += self.true_cost[sequence] * value;
        }
    }

    /// Put the true bounds and costs back into the workspace and forget all infeasibilities.
    pub fn feasible_bounds(&mut self, workspace: &mut Workspace) {
        for sequence in 0..workspace.nr_sequences() {
            let (lower, upper) = self.true_bounds(workspace, sequence);
            self.apply(workspace, sequence, Regime::Feasible, lower, upper);
            self.current[sequence] = None;
        }
        self.number_infeasibilities = 0;
        self.sum_infeasibilities = 0_f64;
        self.largest_infeasibility = 0_f64;
    }

    /// Move a sequence to the regime of a new value.
    ///
    /// Nonbasic sequences get a status matching their new position. The value in the workspace
    /// should still be the old one; it is not written.
    ///
    /// # Return value
    ///
    /// The change of its live cost (new minus old).
    pub fn set_one(&mut self, workspace: &mut Workspace, sequence: usize, value: f64, tolerance: f64) -> f64 {
        let difference = self.relocate(workspace, sequence, value, tolerance);

        let (lower, upper) = (workspace.lower[sequence], workspace.upper[sequence]);
        match workspace.status[sequence] {
            VariableStatus::Basic | VariableStatus::SuperBasic | VariableStatus::IsFree => {},
            VariableStatus::AtLowerBound | VariableStatus::AtUpperBound | VariableStatus::IsFixed => {
                workspace.status[sequence] = if lower == upper {
                    VariableStatus::IsFixed
                } else if (value - lower).abs() <= tolerance * 1.001 {
                    VariableStatus::AtLowerBound
                } else if (value - upper).abs() <= tolerance * 1.001 {
                    VariableStatus::AtUpperBound
                } else {
                    VariableStatus::SuperBasic
                };
            },
        }

        difference
    }

    /// Move the basic sequence at a basis position to the regime of a new value.
    ///
    /// As with `set_one`, the workspace should still hold the old value.
    ///
    /// # Return value
    ///
    /// The change of its live cost (new minus old).
    pub fn set_one_basic(&mut self, workspace: &mut Workspace, row: usize, value: f64, tolerance: f64) -> f64 {
        let sequence = workspace.pivot_variable[row];
        self.relocate(workspace, sequence, value, tolerance)
    }

    /// Prepare the basic sequence at a basis position for leaving the basis.
    ///
    /// Its regime is updated and `value` is moved exactly onto the true bound it leaves at.
    ///
    /// # Return value
    ///
    /// Tuple of the direction in which the value was moving (`1` towards the lower bound, `-1`
    /// towards the upper bound, `0` when it is strictly between them) and the change of the live
    /// cost.
    pub fn set_one_outgoing(
        &mut self,
        workspace: &mut Workspace,
        row: usize,
        value: &mut f64,
        tolerance: f64,
    ) -> (i32, f64) {
        let sequence = workspace.pivot_variable[row];
        let (live_lower, live_upper) = (workspace.lower[sequence], workspace.upper[sequence]);
        let direction = if *value <= live_lower + 1.001 * tolerance {
            1
        } else if *value >= live_upper - 1.001 * tolerance {
            -1
        } else {
            0
        };

        let (lower, upper) = self.true_bounds(workspace, sequence);
        *value = nearest_bound(*value, lower, upper);
        let difference = self.relocate(workspace, sequence, *value, tolerance);

        (direction, difference)
    }

    /// Nearest true bound of the basic sequence at a basis position.
    pub fn nearest(&self, workspace: &Workspace, row: usize, value: f64) -> f64 {
        let sequence = workspace.pivot_variable[row];
        let (lower, upper) = self.true_bounds(workspace, sequence);
        nearest_bound(value, lower, upper)
    }

    /// Pass a breakpoint of the basic sequence at a basis position during the ratio test.
    ///
    /// The tentative regime is moved one step in the direction of movement. `alpha > 0` means the
    /// basic value decreases.
    ///
    /// # Arguments
    ///
    /// * `rhs`: Distance to the breakpoint just passed; grows by the distance to the next one.
    ///
    /// # Return value
    ///
    /// The change of the slope of the objective along the step.
    pub fn change_in_cost(&mut self, workspace: &Workspace, row: usize, alpha: f64, rhs: &mut f64) -> f64 {
        let sequence = workspace.pivot_variable[row];
        let regime = self.current[sequence].unwrap_or_else(|| self.records[sequence].regime());
        let (lower, upper) = self.true_bounds(workspace, sequence);

        self.current[sequence] = Some(match regime {
            Regime::Feasible => {
                *rhs = f64::MAX;
                if alpha > 0_f64 { Regime::BelowLower } else { Regime::AboveUpper }
            },
            Regime::BelowLower | Regime::AboveUpper => {
                *rhs += upper - lower;
                Regime::Feasible
            },
        });

        alpha.abs() * self.infeasibility_weight
    }

    /// Forget the tentative regimes of the basic sequences at some basis positions.
    pub fn go_back_all(&mut self, workspace: &Workspace, rows: impl IntoIterator<Item=usize>) {
        for row in rows {
            self.current[workspace.pivot_variable[row]] = None;
        }
    }

    /// True objective value of the current point.
    pub fn feasible_report_cost(&self, workspace: &Workspace) -> f64 {
        self.true_cost.iter().zip(&workspace.solution).map(|(c, x)| c * x).sum()
    }

    /// Replace the infeasibility weight. Live costs change at the next `check_infeasibilities`.
    ///
    /// A weight that is not positive is ignored.
    pub fn set_weight(&mut self, infeasibility_weight: f64) {
        if infeasibility_weight > 0_f64 {
            self.infeasibility_weight = infeasibility_weight;
        }
    }

    /// Penalty per unit of bound violation.
    pub fn weight(&self) -> f64 {
        self.infeasibility_weight
    }

    /// Number of infeasible sequences.
    pub fn number_infeasibilities(&self) -> usize {
        self.number_infeasibilities
    }

    /// Sum of the distances of infeasible sequences to their violated true bound.
    ///
    /// Recomputed by a full check and kept up to date by the single sequence updates.
    pub fn sum_infeasibilities(&self) -> f64 {
        self.sum_infeasibilities
    }

    /// Largest distance of a sequence to its violated true bound, as of the last full check.
    pub fn largest_infeasibility(&self) -> f64 {
        self.largest_infeasibility
    }

    /// True objective value as of the last full check.
    pub fn feasible_cost(&self) -> f64 {
        self.feasible_cost
    }

    /// Running average of accepted step lengths.
    pub fn average_theta(&self) -> f64 {
        self.average_theta
    }

    /// Update the running average of step lengths.
    pub fn set_average_theta(&mut self, average_theta: f64) {
        self.average_theta = average_theta;
    }

    /// Count the infeasible sequences and the sum of their distances to the violated true bound.
    pub fn recomputed_infeasibilities(&self, workspace: &Workspace) -> (usize, f64) {
        (0..workspace.nr_sequences())
            .filter(|&sequence| self.records[sequence] != Record::Feasible)
            .fold((0, 0_f64), |(count, sum), sequence| {
                let (lower, upper) = self.true_bounds(workspace, sequence);
                let value = workspace.solution[sequence];
                (count + 1, sum + (lower - value).max(value - upper).max(0_f64))
            })
    }

    /// Check the running infeasibility count and sum against a recount of the regimes.
    pub fn validate(&self, workspace: &Workspace) -> Result<(), InvariantError> {
        let (count, sum) = self.recomputed_infeasibilities(workspace);
        if count != self.number_infeasibilities {
            return Err(InvariantError::InfeasibilityAccounting {
                incremental: self.number_infeasibilities,
                recomputed: count,
            });
        }
        if (self.sum_infeasibilities - sum).abs() > 1e-6 * (1_f64 + sum) {
            return Err(InvariantError::InfeasibilitySum {
                incremental: self.sum_infeasibilities,
                recomputed: sum,
            });
        }

        Ok(())
    }

    /// Move a sequence to the regime of `value` with respect to its true bounds.
    fn relocate(&mut self, workspace: &mut Workspace, sequence: usize, value: f64, tolerance: f64) -> f64 {
        debug_assert!(self.current[sequence].is_none());

        let (lower, upper) = self.true_bounds(workspace, sequence);
        let old_regime = self.records[sequence].regime();
        let new_regime = classify(value, lower, upper, tolerance);
        if old_regime != Regime::Feasible {
            self.number_infeasibilities -= 1;
        }
        if new_regime != Regime::Feasible {
            self.number_infeasibilities += 1;
        }
        self.sum_infeasibilities += infeasibility(new_regime, value, lower, upper)
            - infeasibility(old_regime, workspace.solution[sequence], lower, upper);
        if self.sum_infeasibilities < 0_f64 {
            self.sum_infeasibilities = 0_f64;
        }

        if old_regime == new_regime {
            0_f64
        } else {
            let old_cost = workspace.cost[sequence];
            self.apply(workspace, sequence, new_regime, lower, upper);
            workspace.cost[sequence] - old_cost
        }
    }

    /// Write the live bounds and cost of a regime into the workspace.
    fn apply(&mut self, workspace: &mut Workspace, sequence: usize, regime: Regime, lower: f64, upper: f64) {
        let cost = self.true_cost[sequence];
        let (record, live_lower, live_upper, live_cost) = match regime {
            Regime::Feasible => (Record::Feasible, lower, upper, cost),
            Regime::BelowLower => (
                Record::BelowLower { true_upper: upper },
                f64::NEG_INFINITY, lower, cost - self.infeasibility_weight,
            ),
            Regime::AboveUpper => (
                Record::AboveUpper { true_lower: lower },
                upper, f64::INFINITY, cost + self.infeasibility_weight,
            ),
        };

        self.records[sequence] = record;
        workspace.lower[sequence] = live_lower;
        workspace.upper[sequence] = live_upper;
        workspace.cost[sequence] = live_cost;
    }
}

/// Bound closest to a value. A free sequence keeps its value.
fn nearest_bound(value: f64, lower: f64, upper: f64) -> f64 {
    match (lower.is_finite(), upper.is_finite()) {
        (false, false) => value,
        (true, false) => lower,
        (false, true) => upper,
        (true, true) => if (value - lower).abs() <= (value - upper).abs() { lower } else { upper },
    }
}

/// Distance beyond the bound violated in a regime.
fn infeasibility(regime: Regime, value: f64, lower: f64, upper: f64) -> f64 {
    match regime {
        Regime::BelowLower => lower - value,
        Regime::Feasible => 0_f64,
        Regime::AboveUpper => value - upper,
    }
}

/// Regime of a value with respect to true bounds.
pub(crate) fn classify(value: f64, lower: f64, upper: f64, tolerance: f64) -> Regime {
    if value - upper > tolerance {
        Regime::AboveUpper
    } else if value - lower < -tolerance {
        Regime::BelowLower
    } else {
        Regime::Feasible
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::primal::nonlinear_cost::{classify, NonLinearCost, Regime};
    use crate::algorithm::primal::workspace::Workspace;
    use crate::data::linear_program::solution::VariableStatus;
    use crate::error::InvariantError;
    use crate::tests::problem_1;

    const TOLERANCE: f64 = 1e-7;

    fn checked() -> (Workspace, NonLinearCost) {
        let mut workspace = Workspace::new(&problem_1::create());
        let mut cost = NonLinearCost::new(&workspace, 1e6);
        cost.check_infeasibilities(&mut workspace, 0_f64, TOLERANCE);
        (workspace, cost)
    }

    #[test]
    fn regimes() {
        assert_eq!(classify(-1_f64, 0_f64, 1_f64, TOLERANCE), Regime::BelowLower);
        assert_eq!(classify(-1e-8, 0_f64, 1_f64, TOLERANCE), Regime::Feasible);
        assert_eq!(classify(2_f64, 0_f64, 1_f64, TOLERANCE), Regime::AboveUpper);
        assert_eq!(classify(5_f64, 0_f64, f64::INFINITY, TOLERANCE), Regime::Feasible);
    }

    #[test]
    fn slack_basis_is_infeasible() {
        let (workspace, cost) = checked();

        // Both logicals are zero, row 0 needs at least 2 and row 1 exactly 1
        assert_eq!(cost.number_infeasibilities(), 2);
        assert_eq!(cost.sum_infeasibilities(), 3_f64);
        assert_eq!(cost.largest_infeasibility(), 2_f64);
        assert_eq!(cost.regime(0), Regime::BelowLower);
        assert_eq!(cost.regime(1), Regime::BelowLower);

        // Fake bounds and shifted costs
        assert_eq!(workspace.lower[0], f64::NEG_INFINITY);
        assert_eq!(workspace.upper[0], 2_f64);
        assert_eq!(workspace.cost[0], -1e6);
        assert_eq!(cost.true_bounds(&workspace, 0), (2_f64, f64::INFINITY));
        assert_eq!(cost.true_bounds(&workspace, 1), (1_f64, 1_f64));
        assert!(cost.validate(&workspace).is_ok());
        assert_eq!(cost.recomputed_infeasibilities(&workspace), (2, 3_f64));
    }

    #[test]
    fn check_is_idempotent() {
        let (mut workspace, mut cost) = checked();
        let (lower, upper, live) = (workspace.lower.clone(), workspace.upper.clone(), workspace.cost.clone());

        cost.check_infeasibilities(&mut workspace, 0_f64, TOLERANCE);
        assert_eq!(workspace.lower, lower);
        assert_eq!(workspace.upper, upper);
        assert_eq!(workspace.cost, live);
        assert_eq!(cost.number_infeasibilities(), 2);
        assert_eq!(cost.sum_infeasibilities(), 3_f64);
    }

    #[test]
    fn feasible_bounds_restore() {
        let (mut workspace, mut cost) = checked();
        cost.feasible_bounds(&mut workspace);
        assert_eq!(&workspace.lower[..2], &[2_f64, 1_f64]);
        assert_eq!(&workspace.upper[..2], &[f64::INFINITY, 1_f64]);
        assert_eq!(&workspace.cost, &[0_f64, 0_f64, 1_f64, 0_f64, 4_f64]);
        assert_eq!(cost.number_infeasibilities(), 0);
    }

    #[test]
    fn basic_becomes_feasible() {
        let (mut workspace, mut cost) = checked();

        let difference = cost.set_one_basic(&mut workspace, 0, 2.5, TOLERANCE);
        assert_eq!(difference, 1e6);
        assert_eq!(cost.regime(0), Regime::Feasible);
        assert_eq!(cost.number_infeasibilities(), 1);
        assert_eq!((workspace.lower[0], workspace.upper[0]), (2_f64, f64::INFINITY));

        // And back
        let difference = cost.set_one_basic(&mut workspace, 0, 1_f64, TOLERANCE);
        assert_eq!(difference, -1e6);
        assert_eq!(cost.number_infeasibilities(), 2);
    }

    #[test]
    fn sum_follows_moves() {
        let (mut workspace, mut cost) = checked();

        // Row 0 from 0 to 1.5, still half a unit short
        cost.set_one_basic(&mut workspace, 0, 1.5, TOLERANCE);
        workspace.solution[0] = 1.5;
        assert!((cost.sum_infeasibilities() - 1.5).abs() < 1e-12);
        assert_eq!(cost.validate(&workspace), Ok(()));

        // Row 1 overshoots its fixed value
        cost.set_one_basic(&mut workspace, 1, 1.25, TOLERANCE);
        workspace.solution[1] = 1.25;
        assert_eq!(cost.regime(1), Regime::AboveUpper);
        assert!((cost.sum_infeasibilities() - 0.75).abs() < 1e-12);
        assert_eq!(cost.validate(&workspace), Ok(()));

        // Writing a value without telling the cost is caught
        workspace.solution[0] = 1.9;
        assert!(matches!(cost.validate(&workspace), Err(InvariantError::InfeasibilitySum { .. })));
    }

    #[test]
    fn weight_is_positive() {
        let workspace = Workspace::new(&problem_1::create());
        for weight in [0_f64, -3_f64, f64::NAN] {
            assert_eq!(NonLinearCost::new(&workspace, weight).weight(), 1_f64);
        }

        let mut cost = NonLinearCost::new(&workspace, 1e6);
        cost.set_weight(0_f64);
        assert_eq!(cost.weight(), 1e6);
        cost.set_weight(5e6);
        assert_eq!(cost.weight(), 5e6);
    }

    #[test]
    fn nonbasic_status_follows_value() {
        let (mut workspace, mut cost) = checked();

        // x moves to its upper bound
        assert_eq!(cost.set_one(&mut workspace, 2, 2_f64, TOLERANCE), 0_f64);
        assert_eq!(workspace.status[2], VariableStatus::AtUpperBound);
        cost.set_one(&mut workspace, 2, 1_f64, TOLERANCE);
        assert_eq!(workspace.status[2], VariableStatus::SuperBasic);
    }

    #[test]
    fn outgoing_snaps_to_bound() {
        let (mut workspace, mut cost) = checked();

        let mut value = 1_f64 + 1e-9;
        let (direction, _) = cost.set_one_outgoing(&mut workspace, 1, &mut value, TOLERANCE);
        assert_eq!(value, 1_f64);
        assert_eq!(direction, -1);
        assert_eq!(cost.regime(1), Regime::Feasible);

        let mut value = 2_f64 - 1e-8;
        let (direction, difference) = cost.set_one_outgoing(&mut workspace, 0, &mut value, TOLERANCE);
        assert_eq!(value, 2_f64);
        assert_eq!(direction, -1);
        assert_eq!(difference, 1e6);
        assert_eq!(cost.number_infeasibilities(), 0);
    }

    #[test]
    fn breakpoints() {
        let (workspace, mut cost) = checked();

        // Row 1 is fixed at 1: entering feasibility from below and leaving above at once
        let mut rhs = 1_f64;
        let slope = cost.change_in_cost(&workspace, 1, -0.5, &mut rhs);
        assert_eq!(slope, 0.5e6);
        assert_eq!(rhs, 1_f64);
        let slope = cost.change_in_cost(&workspace, 1, -0.5, &mut rhs);
        assert_eq!(slope, 0.5e6);
        assert_eq!(rhs, f64::MAX);

        // Row 0 is bounded below only
        let mut rhs = 2_f64;
        cost.change_in_cost(&workspace, 0, -1_f64, &mut rhs);
        assert_eq!(rhs, f64::INFINITY);

        cost.go_back_all(&workspace, 0..2);
        assert_eq!(cost.regime(0), Regime::BelowLower);
    }

    #[test]
    fn nonbasic_moved_to_bound() {
        let mut workspace = Workspace::new(&problem_1::create());
        let mut cost = NonLinearCost::new(&workspace, 1e6);
        workspace.solution[4] = 3.9;
        workspace.status[4] = VariableStatus::AtUpperBound;
        cost.check_infeasibilities(&mut workspace, 0_f64, TOLERANCE);
        assert_eq!(workspace.solution[4], 4_f64);

        // Within the old tolerance of the lower bound, but not of the upper one
        workspace.solution[4] = 5e-7;
        workspace.status[4] = VariableStatus::AtUpperBound;
        cost.check_infeasibilities(&mut workspace, 1e-6, TOLERANCE);
        assert_eq!(workspace.solution[4], 0_f64);
        assert_eq!(workspace.status[4], VariableStatus::AtLowerBound);

        workspace.solution[4] = 2_f64;
        cost.check_infeasibilities(&mut workspace, 1e-6, TOLERANCE);
        assert_eq!(workspace.status[4], VariableStatus::SuperBasic);
        assert_eq!(cost.feasible_report_cost(&workspace), 8_f64);
    }
}
