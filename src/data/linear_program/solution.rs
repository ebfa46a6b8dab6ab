//! # Representation of solver results
//!
//! A solve always produces a `Solution`, also when no optimum was found. The `status` tells how
//! the values should be interpreted.
use std::fmt;

use enum_map::{Enum, EnumMap};

/// Terminal state of a solve.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// Primal and dual feasible, confirmed on a fresh factorization.
    Optimal,
    /// No feasible point exists; the infeasibility weight was escalated to its cap.
    Infeasible,
    /// The objective decreases without bound along `Solution::ray`.
    Unbounded,
    /// The iteration or time budget was exhausted. The values are the last point reached.
    IterationLimit,
    /// An event handler requested a stop.
    Stopped,
    /// Numerical trouble that the primal method can't recover from; another algorithm should be
    /// tried.
    DualFallback,
}

impl Status {
    /// Numeric status code.
    ///
    /// These are `0` (optimal), `1` (infeasible), `2` (unbounded), `3` (iteration limit), `5`
    /// (stopped) and `10` (try the other algorithm).
    pub fn code(self) -> i32 {
        match self {
            Status::Optimal => 0,
            Status::Infeasible => 1,
            Status::Unbounded => 2,
            Status::IterationLimit => 3,
            Status::Stopped => 5,
            Status::DualFallback => 10,
        }
    }

    /// Inverse of `code`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Status::Optimal),
            1 => Some(Status::Infeasible),
            2 => Some(Status::Unbounded),
            3 => Some(Status::IterationLimit),
            5 => Some(Status::Stopped),
            10 => Some(Status::DualFallback),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Optimal => "optimal",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::IterationLimit => "iteration limit",
            Status::Stopped => "stopped",
            Status::DualFallback => "dual fallback",
        })
    }
}

/// Position of a variable relative to the basis and its bounds.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableStatus {
    Basic,
    AtLowerBound,
    AtUpperBound,
    IsFixed,
    IsFree,
    /// Nonbasic, but not at a bound.
    SuperBasic,
}

impl VariableStatus {
    /// Whether the variable is part of the basis.
    pub fn is_basic(self) -> bool {
        self == VariableStatus::Basic
    }
}

/// What an iteration did.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum IterationKind {
    /// The entering variable replaced a basic variable.
    Pivot,
    /// The entering variable moved from one of its bounds to the other.
    BoundFlip,
    /// The entering variable moved without a basis change while infeasibilities remained.
    BoundedStep,
    /// The entering variable was flagged because the iteration was numerically unacceptable.
    Rejected,
    /// The basis was factorized from scratch.
    Refactorization,
}

/// Counts of the different kinds of work done during a solve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    counts: EnumMap<IterationKind, u64>,
}

impl Statistics {
    /// Count one more event of the given kind.
    pub fn record(&mut self, kind: IterationKind) {
        self.counts[kind] += 1;
    }

    /// Number of events of the given kind.
    pub fn count(&self, kind: IterationKind) -> u64 {
        self.counts[kind]
    }

    /// Number of iterations that moved the solution.
    pub fn nr_moves(&self) -> u64 {
        self.count(IterationKind::Pivot)
            + self.count(IterationKind::BoundFlip)
            + self.count(IterationKind::BoundedStep)
    }
}

/// Result of a solve.
///
/// Values are indexed by sequence where noted: the row logicals `0..nr_rows` come first, followed
/// by the columns. The logical of row `i` equals the activity of that row.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// How the solve ended.
    pub status: Status,
    /// True objective value `c' x` of `column_values`, without any penalty costs.
    pub objective_value: f64,
    /// Value of every sequence.
    pub primal: Vec<f64>,
    /// Activity `A x` of every row.
    pub row_activity: Vec<f64>,
    /// Value of every column.
    pub column_values: Vec<f64>,
    /// Status of every sequence.
    pub statuses: Vec<VariableStatus>,
    /// Reduced cost of every sequence.
    pub reduced_costs: Vec<f64>,
    /// Dual value of every row.
    pub row_duals: Vec<f64>,
    /// For `Status::Unbounded`, a direction over the columns along which the objective decreases
    /// without bound.
    pub ray: Option<Vec<f64>>,
    /// For `Status::Infeasible`, row multipliers certifying the infeasibility (best effort).
    pub dual_ray: Option<Vec<f64>>,
    /// Sum of the bound violations at the final point.
    pub sum_infeasibilities: f64,
    /// Final weight of the infeasibility penalty.
    pub infeasibility_cost: f64,
    /// Number of iterations done.
    pub iterations: u64,
    /// Breakdown of the work done.
    pub statistics: Statistics,
}

impl Solution {
    /// Whether the solve ended with a verified optimum.
    pub fn is_optimal(&self) -> bool {
        self.status == Status::Optimal
    }
}
