//! Configuration of the primal simplex method.
use std::time::Duration;

use log::warn;

/// How the entering variable is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRuleKind {
    /// Largest reduced cost violation.
    Dantzig,

    /// Reduced cost violation relative to a devex reference weight.
    #[default]
    SteepestEdge,

    /// Largest violation within a rotating block of sequences.
    Partial {
        /// Number of sequences in a block.
        chunk: usize,
    },
}

/// Random relaxation of bounds against degeneracy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Perturbation {
    /// Never perturb.
    Off,

    /// Perturb before the first iteration.
    On {
        /// Relative size of the perturbation.
        magnitude: f64,
    },

    /// Perturb only when degeneracy is detected.
    #[default]
    Automatic,
}

/// Primal simplex settings.
#[derive(Debug, Clone)]
pub struct Settings {
    // === Tolerances ===
    /// A value within this distance of a bound is considered at that bound.
    pub primal_tolerance: f64,

    /// Reduced costs smaller than this in magnitude are considered zero.
    pub dual_tolerance: f64,

    /// The primal tolerance may be widened during the solve, but never beyond this value.
    pub max_primal_tolerance: f64,

    /// Smallest pivot element accepted by the ratio test, before adapting to the age of the
    /// factorization.
    pub pivot_tolerance: f64,

    /// Steps shorter than this are lengthened, at the cost of small infeasibilities.
    pub minimum_theta_movement: f64,

    // === Infeasibility handling ===
    /// Initial penalty per unit of bound violation.
    pub initial_infeasibility_cost: f64,

    /// Factor by which the penalty grows when the problem looks infeasible at the current penalty.
    /// Must exceed one; other values are replaced by the default.
    pub infeasibility_cost_multiplier: f64,

    /// The problem is declared infeasible when it is still infeasible at this penalty.
    pub max_infeasibility_cost: f64,

    // === Termination ===
    /// Maximum number of iterations.
    pub maximum_iterations: u64,

    /// Wall clock limit (None = unlimited).
    pub time_limit: Option<Duration>,

    // === Strategy ===
    /// Maximum number of column replacements between two factorizations.
    pub refactor_frequency: usize,

    /// Entering variable selection.
    pub pivot_rule: PivotRuleKind,

    /// Anti-degeneracy perturbation.
    pub perturbation: Perturbation,

    /// Seed of the perturbation random number generator.
    pub seed: u64,

    /// Number of entering candidates whose ratio tests are evaluated concurrently. At most one
    /// means serial.
    pub parallel_candidates: usize,

    /// Verify the consistency of the internal state at every factorization, also in release
    /// builds.
    pub check_invariants: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Tolerances
            primal_tolerance: 1e-7,
            dual_tolerance: 1e-7,
            max_primal_tolerance: 1e-6,
            pivot_tolerance: 1e-7,
            minimum_theta_movement: 1e-12,

            // Infeasibility handling
            initial_infeasibility_cost: 1e6,
            infeasibility_cost_multiplier: 5_f64,
            max_infeasibility_cost: 1e20,

            // Termination
            maximum_iterations: 1_000_000,
            time_limit: None,

            // Strategy
            refactor_frequency: 100,
            pivot_rule: PivotRuleKind::default(),
            perturbation: Perturbation::default(),
            seed: 1_234_567,
            parallel_candidates: 1,
            check_invariants: false,
        }
    }
}

impl Settings {
    /// Set the iteration limit.
    pub fn with_maximum_iterations(mut self, maximum_iterations: u64) -> Self {
        self.maximum_iterations = maximum_iterations;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Set the pivot rule.
    pub fn with_pivot_rule(mut self, pivot_rule: PivotRuleKind) -> Self {
        self.pivot_rule = pivot_rule;
        self
    }

    /// Set the perturbation behavior.
    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace values with which the infeasibility penalty would never reach its cap.
    pub(crate) fn normalized(mut self) -> Self {
        let default = Self::default();
        if !(self.infeasibility_cost_multiplier > 1_f64) {
            warn!(
                "infeasibility cost multiplier {} doesn't exceed one, using {}",
                self.infeasibility_cost_multiplier, default.infeasibility_cost_multiplier,
            );
            self.infeasibility_cost_multiplier = default.infeasibility_cost_multiplier;
        }
        if self.max_infeasibility_cost.is_nan() {
            warn!("maximum infeasibility cost is NaN, using {:e}", default.max_infeasibility_cost);
            self.max_infeasibility_cost = default.max_infeasibility_cost;
        }

        self
    }
}
