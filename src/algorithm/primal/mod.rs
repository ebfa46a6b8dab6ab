//! # The primal simplex method
//!
//! A bounded-variable primal simplex method that doesn't need a feasible starting basis. Bound
//! violations of basic sequences are priced by a piecewise-linear penalty (see
//! `nonlinear_cost`), so that a single sequence of pivots first reduces the infeasibility and then
//! the objective.
//!
//! The control loop alternates between a refresh round and a run of iterations. A refresh
//! factorizes the basis, recomputes the values and reduced costs from scratch and decides on the
//! status of the problem. Iterations run until a refresh is due, because of the number of column
//! replacements, numerical trouble, or because no entering candidate is left. Optimality is only
//! declared on a fresh factorization, with the original bounds, the original tolerance and no
//! sequences excluded from pricing.
use std::time::Instant;

use log::{debug, trace};

use crate::algorithm::factorization::{BasisFactorization, UpdateQuality};
use crate::algorithm::factorization::lower_upper::LUDecomposition;
use crate::algorithm::primal::event::{Event, EventHandler, EventResponse, Snapshot};
use crate::algorithm::primal::nonlinear_cost::{NonLinearCost, Regime};
use crate::algorithm::primal::parallel::Evaluation;
use crate::algorithm::primal::progress::Progress;
use crate::algorithm::primal::ratio_test::{Parameters, primal_row, Step};
use crate::algorithm::primal::settings::{Perturbation, Settings};
use crate::algorithm::primal::strategy::pivot_rule::{self, PivotRule};
use crate::algorithm::primal::update::{apply_move, apply_pivot, Pivot, prepare_pivot, Scratch};
use crate::algorithm::primal::workspace::{SavedBasis, Workspace};
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::problem::Problem;
use crate::data::linear_program::solution::{IterationKind, Solution, Statistics, Status};
use crate::error::SolveError;

pub mod event;
pub mod nonlinear_cost;
pub mod parallel;
pub mod perturbation;
pub mod progress;
pub mod settings;
pub mod strategy;
pub mod update;
pub mod workspace;

/// Rounds of clearing flags before optimality is judged with the flags in place.
const MAX_CLEANUP_ROUNDS: usize = 4;
/// Consecutive degenerate iterations after which automatic perturbation kicks in.
const DEGENERATE_STALL: usize = 50;
/// Residuals beyond this value can't be recovered from.
const BLOW_UP: f64 = 1e10;
/// Smallest pivot tolerance used before an unbounded direction is believed.
const UNBOUNDED_PIVOT_TOLERANCE: f64 = 1e-8;

/// Solve a problem with the default factorization.
pub fn solve(problem: &Problem, settings: &Settings) -> Result<Solution, SolveError> {
    PrimalSimplex::new(problem, settings.clone()).solve()
}

/// Whether the residuals after a refresh are small enough to continue from. NaN is not.
fn residuals_acceptable(primal_residual: f64, dual_residual: f64) -> bool {
    primal_residual <= BLOW_UP && dual_residual <= BLOW_UP
}

/// Why a run of iterations ended.
enum Exit {
    /// A refresh is needed before iterating on.
    Refactorize,
    /// Pricing found nothing on a fresh factorization.
    NoCandidate,
    /// The solve is over.
    Terminate(Status),
}

/// State of a primal simplex solve.
pub struct PrimalSimplex<BF = LUDecomposition> {
    workspace: Workspace,
    cost: NonLinearCost,
    factorization: BF,
    pivot_rule: Box<dyn PivotRule + Send>,
    scratch: Scratch,
    /// Transformed column of the entering sequence.
    column: IndexedVector<f64>,
    progress: Progress,
    handler: Option<Box<dyn EventHandler>>,
    settings: Settings,

    /// Current primal tolerance, possibly widened by the ratio test.
    primal_tolerance: f64,
    /// Tolerance the nonbasic values were last checked against (nonpositive before the first check).
    checked_tolerance: f64,
    pivot_tolerance: f64,
    refactor_frequency: usize,
    /// Original bounds while perturbed.
    perturbation: Option<perturbation::Snapshot>,
    perturbed_before: bool,
    /// Basis of the last successful factorization.
    good_basis: Option<SavedBasis>,
    /// Whether the factorization represents the current basis.
    factorized: bool,
    /// A reduced cost disagreed with its recomputation since the last successful iteration.
    dj_mismatch: bool,
    last_entering: Option<usize>,
    cleanup_rounds: usize,

    iterations: u64,
    statistics: Statistics,
    ray: Option<Vec<f64>>,
    dual_ray: Option<Vec<f64>>,
}

impl PrimalSimplex<LUDecomposition> {
    /// Set up a solve with the default LU factorization.
    pub fn new(problem: &Problem, settings: Settings) -> Self {
        Self::with_factorization(problem, settings)
    }
}

impl<BF> PrimalSimplex<BF>
where
    BF: BasisFactorization + Sync,
{
    /// Set up a solve starting from the slack basis.
    pub fn with_factorization(problem: &Problem, settings: Settings) -> Self {
        let settings = settings.normalized();
        let workspace = Workspace::new(problem);
        let cost = NonLinearCost::new(&workspace, settings.initial_infeasibility_cost);
        let factorization = BF::new(workspace.nr_rows());
        let pivot_rule = pivot_rule::from_kind(settings.pivot_rule, &workspace);
        let scratch = Scratch::new(&workspace);
        let column = IndexedVector::new(workspace.nr_rows());

        Self {
            primal_tolerance: settings.primal_tolerance,
            checked_tolerance: 0_f64,
            pivot_tolerance: settings.pivot_tolerance,
            refactor_frequency: settings.refactor_frequency.max(1),

            workspace,
            cost,
            factorization,
            pivot_rule,
            scratch,
            column,
            progress: Progress::default(),
            handler: None,
            settings,

            perturbation: None,
            perturbed_before: false,
            good_basis: None,
            factorized: false,
            dj_mismatch: false,
            last_entering: None,
            cleanup_rounds: 0,

            iterations: 0,
            statistics: Statistics::default(),
            ray: None,
            dual_ray: None,
        }
    }

    /// Observe the solve.
    pub fn set_event_handler(&mut self, handler: Box<dyn EventHandler>) {
        self.handler = Some(handler);
    }

    /// Run the method until a terminal status is reached.
    ///
    /// # Return value
    ///
    /// A solution for every terminal status, or an error if an internal consistency check failed.
    pub fn solve(&mut self) -> Result<Solution, SolveError> {
        let start = Instant::now();
        if let Perturbation::On { magnitude } = self.settings.perturbation {
            self.perturb(magnitude);
        }

        loop {
            if let Some(status) = self.refresh()? {
                return Ok(self.finish(status));
            }
            if let EventResponse::Terminate(status) = self.notify(Event::EndOfFactorization) {
                return Ok(self.finish(status));
            }

            match self.iterate(start)? {
                Exit::Refactorize => {},
                Exit::NoCandidate => if let Some(status) = self.no_candidate() {
                    return Ok(self.finish(status));
                },
                Exit::Terminate(status) => return Ok(self.finish(status)),
            }
        }
    }

    /// Factorize and recompute everything from scratch.
    ///
    /// # Return value
    ///
    /// A terminal status if the solve can't continue.
    fn refresh(&mut self) -> Result<Option<Status>, SolveError> {
        self.statistics.record(IterationKind::Refactorization);
        if let Err(error) = self.factorization.factorize(&self.workspace.basis_columns()) {
            debug!("iteration {}: {}", self.iterations, error);
            self.cost.feasible_bounds(&mut self.workspace);
            match self.good_basis.take() {
                Some(basis) => {
                    self.workspace.restore_basis(basis);
                    if let Some(entering) = self.last_entering {
                        self.workspace.flag(entering);
                    }
                },
                None => self.workspace.reset_to_slack_basis(self.primal_tolerance),
            }
            self.pivot_rule.reset(&self.workspace);

            if let Err(error) = self.factorization.factorize(&self.workspace.basis_columns()) {
                debug!("restored basis can't be factorized either: {}", error);
                self.factorized = false;
                return Ok(Some(Status::DualFallback));
            }
        }
        self.factorized = true;

        self.cost.check_infeasibilities(&mut self.workspace, self.checked_tolerance, self.primal_tolerance);
        self.workspace.compute_primal(&self.factorization);
        self.cost.check_infeasibilities(&mut self.workspace, self.primal_tolerance, self.primal_tolerance);
        self.checked_tolerance = self.primal_tolerance;

        if self.cost.number_infeasibilities() > 0 {
            self.progress.record_round(self.cost.sum_infeasibilities());
            if self.progress.infeasibility_stalled() {
                if self.perturbation.is_some() {
                    debug!("infeasibility stalled while perturbed");
                    self.unperturb();
                    self.cost.check_infeasibilities(&mut self.workspace, self.checked_tolerance, self.primal_tolerance);
                    self.workspace.compute_primal(&self.factorization);
                    self.cost.check_infeasibilities(&mut self.workspace, self.primal_tolerance, self.primal_tolerance);
                    self.checked_tolerance = self.primal_tolerance;
                } else if self.cost.weight() < self.settings.max_infeasibility_cost {
                    self.escalate_weight();
                    self.cost.check_infeasibilities(&mut self.workspace, self.primal_tolerance, self.primal_tolerance);
                }
            }
        }
        let duals = self.workspace.compute_duals(&self.factorization);

        let primal_residual = self.workspace.primal_residual();
        let dual_residual = self.workspace.dual_residual(&duals);
        if !residuals_acceptable(primal_residual, dual_residual) {
            debug!("residuals {:e} (primal) and {:e} (dual) are too large", primal_residual, dual_residual);
            return Ok(Some(Status::DualFallback));
        }

        if cfg!(debug_assertions) || self.settings.check_invariants {
            self.workspace.check_basis()?;
            self.cost.validate(&self.workspace)?;
        }

        self.good_basis = Some(self.workspace.save_basis());
        debug!(
            "iteration {}: objective {}, {} infeasibilities summing to {:e}, weight {:e}",
            self.iterations,
            self.cost.feasible_cost(),
            self.cost.number_infeasibilities(),
            self.cost.sum_infeasibilities(),
            self.cost.weight(),
        );

        Ok(None)
    }

    /// Iterate until a refresh is needed or the solve ends.
    fn iterate(&mut self, start: Instant) -> Result<Exit, SolveError> {
        loop {
            if self.iterations >= self.settings.maximum_iterations {
                return Ok(Exit::Terminate(Status::IterationLimit));
            }
            if self.settings.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                return Ok(Exit::Terminate(Status::IterationLimit));
            }
            if self.factorization.pivots() >= self.refactor_frequency {
                return Ok(Exit::Refactorize);
            }

            let count = self.settings.parallel_candidates.max(1);
            let candidates = self.pivot_rule.price(&self.workspace, self.settings.dual_tolerance, count);
            let Some(&first) = candidates.first() else {
                if self.factorization.pivots() > 0 {
                    return Ok(Exit::Refactorize);
                }
                return Ok(match self.notify(Event::NoCandidateInPrimal) {
                    EventResponse::Terminate(status) => Exit::Terminate(status),
                    EventResponse::Continue | EventResponse::Refactorize => Exit::NoCandidate,
                });
            };

            let parameters = self.parameters();
            let (candidate, result) = if candidates.len() > 1 {
                let evaluations = parallel::evaluate(
                    &self.workspace, &self.cost, &self.factorization, &candidates, &parameters,
                );
                match parallel::choose(evaluations) {
                    Some(Evaluation { candidate, column, result }) => {
                        self.column = column;
                        (candidate, result)
                    },
                    None => return Ok(Exit::Refactorize),
                }
            } else {
                self.workspace.transformed_column(first.sequence, &self.factorization, &mut self.column);
                let result = primal_row(
                    &self.workspace, &mut self.cost, first.sequence, first.direction(), &self.column, &parameters,
                );
                (first, result)
            };
            let entering = candidate.sequence;
            self.last_entering = Some(entering);

            if result.dual_in == 0_f64 {
                trace!("rejecting {}: step would create infeasibilities", entering);
                self.reject(entering);
                continue;
            }
            let consistent = (candidate.dj - result.dual_in).abs() <= 1e-2 * (1_f64 + candidate.dj.abs())
                && candidate.dj * result.dual_in > 0_f64;
            if !consistent {
                debug!("reduced cost of {} was {:e}, recomputed {:e}", entering, candidate.dj, result.dual_in);
                if !self.dj_mismatch {
                    self.dj_mismatch = true;
                    return Ok(Exit::Refactorize);
                }
                self.reject(entering);
                continue;
            }

            let leaving = match result.step {
                Step::Pivot { row, .. } => Some(self.workspace.pivot_variable[row]),
                _ => None,
            };
            match self.notify(Event::PivotRow { entering, leaving }) {
                EventResponse::Terminate(status) => return Ok(Exit::Terminate(status)),
                EventResponse::Refactorize => return Ok(Exit::Refactorize),
                EventResponse::Continue => {},
            }

            self.primal_tolerance = result.primal_tolerance;
            self.cost.set_average_theta(result.average_theta);
            let mut refactorize_after = false;
            match result.step {
                Step::Pivot { row, alpha, value_out } => {
                    let quality = prepare_pivot(
                        &self.workspace, &self.factorization, &mut self.scratch, row, entering, &self.column,
                    );
                    match quality {
                        UpdateQuality::Stable => {},
                        UpdateQuality::SlightError => refactorize_after = self.factorization.pivots() > 5,
                        UpdateQuality::MajorError if self.factorization.pivots() > 0 => {
                            debug!("pivot on {} is inaccurate, refactorizing", entering);
                            return Ok(Exit::Refactorize);
                        },
                        UpdateQuality::MajorError | UpdateQuality::Singular => {
                            debug!("pivot {:e} on {} is unacceptable ({:?})", alpha, entering, quality);
                            self.reject(entering);
                            if self.factorization.pivots() > 0 {
                                return Ok(Exit::Refactorize);
                            }
                            continue;
                        },
                        UpdateQuality::OutOfMemory => {
                            self.factorization.grow();
                            return Ok(Exit::Refactorize);
                        },
                    }

                    let pivot = Pivot {
                        entering, row, alpha, theta: result.theta, dual_in: result.dual_in, value_out,
                    };
                    let leaving = apply_pivot(
                        &mut self.workspace,
                        &mut self.cost,
                        &mut self.factorization,
                        self.pivot_rule.as_mut(),
                        &mut self.scratch,
                        pivot,
                        &self.column,
                        self.primal_tolerance,
                    );
                    trace!("{} enters, {} leaves, theta {:e}, alpha {:e}", entering, leaving, result.theta, alpha);
                    self.statistics.record(IterationKind::Pivot);
                    self.progress.record_iteration(entering, Some(leaving), result.theta);
                },
                Step::BoundFlip | Step::BoundedStep => {
                    apply_move(
                        &mut self.workspace,
                        &mut self.cost,
                        &self.factorization,
                        &mut self.scratch,
                        entering,
                        result.theta,
                        &self.column,
                        self.primal_tolerance,
                    );
                    trace!("{} moves by {:e} ({:?})", entering, result.theta, result.step);
                    self.statistics.record(match result.step {
                        Step::BoundFlip => IterationKind::BoundFlip,
                        _ => IterationKind::BoundedStep,
                    });
                    self.progress.record_iteration(entering, None, result.theta);
                },
                Step::NoPivot => match self.no_pivot(candidate.direction()) {
                    Some(status) => return Ok(Exit::Terminate(status)),
                    None => return Ok(Exit::Refactorize),
                },
            }
            self.iterations += 1;
            self.dj_mismatch = false;

            if self.settings.check_invariants {
                self.workspace.check_basis()?;
                self.cost.validate(&self.workspace)?;
            }

            match self.notify(Event::EndOfIteration) {
                EventResponse::Terminate(status) => return Ok(Exit::Terminate(status)),
                EventResponse::Refactorize => return Ok(Exit::Refactorize),
                EventResponse::Continue => {},
            }

            if self.progress.nr_degenerate() > DEGENERATE_STALL || self.progress.is_cycling() {
                if self.settings.perturbation == Perturbation::Automatic && !self.perturbed_before {
                    self.perturb(perturbation::DEFAULT_MAGNITUDE);
                    return Ok(Exit::Refactorize);
                } else if self.progress.is_cycling() {
                    debug!("cycling detected, excluding {} from pricing", entering);
                    self.workspace.flag(entering);
                }
            }

            if refactorize_after {
                return Ok(Exit::Refactorize);
            }
        }
    }

    /// Decide what to do when nothing can enter the basis on a fresh factorization.
    ///
    /// # Return value
    ///
    /// A terminal status, or `None` to continue.
    fn no_candidate(&mut self) -> Option<Status> {
        if self.unperturb() {
            return None;
        }

        if self.workspace.nr_flagged() > 0 {
            let nr_flagged = self.workspace.unflag();
            if self.cleanup_rounds < MAX_CLEANUP_ROUNDS {
                self.cleanup_rounds += 1;
                debug!("cleared {} flags", nr_flagged);
                return None;
            }
            if !self.pivot_rule.price(&self.workspace, self.settings.dual_tolerance, 1).is_empty() {
                debug!("flagged sequences remain attractive after {} rounds", MAX_CLEANUP_ROUNDS);
                return Some(Status::DualFallback);
            }
        }

        if self.cost.number_infeasibilities() > 0 {
            if self.cost.weight() >= self.settings.max_infeasibility_cost {
                self.dual_ray = Some(self.infeasibility_ray());
                return Some(Status::Infeasible);
            }
            self.escalate_weight();
            return None;
        }

        if self.primal_tolerance > self.settings.primal_tolerance {
            debug!("restoring primal tolerance {:e}", self.settings.primal_tolerance);
            self.primal_tolerance = self.settings.primal_tolerance;
            return None;
        }

        Some(Status::Optimal)
    }

    /// Decide what to do when the entering sequence can move without limit.
    ///
    /// # Return value
    ///
    /// A terminal status, or `None` to refactorize and try again.
    fn no_pivot(&mut self, direction: f64) -> Option<Status> {
        if self.factorization.pivots() > 0 {
            return None;
        }
        if self.parameters().acceptable_pivot() > UNBOUNDED_PIVOT_TOLERANCE {
            self.pivot_tolerance = UNBOUNDED_PIVOT_TOLERANCE;
            return None;
        }
        if self.cost.number_infeasibilities() > 0 && self.cost.weight() < self.settings.max_infeasibility_cost {
            self.escalate_weight();
            return None;
        }

        let nr_rows = self.workspace.nr_rows();
        let mut ray = vec![0_f64; self.workspace.nr_columns()];
        if let Some(entering) = self.last_entering.filter(|&sequence| !self.workspace.is_logical(sequence)) {
            ray[entering - nr_rows] = direction;
        }
        for (row, alpha) in self.column.iter() {
            let sequence = self.workspace.pivot_variable[row];
            if !self.workspace.is_logical(sequence) {
                ray[sequence - nr_rows] = -direction * alpha;
            }
        }
        self.ray = Some(ray);

        Some(Status::Unbounded)
    }

    /// Exclude a sequence from pricing after an unacceptable iteration.
    fn reject(&mut self, sequence: usize) {
        self.workspace.flag(sequence);
        self.statistics.record(IterationKind::Rejected);
    }

    /// Increase the penalty on infeasibility. Live costs change at the next refresh.
    fn escalate_weight(&mut self) {
        let weight = (self.cost.weight() * self.settings.infeasibility_cost_multiplier)
            .min(self.settings.max_infeasibility_cost);
        debug!("infeasibility weight {:e} -> {:e}", self.cost.weight(), weight);

        self.cost.set_weight(weight);
        self.pivot_rule.reset(&self.workspace);
        self.progress.reset();
    }

    /// Relax the bounds of the nonbasic sequences.
    fn perturb(&mut self, magnitude: f64) {
        self.cost.feasible_bounds(&mut self.workspace);
        let snapshot = perturbation::perturb(&mut self.workspace, magnitude, self.settings.seed);
        self.perturbation = Some(snapshot);
        self.perturbed_before = true;
        self.rebuild_cost();
    }

    /// Restore the original bounds, if they were perturbed.
    fn unperturb(&mut self) -> bool {
        match self.perturbation.take() {
            Some(snapshot) => {
                self.cost.feasible_bounds(&mut self.workspace);
                perturbation::unperturb(&mut self.workspace, snapshot);
                self.rebuild_cost();
                true
            },
            None => false,
        }
    }

    /// Take the live bounds as the true bounds, after they were changed.
    fn rebuild_cost(&mut self) {
        let average_theta = self.cost.average_theta();
        self.cost = NonLinearCost::new(&self.workspace, self.cost.weight());
        self.cost.set_average_theta(average_theta);
        self.checked_tolerance = 0_f64;
        self.good_basis = None;
        self.pivot_rule.reset(&self.workspace);
        self.progress.reset();
    }

    /// Row multipliers of the pure infeasibility objective, on a fresh factorization.
    fn infeasibility_ray(&self) -> Vec<f64> {
        let nr_rows = self.workspace.nr_rows();
        let mut duals = IndexedVector::new(nr_rows);
        for (row, &sequence) in self.workspace.pivot_variable.iter().enumerate() {
            match self.cost.regime(sequence) {
                Regime::BelowLower => duals.set(row, -1_f64),
                Regime::AboveUpper => duals.set(row, 1_f64),
                Regime::Feasible => {},
            }
        }
        self.factorization.btran(&mut duals);

        (0..nr_rows).map(|row| duals[row]).collect()
    }

    fn parameters(&self) -> Parameters {
        Parameters {
            primal_tolerance: self.primal_tolerance,
            max_primal_tolerance: self.settings.max_primal_tolerance,
            dual_tolerance: self.settings.dual_tolerance,
            pivot_tolerance: self.pivot_tolerance,
            minimum_theta_movement: self.settings.minimum_theta_movement,
            iterations: self.iterations,
            pivots: self.factorization.pivots(),
        }
    }

    fn notify(&mut self, event: Event) -> EventResponse {
        let snapshot = Snapshot {
            iterations: self.iterations,
            objective: self.cost.feasible_report_cost(&self.workspace),
            number_infeasibilities: self.cost.number_infeasibilities(),
            sum_infeasibilities: self.cost.sum_infeasibilities(),
            infeasibility_cost: self.cost.weight(),
        };

        match &mut self.handler {
            Some(handler) => handler.event(event, &snapshot),
            None => EventResponse::Continue,
        }
    }

    /// Put the true bounds and costs back and collect the results.
    fn finish(&mut self, status: Status) -> Solution {
        self.cost.feasible_bounds(&mut self.workspace);
        if let Some(snapshot) = self.perturbation.take() {
            perturbation::unperturb(&mut self.workspace, snapshot);
            if self.factorized {
                self.workspace.compute_primal(&self.factorization);
            }
        }

        let nr_rows = self.workspace.nr_rows();
        let row_duals = if self.factorized {
            let duals = self.workspace.compute_duals(&self.factorization);
            (0..nr_rows).map(|row| duals[row]).collect()
        } else {
            vec![0_f64; nr_rows]
        };

        let workspace = &self.workspace;
        let sum_infeasibilities = (0..workspace.nr_sequences())
            .map(|sequence| {
                let value = workspace.solution[sequence];
                (workspace.lower[sequence] - value).max(value - workspace.upper[sequence]).max(0_f64)
            })
            .sum();
        debug!("{} after {} iterations", status, self.iterations);

        Solution {
            status,
            objective_value: self.cost.feasible_report_cost(workspace),
            primal: workspace.solution.clone(),
            row_activity: workspace.solution[..nr_rows].to_vec(),
            column_values: workspace.solution[nr_rows..].to_vec(),
            statuses: workspace.status.clone(),
            reduced_costs: workspace.dj.clone(),
            row_duals,
            ray: self.ray.take(),
            dual_ray: self.dual_ray.take(),
            sum_infeasibilities,
            infeasibility_cost: self.cost.weight(),
            iterations: self.iterations,
            statistics: self.statistics.clone(),
        }
    }
}
