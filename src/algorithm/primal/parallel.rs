//! # Evaluating several entering candidates at once
//!
//! The ratio tests of the best few pricing candidates are independent of one another: each needs
//! only its own transformed column and a private copy of the tentative infeasibility marks. They
//! run on the rayon thread pool and are joined before anything is modified. The candidate that
//! improves the objective most is then committed like a serial iteration.
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::algorithm::factorization::BasisFactorization;
use crate::algorithm::primal::nonlinear_cost::NonLinearCost;
use crate::algorithm::primal::ratio_test::{Parameters, primal_row, RatioTestResult, Step};
use crate::algorithm::primal::strategy::pivot_rule::Candidate;
use crate::algorithm::primal::workspace::Workspace;
use crate::data::linear_algebra::vector::IndexedVector;

/// Ratio test outcome of one candidate.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// The entering candidate.
    pub candidate: Candidate,
    /// Its transformed column, indexed by basis position.
    pub column: IndexedVector<f64>,
    /// The step it would take.
    pub result: RatioTestResult,
}

impl Evaluation {
    /// Predicted decrease of the objective with the live costs.
    fn improvement(&self) -> f64 {
        match self.result.step {
            Step::NoPivot => f64::INFINITY,
            _ => (self.result.dual_in * self.result.theta).abs(),
        }
    }
}

/// Run the ratio test for each candidate concurrently.
///
/// Only reads the workspace, the factorization and the tracker.
pub fn evaluate<BF: BasisFactorization + Sync>(
    workspace: &Workspace,
    cost: &NonLinearCost,
    factorization: &BF,
    candidates: &[Candidate],
    parameters: &Parameters,
) -> Vec<Evaluation> {
    candidates.par_iter()
        .map(|&candidate| {
            let mut column = IndexedVector::new(workspace.nr_rows());
            workspace.transformed_column(candidate.sequence, factorization, &mut column);
            let mut cost = cost.clone();
            let result = primal_row(workspace, &mut cost, candidate.sequence, candidate.direction(), &column, parameters);

            Evaluation { candidate, column, result }
        })
        .collect()
}

/// Pick the evaluation to commit.
///
/// A candidate without any blocking row wins outright. Otherwise the largest predicted
/// improvement wins, and ties go to the better priced candidate. Candidates whose ratio test
/// rejected the reduced cost are only chosen if nothing else is left.
pub fn choose(evaluations: Vec<Evaluation>) -> Option<Evaluation> {
    let mut best: Option<Evaluation> = None;
    for evaluation in evaluations {
        let replace = match &best {
            None => true,
            Some(current) => {
                let usable = evaluation.result.dual_in != 0_f64;
                let current_usable = current.result.dual_in != 0_f64;
                (usable && !current_usable)
                    || (usable == current_usable && evaluation.improvement() > current.improvement())
            },
        };
        if replace {
            best = Some(evaluation);
        }
    }

    best
}
