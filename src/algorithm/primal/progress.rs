//! # Progress monitoring
//!
//! Detecting when the method stops making headway: runs of degenerate pivots, repeating pivots
//! and a sum of infeasibilities that doesn't go down between factorizations.
use std::collections::VecDeque;

/// Number of recent pivots remembered for cycle detection.
const HISTORY: usize = 64;
/// A pivot that occurs this often in the history is considered part of a cycle.
const CYCLE_REPEATS: usize = 3;
/// Number of factorization rounds over which the sum of infeasibilities is compared.
const ROUNDS: usize = 4;
/// Steps shorter than this don't count as movement.
const DEGENERATE_THETA: f64 = 1e-12;

/// Recent history of the solve.
#[derive(Clone, Debug, Default)]
pub struct Progress {
    pivots: VecDeque<(usize, Option<usize>)>,
    nr_degenerate: usize,
    sums: VecDeque<f64>,
}

impl Progress {
    /// Record an iteration.
    ///
    /// # Arguments
    ///
    /// * `leaving`: The sequence that left the basis, if any.
    /// * `theta`: Signed change of the entering sequence.
    pub fn record_iteration(&mut self, entering: usize, leaving: Option<usize>, theta: f64) {
        if self.pivots.len() == HISTORY {
            self.pivots.pop_front();
        }
        self.pivots.push_back((entering, leaving));

        if theta.abs() <= DEGENERATE_THETA {
            self.nr_degenerate += 1;
        } else {
            self.nr_degenerate = 0;
        }
    }

    /// Number of consecutive iterations without movement.
    pub fn nr_degenerate(&self) -> usize {
        self.nr_degenerate
    }

    /// Whether the last pivot has been done several times recently without the solution moving.
    pub fn is_cycling(&self) -> bool {
        match self.pivots.back() {
            Some(last) if self.nr_degenerate > 0 => {
                self.pivots.iter().filter(|&pivot| pivot == last).count() >= CYCLE_REPEATS
            },
            _ => false,
        }
    }

    /// Record the sum of infeasibilities at a factorization.
    pub fn record_round(&mut self, sum_infeasibilities: f64) {
        if self.sums.len() == ROUNDS {
            self.sums.pop_front();
        }
        self.sums.push_back(sum_infeasibilities);
    }

    /// Whether the sum of infeasibilities barely decreased over the last rounds.
    pub fn infeasibility_stalled(&self) -> bool {
        match (self.sums.front(), self.sums.back()) {
            (Some(&first), Some(&last)) if self.sums.len() == ROUNDS => last > 0_f64 && last >= 0.99 * first,
            _ => false,
        }
    }

    /// Forget the history, after a change that invalidates comparisons.
    pub fn reset(&mut self) {
        self.pivots.clear();
        self.nr_degenerate = 0;
        self.sums.clear();
    }
}
