//! # Pivot rules
//!
//! Strategies for choosing the entering sequence of the primal simplex method.
use crate::algorithm::primal::settings::PivotRuleKind;
use crate::algorithm::primal::workspace::Workspace;
use crate::data::linear_algebra::vector::IndexedVector;
use crate::data::linear_program::solution::VariableStatus;

/// A sequence that may enter the basis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    /// The entering sequence.
    pub sequence: usize,
    /// Its reduced cost at the time of pricing.
    pub dj: f64,
    /// How attractive the candidate is; larger is better.
    pub score: f64,
}

impl Candidate {
    /// Direction in which the entering sequence moves: `1` for increasing, `-1` for decreasing.
    pub fn direction(&self) -> f64 {
        if self.dj < 0_f64 { 1_f64 } else { -1_f64 }
    }
}

/// Information about a basis change needed to update pricing weights.
pub struct BasisChange<'a> {
    /// Sequence that entered the basis.
    pub entering: usize,
    /// Sequence that left the basis.
    pub leaving: usize,
    /// Pivot element.
    pub alpha: f64,
    /// Transformed entering column `B^-1 a_q`, indexed by basis position.
    pub column: &'a IndexedVector<f64>,
    /// Row of the tableau at the pivot position, computed before the basis change, indexed by
    /// sequence.
    pub row: &'a IndexedVector<f64>,
}

/// Deciding which sequence enters the basis.
///
/// Only nonbasic sequences whose reduced cost indicates a profitable direction of movement,
/// beyond the dual tolerance, are eligible. Flagged sequences are never eligible.
pub trait PivotRule {
    /// Create a new instance.
    fn new(workspace: &Workspace) -> Self
    where
        Self: Sized;

    /// Find the best eligible candidates.
    ///
    /// # Arguments
    ///
    /// * `tolerance`: Dual tolerance.
    /// * `count`: Maximum number of candidates to return.
    ///
    /// # Return value
    ///
    /// At most `count` candidates, best first. Empty when no sequence is eligible.
    fn price(&mut self, workspace: &Workspace, tolerance: f64, count: usize) -> Vec<Candidate>;

    /// Column selection rule for the primal simplex method.
    fn select_entering(&mut self, workspace: &Workspace, tolerance: f64) -> Option<Candidate> {
        self.price(workspace, tolerance, 1).into_iter().next()
    }

    /// Update the internal state after a pivot.
    fn update_weights(&mut self, _change: &BasisChange) {
    }

    /// Forget all accumulated state, for example after the costs changed.
    fn reset(&mut self, _workspace: &Workspace) {
    }
}

/// Create the pivot rule selected in the settings.
pub fn from_kind(kind: PivotRuleKind, workspace: &Workspace) -> Box<dyn PivotRule + Send> {
    match kind {
        PivotRuleKind::Dantzig => Box::new(Dantzig::new(workspace)),
        PivotRuleKind::SteepestEdge => Box::new(Devex::new(workspace)),
        PivotRuleKind::Partial { chunk } => {
            let mut rule = Partial::new(workspace);
            rule.chunk = chunk.max(1);
            Box::new(rule)
        },
    }
}

/// Amount by which the reduced cost of a nonbasic sequence has the wrong sign.
///
/// # Return value
///
/// `None` if moving the sequence would not improve the objective.
pub fn violation(workspace: &Workspace, sequence: usize, tolerance: f64) -> Option<f64> {
    if workspace.is_flagged(sequence) {
        return None;
    }

    let dj = workspace.dj[sequence];
    let violation = match workspace.status(sequence) {
        VariableStatus::Basic | VariableStatus::IsFixed => 0_f64,
        VariableStatus::AtLowerBound => -dj,
        VariableStatus::AtUpperBound => dj,
        VariableStatus::IsFree | VariableStatus::SuperBasic => dj.abs(),
    };

    if violation > tolerance { Some(violation) } else { None }
}

/// Insert a candidate into a list sorted by decreasing score of at most `count` elements.
///
/// Candidates with equal scores keep the order in which they were offered.
fn keep_best(best: &mut Vec<Candidate>, candidate: Candidate, count: usize) {
    if count == 0 {
        return;
    }
    if best.len() == count && best[count - 1].score >= candidate.score {
        return;
    }

    let position = best.iter().position(|c| c.score < candidate.score).unwrap_or(best.len());
    best.insert(position, candidate);
    best.truncate(count);
}

/// Largest violation of the reduced cost.
pub struct Dantzig;

impl PivotRule for Dantzig {
    fn new(_workspace: &Workspace) -> Self {
        Self
    }

    fn price(&mut self, workspace: &Workspace, tolerance: f64, count: usize) -> Vec<Candidate> {
        let mut best = Vec::with_capacity(count);
        for sequence in 0..workspace.nr_sequences() {
            if let Some(score) = violation(workspace, sequence, tolerance) {
                keep_best(&mut best, Candidate { sequence, dj: workspace.dj[sequence], score }, count);
            }
        }
        best
    }
}

/// Devex approximation of steepest edge pricing.
///
/// Each sequence carries a reference weight approximating the squared norm of its column in the
/// tableau, relative to the reference framework of the sequences that were nonbasic at the last
/// reset. Candidates are compared by `dj^2 / weight`.
pub struct Devex {
    weights: Vec<f64>,
    nr_resets: usize,
}

impl Devex {
    /// The weight estimate of the entering sequence may be this far off before all weights are
    /// reset.
    const RESET_RATIO: f64 = 3_f64;

    /// Reference weight of a sequence.
    pub fn weight(&self, sequence: usize) -> f64 {
        self.weights[sequence]
    }

    /// Number of times the reference framework was reset.
    pub fn nr_resets(&self) -> usize {
        self.nr_resets
    }
}

impl PivotRule for Devex {
    fn new(workspace: &Workspace) -> Self {
        Self {
            weights: vec![1_f64; workspace.nr_sequences()],
            nr_resets: 0,
        }
    }

    fn price(&mut self, workspace: &Workspace, tolerance: f64, count: usize) -> Vec<Candidate> {
        let mut best = Vec::with_capacity(count);
        for sequence in 0..workspace.nr_sequences() {
            if let Some(violation) = violation(workspace, sequence, tolerance) {
                let score = violation * violation / self.weights[sequence];
                keep_best(&mut best, Candidate { sequence, dj: workspace.dj[sequence], score }, count);
            }
        }
        best
    }

    fn update_weights(&mut self, change: &BasisChange) {
        debug_assert_ne!(change.alpha, 0_f64);

        let exact = 1_f64 + change.column.squared_norm();
        let entering_weight = self.weights[change.entering].max(1_f64);

        for (sequence, value) in change.row.iter() {
            if sequence != change.entering && sequence != change.leaving && value != 0_f64 {
                let ratio = value / change.alpha;
                self.weights[sequence] = self.weights[sequence].max(ratio * ratio * entering_weight);
            }
        }
        self.weights[change.leaving] = (entering_weight / (change.alpha * change.alpha)).max(1_f64);
        self.weights[change.entering] = 1_f64;

        if entering_weight > Self::RESET_RATIO * exact || exact > Self::RESET_RATIO * entering_weight {
            self.weights.iter_mut().for_each(|weight| *weight = 1_f64);
            self.nr_resets += 1;
        }
    }

    fn reset(&mut self, _workspace: &Workspace) {
        self.weights.iter_mut().for_each(|weight| *weight = 1_f64);
        self.nr_resets += 1;
    }
}

/// Largest violation within a block of sequences.
///
/// The search starts at the block after the one where the last candidate was found, and moves on
/// to the next block only if the current one has no candidate.
pub struct Partial {
    chunk: usize,
    start: usize,
}

impl PivotRule for Partial {
    fn new(workspace: &Workspace) -> Self {
        Self {
            chunk: (workspace.nr_sequences() / 10).max(1),
            start: 0,
        }
    }

    fn price(&mut self, workspace: &Workspace, tolerance: f64, count: usize) -> Vec<Candidate> {
        let nr_sequences = workspace.nr_sequences();
        if nr_sequences == 0 {
            return Vec::new();
        }

        let mut best = Vec::with_capacity(count);
        let mut scanned = 0;
        let mut block_start = self.start % nr_sequences;
        while scanned < nr_sequences {
            let block_length = self.chunk.min(nr_sequences - scanned);
            for offset in 0..block_length {
                let sequence = (block_start + offset) % nr_sequences;
                if let Some(score) = violation(workspace, sequence, tolerance) {
                    keep_best(&mut best, Candidate { sequence, dj: workspace.dj[sequence], score }, count);
                }
            }
            scanned += block_length;
            block_start = (block_start + block_length) % nr_sequences;

            if !best.is_empty() {
                self.start = block_start;
                break;
            }
        }

        best
    }
}
