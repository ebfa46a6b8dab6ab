//! # Perturbation
//!
//! Degenerate pivots don't move the solution and can make the method cycle or stall. Relaxing the
//! bounds of nonbasic sequences by small random amounts makes ties between rows in the ratio test
//! unlikely. The original bounds are kept, such that the relaxation can be undone exactly.
use log::debug;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{RngCore, SeedableRng};

use crate::algorithm::primal::workspace::Workspace;
use crate::data::linear_program::solution::VariableStatus;

/// Relative size used when perturbation is switched on automatically.
pub const DEFAULT_MAGNITUDE: f64 = 1e-5;

/// Bounds before a perturbation.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    lower: Vec<f64>,
    upper: Vec<f64>,
    nr_perturbed: usize,
}

impl Snapshot {
    /// Number of bounds that were moved.
    pub fn nr_perturbed(&self) -> usize {
        self.nr_perturbed
    }
}

/// Widen the bound of each nonbasic sequence that sits at a finite, nonzero bound.
///
/// The bound moves outward by `u * magnitude * min(range, |value| + 1)` with `u` uniform in
/// `[0.5, 1)`, but never by more than a tenth of the bound's magnitude. The sequence moves with
/// its bound. Fixed sequences are left alone.
///
/// The live bounds in the workspace should be the true bounds when this is called. Basic values
/// need to be recomputed afterwards.
pub fn perturb(workspace: &mut Workspace, magnitude: f64, seed: u64) -> Snapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut snapshot = Snapshot {
        lower: workspace.lower.clone(),
        upper: workspace.upper.clone(),
        nr_perturbed: 0,
    };

    for sequence in 0..workspace.nr_sequences() {
        let status = workspace.status[sequence];
        if !matches!(status, VariableStatus::AtLowerBound | VariableStatus::AtUpperBound) {
            continue;
        }

        let (lower, upper) = (workspace.lower[sequence], workspace.upper[sequence]);
        let bound = if status == VariableStatus::AtLowerBound { lower } else { upper };
        if bound == 0_f64 || !bound.is_finite() {
            continue;
        }

        let u = 0.5 + 0.5 * (rng.next_u32() as f64 / (u32::MAX as f64 + 1_f64));
        let range = upper - lower;
        let value = workspace.solution[sequence];
        let amount = (u * magnitude * range.min(value.abs() + 1_f64)).min(0.1 * bound.abs());
        if amount <= 0_f64 {
            continue;
        }

        if status == VariableStatus::AtLowerBound {
            workspace.lower[sequence] = lower - amount;
            workspace.solution[sequence] = lower - amount;
        } else {
            workspace.upper[sequence] = upper + amount;
            workspace.solution[sequence] = upper + amount;
        }
        snapshot.nr_perturbed += 1;
    }

    debug!("perturbed {} bounds with magnitude {:e}", snapshot.nr_perturbed, magnitude);
    snapshot
}

/// Restore the bounds from before the perturbation.
///
/// Nonbasic sequences are moved onto the restored bound they were at. Basic values need to be
/// recomputed afterwards.
pub fn unperturb(workspace: &mut Workspace, snapshot: Snapshot) {
    debug_assert_eq!(snapshot.lower.len(), workspace.nr_sequences());

    workspace.lower = snapshot.lower;
    workspace.upper = snapshot.upper;
    for sequence in 0..workspace.nr_sequences() {
        match workspace.status[sequence] {
            VariableStatus::AtLowerBound => workspace.solution[sequence] = workspace.lower[sequence],
            VariableStatus::AtUpperBound => workspace.solution[sequence] = workspace.upper[sequence],
            VariableStatus::IsFixed => workspace.solution[sequence] = workspace.lower[sequence],
            VariableStatus::Basic | VariableStatus::IsFree | VariableStatus::SuperBasic => {},
        }
    }

    debug!("removed perturbation of {} bounds", snapshot.nr_perturbed);
}
