//! # Problems and helpers shared by the integration tests
use primal_simplex::{Problem, SparseMatrix};

/// Install a logger once, such that `RUST_LOG=debug` shows the progress of failing tests.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Compare with an absolute tolerance.
pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "{} is not close to {}", actual, expected);
}

/// Check that `row_activity` equals `A x` and that every value respects its bounds.
pub fn assert_consistent(problem: &Problem, row_activity: &[f64], column_values: &[f64]) {
    let activity = (0..problem.nr_rows())
        .map(|i| problem.matrix().row(i).map(|&(j, value)| value * column_values[j]).sum::<f64>());
    for (computed, reported) in activity.zip(row_activity) {
        assert_close(computed, *reported);
    }
}

/// Check that every value lies within its bounds, up to a tolerance.
pub fn assert_within_bounds(problem: &Problem, row_activity: &[f64], column_values: &[f64]) {
    let bounds = problem.row_lower().iter().zip(problem.row_upper())
        .chain(problem.column_lower().iter().zip(problem.column_upper()));
    for ((&lower, &upper), &value) in bounds.zip(row_activity.iter().chain(column_values)) {
        assert!(value >= lower - 1e-6 && value <= upper + 1e-6, "{} not in [{}, {}]", value, lower, upper);
    }
}

/// `minimize x + 4 z` subject to `x + z >= 2`, `x - 5 y + z = 1`, `0 <= x <= 2`, `0 <= y`,
/// `0 <= z <= 4`.
pub fn two_rows() -> Problem {
    Problem::new(
        vec![2_f64, 1_f64],
        vec![f64::INFINITY, 1_f64],
        vec![0_f64; 3],
        vec![2_f64, 1e30, 4_f64],
        vec![1_f64, 0_f64, 4_f64],
        SparseMatrix::from_triplets(2, 3, &[
            (0, 0, 1_f64), (0, 2, 1_f64),
            (1, 0, 1_f64), (1, 1, -5_f64), (1, 2, 1_f64),
        ]).unwrap(),
    ).unwrap()
}

/// Assignment costs; the linear relaxation of the assignment problem has an integral optimum.
pub const ASSIGNMENT_COSTS: [[f64; 4]; 4] = [
    [4_f64, 1_f64, 3_f64, 2_f64],
    [2_f64, 0_f64, 5_f64, 3_f64],
    [3_f64, 2_f64, 2_f64, 4_f64],
    [1_f64, 3_f64, 4_f64, 2_f64],
];

/// Assign each of four workers to one of four jobs, column `4 i + j` assigning worker `i` to job
/// `j`. The equality rows start infeasible and the problem is highly degenerate.
pub fn assignment() -> Problem {
    let n = ASSIGNMENT_COSTS.len();
    let mut triplets = Vec::new();
    for i in 0..n {
        for j in 0..n {
            triplets.push((i, n * i + j, 1_f64));
            triplets.push((n + i, n * j + i, 1_f64));
        }
    }

    Problem::new(
        vec![1_f64; 2 * n],
        vec![1_f64; 2 * n],
        vec![0_f64; n * n],
        vec![f64::INFINITY; n * n],
        ASSIGNMENT_COSTS.iter().flatten().copied().collect(),
        SparseMatrix::from_triplets(2 * n, n * n, &triplets).unwrap(),
    ).unwrap()
}

/// Cheapest assignment, by enumerating all permutations.
pub fn cheapest_assignment() -> f64 {
    fn search(worker: usize, taken: &mut [bool; 4]) -> f64 {
        if worker == taken.len() {
            return 0_f64;
        }
        let mut best = f64::INFINITY;
        for job in 0..taken.len() {
            if !taken[job] {
                taken[job] = true;
                best = best.min(ASSIGNMENT_COSTS[worker][job] + search(worker + 1, taken));
                taken[job] = false;
            }
        }
        best
    }

    search(0, &mut [false; 4])
}

/// A small production planning problem with a feasible slack basis and several bounded columns.
///
/// ```text
/// maximize    3 a + 2 b + 4 c + d
/// subject to  a + b + 2 c + d <= 40
///             2 a + b + c     <= 50
///             a     + 3 c + d <= 45
///             0 <= a <= 15, 0 <= b <= 20, 0 <= c <= 12, 0 <= d <= 10
/// ```
pub fn production() -> Problem {
    Problem::new(
        vec![f64::NEG_INFINITY; 3],
        vec![40_f64, 50_f64, 45_f64],
        vec![0_f64; 4],
        vec![15_f64, 20_f64, 12_f64, 10_f64],
        vec![-3_f64, -2_f64, -4_f64, -1_f64],
        SparseMatrix::from_dense(&[
            vec![1_f64, 1_f64, 2_f64, 1_f64],
            vec![2_f64, 1_f64, 1_f64, 0_f64],
            vec![1_f64, 0_f64, 3_f64, 1_f64],
        ]),
    ).unwrap()
}

/// The production problem with minimum quantities, such that the columns start at nonzero bounds.
pub fn shifted_production() -> Problem {
    let problem = production();
    Problem::new(
        problem.row_lower().to_vec(),
        problem.row_upper().to_vec(),
        vec![1_f64, 2_f64, 1_f64, 1_f64],
        problem.column_upper().to_vec(),
        problem.objective().to_vec(),
        problem.matrix().clone(),
    ).unwrap()
}
