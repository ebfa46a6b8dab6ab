//! # End-to-end solves with a known outcome
use primal_simplex::{PrimalSimplex, Problem, Settings, solve, SparseMatrix, Status};
use primal_simplex::data::linear_program::solution::IterationKind;

use crate::problems::{
    assert_close, assert_consistent, assert_within_bounds, assignment, cheapest_assignment, init,
    production, two_rows,
};

#[test]
fn two_rows_optimal() {
    init();
    let problem = two_rows();
    let solution = solve(&problem, &Settings::default()).unwrap();

    assert!(solution.is_optimal());
    assert_eq!(solution.status.code(), 0);
    assert_close(solution.objective_value, 2_f64);
    assert_close(solution.column_values[0], 2_f64);
    assert_close(solution.column_values[1], 0.2);
    assert_close(solution.column_values[2], 0_f64);
    assert!(solution.sum_infeasibilities < 1e-7);
    assert_consistent(&problem, &solution.row_activity, &solution.column_values);
    assert_within_bounds(&problem, &solution.row_activity, &solution.column_values);
}

#[test]
fn rows_added_one_at_a_time() {
    init();
    // The same problem, with the equality row appended after construction
    let mut problem = Problem::new(
        vec![2_f64],
        vec![f64::INFINITY],
        vec![0_f64; 3],
        vec![2_f64, f64::INFINITY, 4_f64],
        vec![1_f64, 0_f64, 4_f64],
        SparseMatrix::from_triplets(1, 3, &[(0, 0, 1_f64), (0, 2, 1_f64)]).unwrap(),
    ).unwrap();
    problem.add_row(1_f64, 1_f64, &[(0, 1_f64), (1, -5_f64), (2, 1_f64)]).unwrap();
    assert_eq!(problem, two_rows());

    let incremental = solve(&problem, &Settings::default()).unwrap();
    let at_once = solve(&two_rows(), &Settings::default()).unwrap();
    assert_eq!(incremental.status, Status::Optimal);
    assert_eq!(incremental.objective_value, at_once.objective_value);
    assert_eq!(incremental.statuses, at_once.statuses);
    assert_eq!(incremental.primal, at_once.primal);
}

/// x >= 5 and x <= 1
fn contradictory() -> Problem {
    Problem::new(
        vec![5_f64, f64::NEG_INFINITY],
        vec![f64::INFINITY, 1_f64],
        vec![0_f64],
        vec![f64::INFINITY],
        vec![1_f64],
        SparseMatrix::from_dense(&[vec![1_f64], vec![1_f64]]),
    ).unwrap()
}

#[test]
fn infeasible() {
    init();
    let problem = contradictory();
    let settings = Settings::default();
    let solution = solve(&problem, &settings).unwrap();

    assert_eq!(solution.status, Status::Infeasible);
    assert!(solution.infeasibility_cost > settings.initial_infeasibility_cost);
    assert!(solution.sum_infeasibilities > 0_f64);
    assert_close(solution.sum_infeasibilities, 4_f64);

    // The row multipliers prove that no x satisfies both rows
    let dual_ray = solution.dual_ray.unwrap();
    assert_close(dual_ray[0] + dual_ray[1], 0_f64);
    assert!(dual_ray[0] * 5_f64 + dual_ray[1] * 1_f64 > 0_f64);
}

#[test]
fn infeasible_without_initial_weight() {
    init();
    let mut settings = Settings::default().with_maximum_iterations(1_000);
    settings.initial_infeasibility_cost = 0_f64;
    let solution = solve(&contradictory(), &settings).unwrap();

    assert_eq!(solution.status, Status::Infeasible);
    assert_close(solution.sum_infeasibilities, 4_f64);
}

#[test]
fn infeasible_with_flat_multiplier() {
    init();
    let mut settings = Settings::default().with_maximum_iterations(1_000);
    settings.infeasibility_cost_multiplier = 1_f64;
    let solution = solve(&contradictory(), &settings).unwrap();

    assert_eq!(solution.status, Status::Infeasible);
    assert_eq!(solution.infeasibility_cost, settings.max_infeasibility_cost);
}

#[test]
fn unbounded() {
    init();
    // minimize -x with x >= 0 appearing in no row
    let problem = Problem::new(
        vec![f64::NEG_INFINITY],
        vec![5_f64],
        vec![0_f64, 0_f64],
        vec![f64::INFINITY, f64::INFINITY],
        vec![-1_f64, 0_f64],
        SparseMatrix::from_dense(&[vec![0_f64, 1_f64]]),
    ).unwrap();
    let solution = solve(&problem, &Settings::default()).unwrap();

    assert_eq!(solution.status, Status::Unbounded);
    let ray = solution.ray.unwrap();
    assert_eq!(ray.len(), 2);
    assert!(ray[0] > 0_f64);
    assert_eq!(ray[1], 0_f64);
}

#[test]
fn unbounded_through_a_row() {
    init();
    // minimize -x - y subject to x - y <= 1: moving along (1, 1) is always possible
    let problem = Problem::new(
        vec![f64::NEG_INFINITY],
        vec![1_f64],
        vec![0_f64, 0_f64],
        vec![f64::INFINITY, f64::INFINITY],
        vec![-1_f64, -1_f64],
        SparseMatrix::from_dense(&[vec![1_f64, -1_f64]]),
    ).unwrap();
    let solution = solve(&problem, &Settings::default()).unwrap();

    assert_eq!(solution.status, Status::Unbounded);
    let ray = solution.ray.unwrap();
    // The ray keeps the row activity unchanged or decreasing and improves the objective
    assert!(ray[0] - ray[1] <= 1e-9);
    assert!(-ray[0] - ray[1] < 0_f64);
    assert!(ray.iter().all(|&value| value >= -1e-9));
}

#[test]
fn iteration_limit() {
    init();
    let problem = two_rows();
    let settings = Settings::default().with_maximum_iterations(1);
    let solution = solve(&problem, &settings).unwrap();

    assert_eq!(solution.status, Status::IterationLimit);
    assert_eq!(solution.iterations, 1);
    assert_eq!(solution.statuses.iter().filter(|status| status.is_basic()).count(), problem.nr_rows());
    assert_consistent(&problem, &solution.row_activity, &solution.column_values);
}

#[test]
fn assignment_is_integral() {
    init();
    let problem = assignment();
    let solution = solve(&problem, &Settings::default()).unwrap();

    assert_eq!(solution.status, Status::Optimal);
    assert_close(solution.objective_value, cheapest_assignment());
    assert_within_bounds(&problem, &solution.row_activity, &solution.column_values);
    assert_consistent(&problem, &solution.row_activity, &solution.column_values);
}

#[test]
fn production_with_bounds() {
    init();
    let problem = production();
    let mut simplex = PrimalSimplex::new(&problem, Settings::default());
    let solution = simplex.solve().unwrap();

    assert_eq!(solution.status, Status::Optimal);
    assert_close(solution.objective_value, -95_f64);
    assert_within_bounds(&problem, &solution.row_activity, &solution.column_values);
    assert!(solution.statistics.count(IterationKind::Refactorization) >= 1);
    assert_eq!(solution.statistics.nr_moves(), solution.iterations);
}
