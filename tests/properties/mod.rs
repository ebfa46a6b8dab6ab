//! # Properties that hold for any solve
use std::cell::RefCell;
use std::rc::Rc;

use primal_simplex::{Perturbation, PivotRuleKind, PrimalSimplex, Problem, Settings, solve, Status};
use primal_simplex::algorithm::factorization::BasisFactorization;
use primal_simplex::algorithm::factorization::lower_upper::LUDecomposition;
use primal_simplex::algorithm::primal::event::{Event, EventResponse, Snapshot};
use primal_simplex::algorithm::primal::nonlinear_cost::NonLinearCost;
use primal_simplex::algorithm::primal::workspace::Workspace;
use primal_simplex::data::linear_program::solution::VariableStatus;

use crate::problems::{
    assert_close, assert_consistent, assert_within_bounds, assignment, init, production, shifted_production,
    two_rows,
};

fn all_problems() -> Vec<Problem> {
    vec![two_rows(), assignment(), production()]
}

#[test]
fn bounds_respected_at_optimum() {
    init();
    for problem in all_problems() {
        let solution = solve(&problem, &Settings::default()).unwrap();
        assert_eq!(solution.status, Status::Optimal);
        assert_within_bounds(&problem, &solution.row_activity, &solution.column_values);
    }
}

#[test]
fn basis_is_a_bijection() {
    init();
    let mut settings = Settings::default();
    settings.check_invariants = true;
    for problem in all_problems() {
        let solution = solve(&problem, &settings).unwrap();
        let nr_basic = solution.statuses.iter().filter(|status| status.is_basic()).count();
        assert_eq!(nr_basic, problem.nr_rows());
    }
}

#[test]
fn infeasibility_tracked_between_factorizations() {
    init();
    let mut settings = Settings::default();
    settings.check_invariants = true;
    settings.refactor_frequency = 1_000;
    let mut problems = all_problems();
    problems.push(shifted_production());
    for problem in problems {
        let solution = solve(&problem, &settings).unwrap();
        assert!(solution.is_optimal());
    }
}

#[test]
fn optimality_conditions() {
    init();
    for problem in all_problems() {
        let solution = solve(&problem, &Settings::default()).unwrap();
        for (status, &dj) in solution.statuses.iter().zip(&solution.reduced_costs) {
            match status {
                VariableStatus::Basic => assert!(dj.abs() < 1e-7),
                VariableStatus::AtLowerBound => assert!(dj > -1e-7),
                VariableStatus::AtUpperBound => assert!(dj < 1e-7),
                VariableStatus::IsFree | VariableStatus::SuperBasic => assert!(dj.abs() < 1e-7),
                VariableStatus::IsFixed => {},
            }
        }
    }
}

#[test]
fn pivot_rules_agree() {
    init();
    for problem in all_problems() {
        let reference = solve(&problem, &Settings::default()).unwrap();
        for pivot_rule in [PivotRuleKind::Dantzig, PivotRuleKind::Partial { chunk: 3 }] {
            let solution = solve(&problem, &Settings::default().with_pivot_rule(pivot_rule)).unwrap();
            assert_eq!(solution.status, Status::Optimal);
            assert_close(solution.objective_value, reference.objective_value);
        }

        let mut settings = Settings::default();
        settings.parallel_candidates = 3;
        let solution = solve(&problem, &settings).unwrap();
        assert_eq!(solution.status, Status::Optimal);
        assert_close(solution.objective_value, reference.objective_value);
    }
}

#[test]
fn objective_monotone_once_feasible() {
    init();
    for problem in [production(), two_rows()] {
        let history = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&history);

        let settings = Settings::default()
            .with_perturbation(Perturbation::Off)
            .with_pivot_rule(PivotRuleKind::Dantzig);
        let mut simplex = PrimalSimplex::new(&problem, settings);
        simplex.set_event_handler(Box::new(move |event: Event, snapshot: &Snapshot| {
            if event == Event::EndOfIteration && snapshot.number_infeasibilities == 0 {
                recorder.borrow_mut().push(snapshot.objective);
            }
            EventResponse::Continue
        }));
        let solution = simplex.solve().unwrap();
        assert_eq!(solution.status, Status::Optimal);

        let history = history.borrow();
        for pair in history.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9, "objective increased: {:?}", history);
        }
    }
}

#[test]
fn deterministic_given_seed() {
    init();
    fn pivots(seed: u64) -> Vec<(usize, Option<usize>)> {
        let pivots = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&pivots);

        let settings = Settings::default()
            .with_perturbation(Perturbation::On { magnitude: 1e-4 })
            .with_seed(seed);
        let mut simplex = PrimalSimplex::new(&shifted_production(), settings);
        simplex.set_event_handler(Box::new(move |event: Event, _: &Snapshot| {
            if let Event::PivotRow { entering, leaving } = event {
                recorder.borrow_mut().push((entering, leaving));
            }
            EventResponse::Continue
        }));
        assert_eq!(simplex.solve().unwrap().status, Status::Optimal);

        pivots.take()
    }

    let first = pivots(7);
    assert!(!first.is_empty());
    assert_eq!(first, pivots(7));
}

#[test]
fn refresh_is_idempotent() {
    init();
    let problem = assignment();
    let mut workspace = Workspace::new(&problem);
    let mut factorization = LUDecomposition::new(workspace.nr_rows());
    factorization.factorize(&workspace.basis_columns()).unwrap();
    workspace.compute_primal(&factorization);

    let mut cost = NonLinearCost::new(&workspace, 1e6);
    cost.check_infeasibilities(&mut workspace, 0_f64, 1e-7);
    let statuses = (0..workspace.nr_sequences()).map(|s| workspace.status(s)).collect::<Vec<_>>();
    let values = (0..workspace.nr_sequences()).map(|s| workspace.value(s)).collect::<Vec<_>>();
    let sum = cost.sum_infeasibilities();

    cost.check_infeasibilities(&mut workspace, 1e-7, 1e-7);
    assert_eq!(statuses, (0..workspace.nr_sequences()).map(|s| workspace.status(s)).collect::<Vec<_>>());
    assert_eq!(values, (0..workspace.nr_sequences()).map(|s| workspace.value(s)).collect::<Vec<_>>());
    assert_eq!(sum, cost.sum_infeasibilities());

    // Every equality row starts one unit below its bound
    assert_eq!(cost.number_infeasibilities(), 8);
    assert_close(sum, 8_f64);
    let (count, recomputed) = cost.recomputed_infeasibilities(&workspace);
    assert_eq!(count, cost.number_infeasibilities());
    assert_close(recomputed, sum);
    assert!(cost.validate(&workspace).is_ok());
}

#[test]
fn stop_leaves_a_consistent_point() {
    init();
    let problem = assignment();
    let mut simplex = PrimalSimplex::new(&problem, Settings::default());
    simplex.set_event_handler(Box::new(|event: Event, snapshot: &Snapshot| {
        if event == Event::EndOfIteration && snapshot.iterations == 3 {
            EventResponse::from_code(15)
        } else {
            EventResponse::Continue
        }
    }));
    let solution = simplex.solve().unwrap();

    assert_eq!(solution.status, Status::Stopped);
    assert_eq!(solution.status.code(), 5);
    assert_eq!(solution.iterations, 3);
    assert_consistent(&problem, &solution.row_activity, &solution.column_values);
}
