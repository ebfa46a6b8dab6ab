//! # Event hooks
//!
//! A caller can observe a solve and steer it at a few points of the control loop. The handler is
//! only called between complete updates, so the state it observes is consistent and a stop leaves
//! a reportable solution.
use crate::data::linear_program::solution::Status;

/// Point in the control loop at which the handler is called.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// An iteration was completed.
    EndOfIteration,
    /// The basis was factorized and the values were recomputed.
    EndOfFactorization,
    /// The ratio test chose a step.
    PivotRow {
        /// Entering sequence.
        entering: usize,
        /// Leaving sequence, if the basis changes.
        leaving: Option<usize>,
    },
    /// Pricing found no sequence to enter the basis.
    NoCandidateInPrimal,
}

/// What the handler wants the control loop to do.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum EventResponse {
    /// Proceed as usual.
    #[default]
    Continue,
    /// Factorize the basis before the next iteration.
    Refactorize,
    /// End the solve with the given status.
    Terminate(Status),
}

impl EventResponse {
    /// Interpret an integer response code.
    ///
    /// Negative codes continue, codes `0` through `9` ask for a refactorization and codes of at
    /// least `10` terminate with status `code - 10`. Unknown statuses stop the solve.
    pub fn from_code(code: i32) -> Self {
        match code {
            ..0 => EventResponse::Continue,
            0..=9 => EventResponse::Refactorize,
            _ => EventResponse::Terminate(Status::from_code(code - 10).unwrap_or(Status::Stopped)),
        }
    }
}

/// Summary of the state of the solve, passed along with each event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Iterations done so far.
    pub iterations: u64,
    /// Objective with the true costs.
    pub objective: f64,
    /// Number of sequences outside their true bounds.
    pub number_infeasibilities: usize,
    /// Sum of the bound violations, as of the last factorization.
    pub sum_infeasibilities: f64,
    /// Current penalty per unit of bound violation.
    pub infeasibility_cost: f64,
}

/// Observes a solve.
pub trait EventHandler {
    /// Called at each event.
    fn event(&mut self, event: Event, snapshot: &Snapshot) -> EventResponse;
}

impl<F> EventHandler for F
where
    F: FnMut(Event, &Snapshot) -> EventResponse,
{
    fn event(&mut self, event: Event, snapshot: &Snapshot) -> EventResponse {
        self(event, snapshot)
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::primal::event::{Event, EventHandler, EventResponse, Snapshot};
    use crate::data::linear_program::solution::Status;

    #[test]
    fn codes() {
        assert_eq!(EventResponse::from_code(-1), EventResponse::Continue);
        assert_eq!(EventResponse::from_code(0), EventResponse::Refactorize);
        assert_eq!(EventResponse::from_code(9), EventResponse::Refactorize);
        assert_eq!(EventResponse::from_code(15), EventResponse::Terminate(Status::Stopped));
        assert_eq!(EventResponse::from_code(13), EventResponse::Terminate(Status::IterationLimit));
        assert_eq!(EventResponse::from_code(14), EventResponse::Terminate(Status::Stopped));
    }

    #[test]
    fn closure() {
        let mut count = 0;
        let mut handler = |event: Event, _: &Snapshot| {
            if event == Event::EndOfIteration {
                count += 1;
            }
            if count == 2 { EventResponse::Terminate(Status::Stopped) } else { EventResponse::Continue }
        };
        let snapshot = Snapshot {
            iterations: 0,
            objective: 0_f64,
            number_infeasibilities: 0,
            sum_infeasibilities: 0_f64,
            infeasibility_cost: 1e6,
        };
        assert_eq!(handler.event(Event::EndOfFactorization, &snapshot), EventResponse::Continue);
        assert_eq!(handler.event(Event::EndOfIteration, &snapshot), EventResponse::Continue);
        assert_eq!(handler.event(Event::EndOfIteration, &snapshot), EventResponse::Terminate(Status::Stopped));
    }
}
