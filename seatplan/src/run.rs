//! Run orchestration: preserved seats, then the waiting list, then the report.

use crate::aggregates::seating::{SeatingAction, SeatingEnvironment, SeatingState};
use crate::allocation::{allocate, sort_queue};
use crate::error::{Result, SeatingError};
use crate::inventory::SeatInventory;
use crate::preservation::resolve;
use crate::report::SeatingResult;
use crate::types::{PreservedBinding, Request};

/// Options for one run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fail the run when a preserved seat is not found in the inventory
    pub strict_preservations: bool,
}

/// A finished run: the result and the events that produced it
#[derive(Clone, Debug)]
pub struct SeatingRun {
    /// Shaped outcome
    pub result: SeatingResult,
    /// Every event, in the order it was applied
    pub events: Vec<SeatingAction>,
}

/// Runs the whole allocation.
///
/// Requests are stable-sorted by priority key once, preserved bindings are
/// applied in input order, then the queue is served.
///
/// # Errors
///
/// - [`SeatingError::EmptyInventory`] if the inventory has no blocks
/// - [`SeatingError::EmptyDemand`] if there are no requests
/// - [`SeatingError::UnmatchedPreservations`] in strict mode, if any
///   preserved seat was not found in its block
pub fn plan_seating(
    inventory: SeatInventory,
    preserved: &[PreservedBinding],
    mut requests: Vec<Request>,
    env: &SeatingEnvironment,
    options: RunOptions,
) -> Result<SeatingRun> {
    if inventory.is_empty() {
        return Err(SeatingError::EmptyInventory);
    }
    if requests.is_empty() {
        return Err(SeatingError::EmptyDemand);
    }

    tracing::info!(
        "Planning {} request(s) over {} seat(s) in {} block(s), {} preserved",
        requests.len(),
        inventory.total_available(),
        inventory.count_blocks(),
        preserved.len()
    );

    sort_queue(&mut requests);

    let mut state = SeatingState::new(inventory);
    let mut events = resolve(&mut state, preserved, env);

    if !state.unmatched.is_empty() {
        tracing::warn!(
            "{} preserved seat(s) were not found in the inventory",
            state.unmatched.len()
        );
        if options.strict_preservations {
            return Err(SeatingError::UnmatchedPreservations {
                count: state.unmatched.len(),
            });
        }
    }

    events.extend(allocate(&mut state, &requests, env));

    let result = SeatingResult::from_state(state, env.clock.now());
    for violation in result.check_conservation() {
        tracing::error!(
            "Seat count mismatch in {}: {} loaded, {} consumed, {} remaining",
            violation.block.display_name(),
            violation.original,
            violation.consumed,
            violation.remaining
        );
    }
    tracing::info!("Seating complete: {}", result.summary());

    Ok(SeatingRun { result, events })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{BlockName, PriorityKey, SeatId};
    use std::num::NonZeroU32;

    fn inventory() -> SeatInventory {
        SeatInventory::from_blocks([(BlockName::new(1), vec![SeatId::new("S1")])]).unwrap()
    }

    fn one_request() -> Vec<Request> {
        vec![Request::new(PriorityKey::Invalid, "X", NonZeroU32::new(1).unwrap())]
    }

    #[test]
    fn test_empty_inventory_is_fatal() {
        let result = plan_seating(
            SeatInventory::new(),
            &[],
            one_request(),
            &SeatingEnvironment::default(),
            RunOptions::default(),
        );
        assert!(matches!(result, Err(SeatingError::EmptyInventory)));
    }

    #[test]
    fn test_empty_demand_is_fatal() {
        let result = plan_seating(
            inventory(),
            &[],
            Vec::new(),
            &SeatingEnvironment::default(),
            RunOptions::default(),
        );
        assert!(matches!(result, Err(SeatingError::EmptyDemand)));
    }

    #[test]
    fn test_strict_mode_rejects_unmatched_preservations() {
        let preserved = vec![PreservedBinding::new(BlockName::new(1), SeatId::new("S9"), "Y")];
        let options = RunOptions {
            strict_preservations: true,
        };
        let result = plan_seating(
            inventory(),
            &preserved,
            one_request(),
            &SeatingEnvironment::default(),
            options,
        );
        assert!(matches!(
            result,
            Err(SeatingError::UnmatchedPreservations { count: 1 })
        ));

        // Lenient mode reports the finding and carries on
        let run = plan_seating(
            inventory(),
            &preserved,
            one_request(),
            &SeatingEnvironment::default(),
            RunOptions::default(),
        )
        .unwrap();
        assert_eq!(run.result.unmatched.len(), 1);
        assert_eq!(run.result.summary().requests_seated, 1);
    }
}
