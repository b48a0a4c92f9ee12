//! Allocation Engine: serves the waiting list against the reduced inventory.
//!
//! Requests are handled strictly in queue order. For each request:
//!
//! 1. a request already covered by preserved seats consumes its count from
//!    the match index and nothing else;
//! 2. otherwise the first block (ascending) with enough seats supplies all
//!    of them from its front;
//! 3. otherwise the request is recorded as unassigned.
//!
//! A large party that cannot be placed does not block smaller parties behind
//! it. The engine never fails; every request ends up in exactly one of the
//! three outcomes.

use crate::aggregates::seating::{SeatingAction, SeatingEnvironment, SeatingReducer, SeatingState};
use crate::types::Request;
use seatplan_core::reducer::Reducer;

/// Sorts the waiting list by priority key.
///
/// Stable: requests with equal keys keep their input order, and requests
/// with an invalid time go last.
pub fn sort_queue(requests: &mut [Request]) {
    requests.sort_by_key(|request| request.priority);
}

/// Serves `requests` in the given order. Returns the emitted events.
///
/// The queue is not re-sorted here; see [`sort_queue`].
pub fn allocate(
    state: &mut SeatingState,
    requests: &[Request],
    env: &SeatingEnvironment,
) -> Vec<SeatingAction> {
    let reducer = SeatingReducer::new();
    let mut events = Vec::with_capacity(requests.len());
    for request in requests {
        events.extend(reducer.reduce(
            state,
            SeatingAction::AllocateRequest {
                request: request.clone(),
            },
            env,
        ));
    }

    tracing::debug!(
        "Allocated {} request(s): {} covered, {} unassigned, {} seat(s) left",
        requests.len(),
        state.covered.len(),
        state.unassigned.len(),
        state.inventory.total_available()
    );

    events
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inventory::SeatInventory;
    use crate::types::{BlockName, PriorityKey, SeatId};
    use chrono::NaiveDate;
    use std::num::NonZeroU32;

    fn at(minute: u32) -> PriorityKey {
        PriorityKey::Valid(
            NaiveDate::from_ymd_opt(2025, 5, 14)
                .unwrap()
                .and_hms_opt(9, minute, 0)
                .unwrap(),
        )
    }

    fn request(holder: &str, size: u32, priority: PriorityKey) -> Request {
        Request::new(priority, holder, NonZeroU32::new(size).unwrap())
    }

    #[test]
    fn test_sort_queue_is_stable_and_puts_invalid_last() {
        let mut queue = vec![
            request("late", 1, PriorityKey::Invalid),
            request("b", 1, at(2)),
            request("a", 1, at(1)),
            request("b2", 1, at(2)),
        ];
        sort_queue(&mut queue);
        let order: Vec<_> = queue.iter().map(|r| r.holder_name.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "b2", "late"]);
    }

    #[test]
    fn test_large_party_does_not_block_smaller_ones() {
        let inventory =
            SeatInventory::from_blocks([(BlockName::new(1), vec![SeatId::new("S1"), SeatId::new("S2")])])
                .unwrap();
        let mut state = SeatingState::new(inventory);

        let queue = vec![request("big", 3, at(1)), request("small", 2, at(2))];
        let events = allocate(&mut state, &queue, &SeatingEnvironment::default());

        assert_eq!(events.len(), 2);
        assert_eq!(state.unassigned.len(), 1);
        assert_eq!(state.unassigned[0].holder_name, "big");
        assert_eq!(state.assignments(&BlockName::new(1)).len(), 2);
        assert_eq!(state.inventory.total_available(), 0);
    }
}
