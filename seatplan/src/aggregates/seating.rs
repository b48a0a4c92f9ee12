//! Seating aggregate: the single state machine of a run.
//!
//! The Preservation Resolver and the Allocation Engine both drive this
//! reducer. Commands decide against the current state; the resulting events
//! are applied in place and returned, so the event list of a run is a
//! complete trail of what happened to every seat and every request.

use crate::inventory::SeatInventory;
use crate::preservation::{MatchIndex, MatchKey, MatchPolicy, HolderAndPriority};
use crate::types::{
    Assignment, BlockName, MissingReason, PreservedBinding, Request, UnmatchedPreservation,
};
use seatplan_core::environment::{Clock, SystemClock};
use seatplan_core::reducer::Reducer;
use seatplan_core::{SmallVec, smallvec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// Everything a seating run owns
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingState {
    /// Seats not yet assigned
    pub inventory: SeatInventory,
    /// Preserved seat counts still available to cover requests
    pub match_index: MatchIndex,
    /// Assignments per block, in the order they were made
    pub chart: BTreeMap<BlockName, Vec<Assignment>>,
    /// Requests no block could seat, in queue order
    pub unassigned: Vec<Request>,
    /// Requests already served by preserved seats
    pub covered: Vec<Request>,
    /// Preserved seats not found where they were claimed
    pub unmatched: Vec<UnmatchedPreservation>,
    /// Requests seated by the engine
    pub seated_requests: usize,
}

impl SeatingState {
    /// Creates the state of a fresh run over `inventory`.
    ///
    /// The chart starts with an empty entry for every inventory block.
    #[must_use]
    pub fn new(inventory: SeatInventory) -> Self {
        let chart = inventory
            .block_names()
            .map(|name| (name, Vec::new()))
            .collect();
        Self {
            inventory,
            match_index: MatchIndex::new(),
            chart,
            unassigned: Vec::new(),
            covered: Vec::new(),
            unmatched: Vec::new(),
            seated_requests: 0,
        }
    }

    /// Number of assignments recorded across all blocks
    #[must_use]
    pub fn count_assignments(&self) -> usize {
        self.chart.values().map(Vec::len).sum()
    }

    /// Assignments recorded for one block
    #[must_use]
    pub fn assignments(&self, block: &BlockName) -> &[Assignment] {
        self.chart.get(block).map_or(&[], Vec::as_slice)
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the seating aggregate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeatingAction {
    // Commands
    /// Take a preserved seat out of the inventory
    PreserveSeat {
        /// Binding as loaded
        binding: PreservedBinding,
    },

    /// Serve one request from the waiting list
    AllocateRequest {
        /// Request to serve
        request: Request,
    },

    // Events
    /// A preserved seat was recorded in the chart
    SeatPreserved {
        /// Binding as loaded
        binding: PreservedBinding,
        /// Key the seat is counted under, if the policy produced one
        match_key: Option<MatchKey>,
    },

    /// A preserved seat was not found where it was claimed
    PreservedSeatMissing {
        /// Binding as loaded
        binding: PreservedBinding,
        /// What was wrong
        reason: MissingReason,
    },

    /// A request was already served by preserved seats
    RequestCoveredByPreservation {
        /// Request served
        request: Request,
        /// Key whose count was consumed
        key: MatchKey,
    },

    /// A request was seated in one block
    SeatsAssigned {
        /// Block supplying every seat
        block: BlockName,
        /// One assignment per seat, front of the block first
        assignments: Vec<Assignment>,
    },

    /// No block could seat a request
    RequestUnassigned {
        /// Request as queued
        request: Request,
    },
}

impl SeatingAction {
    /// Returns true if this action is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::PreserveSeat { .. } | Self::AllocateRequest { .. }
        )
    }

    /// Returns true if this action is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !self.is_command()
    }

    /// Returns the event type name for serialization
    ///
    /// Only events have type names. Commands return "unknown".
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::SeatPreserved { .. } => "SeatPreserved.v1",
            Self::PreservedSeatMissing { .. } => "PreservedSeatMissing.v1",
            Self::RequestCoveredByPreservation { .. } => "RequestCoveredByPreservation.v1",
            Self::SeatsAssigned { .. } => "SeatsAssigned.v1",
            Self::RequestUnassigned { .. } => "RequestUnassigned.v1",
            Self::PreserveSeat { .. } | Self::AllocateRequest { .. } => "unknown",
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the seating aggregate
#[derive(Clone)]
pub struct SeatingEnvironment {
    /// Pairs requests with preserved seats
    pub match_policy: Arc<dyn MatchPolicy>,
    /// Clock for report timestamps
    pub clock: Arc<dyn Clock>,
}

impl SeatingEnvironment {
    /// Creates a new `SeatingEnvironment`
    #[must_use]
    pub fn new(match_policy: Arc<dyn MatchPolicy>, clock: Arc<dyn Clock>) -> Self {
        Self {
            match_policy,
            clock,
        }
    }
}

impl Default for SeatingEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(HolderAndPriority), Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for SeatingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatingEnvironment").finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the seating aggregate
///
/// A request is never split: either one block supplies every seat, or the
/// request is recorded as unassigned and the inventory is left untouched.
#[derive(Clone, Debug)]
pub struct SeatingReducer;

impl SeatingReducer {
    /// Creates a new `SeatingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decides the events for one preserved binding
    fn decide_preservation(
        state: &SeatingState,
        binding: PreservedBinding,
        env: &SeatingEnvironment,
    ) -> SmallVec<[SeatingAction; 4]> {
        let missing = match state.inventory.block(&binding.block) {
            None => Some(MissingReason::UnknownBlock),
            Some(block) if !block.contains(&binding.seat) => Some(MissingReason::SeatNotAvailable),
            Some(_) => None,
        };
        let match_key = env.match_policy.binding_key(&binding);

        match missing {
            Some(reason) => {
                tracing::warn!(
                    "Preserved seat {} in {} for '{}' not found: {}",
                    binding.seat,
                    binding.block.display_name(),
                    binding.holder_name,
                    reason
                );
                smallvec![
                    SeatingAction::PreservedSeatMissing {
                        binding: binding.clone(),
                        reason,
                    },
                    SeatingAction::SeatPreserved { binding, match_key },
                ]
            }
            None => {
                tracing::debug!(
                    "Preserved seat {} in {} for '{}'",
                    binding.seat,
                    binding.block.display_name(),
                    binding.holder_name
                );
                smallvec![SeatingAction::SeatPreserved { binding, match_key }]
            }
        }
    }

    /// Decides the event for one request
    fn decide_allocation(
        state: &SeatingState,
        request: Request,
        env: &SeatingEnvironment,
    ) -> SeatingAction {
        if let Some(key) = env.match_policy.request_key(&request) {
            if state.match_index.remaining(&key) >= request.party_size.get() {
                tracing::debug!(
                    "Request of '{}' for {} seat(s) already covered by preserved seats",
                    request.holder_name,
                    request.party_size
                );
                return SeatingAction::RequestCoveredByPreservation { request, key };
            }
        }

        let quantity = request.seats();
        let placement = state
            .inventory
            .first_block_with_capacity(quantity)
            .and_then(|block| {
                state
                    .inventory
                    .front_seats(&block, quantity)
                    .map(|seats| (block, seats))
            });

        match placement {
            Some((block, seats)) => {
                tracing::debug!(
                    "Seating '{}' ({} seat(s)) in {}",
                    request.holder_name,
                    quantity,
                    block.display_name()
                );
                let assignments = seats
                    .into_iter()
                    .map(|seat| Assignment::for_request(&request, block, seat))
                    .collect();
                SeatingAction::SeatsAssigned { block, assignments }
            }
            None => {
                tracing::debug!(
                    "No block can seat '{}' ({} seat(s))",
                    request.holder_name,
                    quantity
                );
                SeatingAction::RequestUnassigned { request }
            }
        }
    }

    /// Applies an event to state
    fn apply_event(state: &mut SeatingState, action: &SeatingAction) {
        match action {
            SeatingAction::SeatPreserved { binding, match_key } => {
                // No-op for a seat that is not in the inventory
                state.inventory.remove_seat(&binding.block, &binding.seat);
                state
                    .chart
                    .entry(binding.block)
                    .or_default()
                    .push(Assignment::preserved(binding));
                if let Some(key) = match_key {
                    state.match_index.reserve(key.clone());
                }
            }

            SeatingAction::PreservedSeatMissing { binding, reason } => {
                state.unmatched.push(UnmatchedPreservation {
                    binding: binding.clone(),
                    reason: *reason,
                });
            }

            SeatingAction::RequestCoveredByPreservation { request, key } => {
                state.match_index.try_consume(key, request.party_size.get());
                state.covered.push(request.clone());
            }

            SeatingAction::SeatsAssigned { block, assignments } => {
                for assignment in assignments {
                    state.inventory.remove_seat(block, &assignment.seat);
                }
                state
                    .chart
                    .entry(*block)
                    .or_default()
                    .extend(assignments.iter().cloned());
                state.seated_requests += 1;
            }

            SeatingAction::RequestUnassigned { request } => {
                state.unassigned.push(request.clone());
            }

            // Commands are not applied to state
            SeatingAction::PreserveSeat { .. } | SeatingAction::AllocateRequest { .. } => {}
        }
    }
}

impl Default for SeatingReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for SeatingReducer {
    type State = SeatingState;
    type Action = SeatingAction;
    type Environment = SeatingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Self::Action; 4]> {
        let events = match action {
            // ========== Commands ==========
            SeatingAction::PreserveSeat { binding } => {
                Self::decide_preservation(state, binding, env)
            }

            SeatingAction::AllocateRequest { request } => {
                smallvec![Self::decide_allocation(state, request, env)]
            }

            // ========== Events ==========
            // Events are applied by the command that produced them
            _ => return SmallVec::new(),
        };

        for event in &events {
            Self::apply_event(state, event);
        }
        events
    }
}
