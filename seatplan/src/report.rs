//! Result shaping: the seating chart, what is left, and what went wrong.

use crate::aggregates::seating::SeatingState;
use crate::types::{Assignment, AssignmentOrigin, BlockName, Request, SeatId, UnmatchedPreservation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Seating Result
// ============================================================================

/// Outcome of one seating run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingResult {
    /// Assignments per block: preserved seats first, then new ones in queue order
    pub chart: BTreeMap<BlockName, Vec<Assignment>>,
    /// Requests no block could seat, in queue order
    pub unassigned: Vec<Request>,
    /// Requests served by preserved seats
    pub covered: Vec<Request>,
    /// Seats left per block
    pub residual: BTreeMap<BlockName, Vec<SeatId>>,
    /// Preserved seats not found where they were claimed
    pub unmatched: Vec<UnmatchedPreservation>,
    /// Seats each inventory block was loaded with
    pub original_counts: BTreeMap<BlockName, usize>,
    /// Requests seated by the engine
    pub seated_requests: usize,
    /// When the result was assembled
    pub generated_at: DateTime<Utc>,
}

/// Totals of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Blocks in the inventory
    pub blocks: usize,
    /// Seats the inventory was loaded with
    pub seats_total: usize,
    /// Preserved seats recorded in the chart
    pub seats_preserved: usize,
    /// Seats assigned by the engine
    pub seats_assigned: usize,
    /// Seats left unassigned
    pub seats_remaining: usize,
    /// Requests seated by the engine
    pub requests_seated: usize,
    /// Requests served by preserved seats
    pub requests_covered: usize,
    /// Requests no block could seat
    pub requests_unassigned: usize,
    /// Preserved seats not found in the inventory
    pub unmatched_preservations: usize,
}

/// A block whose seat count does not add up
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConservationViolation {
    /// Offending block
    pub block: BlockName,
    /// Seats the block was loaded with
    pub original: usize,
    /// Seats taken out of the block
    pub consumed: usize,
    /// Seats left in the block
    pub remaining: usize,
}

impl SeatingResult {
    /// Assembles the result from the final state of a run
    #[must_use]
    pub fn from_state(state: SeatingState, generated_at: DateTime<Utc>) -> Self {
        Self {
            residual: state.inventory.residual(),
            original_counts: state.inventory.original_counts(),
            chart: state.chart,
            unassigned: state.unassigned,
            covered: state.covered,
            unmatched: state.unmatched,
            seated_requests: state.seated_requests,
            generated_at,
        }
    }

    /// Assignments in block order
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.chart.values().flatten()
    }

    /// True when at least one seat appears in the chart
    #[must_use]
    pub fn has_assignments(&self) -> bool {
        self.chart.values().any(|assignments| !assignments.is_empty())
    }

    /// Totals of the run
    #[must_use]
    pub fn summary(&self) -> Summary {
        let (preserved, assigned) =
            self.assignments()
                .fold((0, 0), |(preserved, assigned), a| match a.origin {
                    AssignmentOrigin::Preserved => (preserved + 1, assigned),
                    AssignmentOrigin::New => (preserved, assigned + 1),
                });

        Summary {
            blocks: self.original_counts.len(),
            seats_total: self.original_counts.values().sum(),
            seats_preserved: preserved,
            seats_assigned: assigned,
            seats_remaining: self.residual.values().map(Vec::len).sum(),
            requests_seated: self.seated_requests,
            requests_covered: self.covered.len(),
            requests_unassigned: self.unassigned.len(),
            unmatched_preservations: self.unmatched.len(),
        }
    }

    /// Checks, per inventory block, that original == consumed + remaining.
    ///
    /// Unmatched preservations are recorded in the chart but never left the
    /// inventory, so they do not count as consumed. Returns every block that
    /// fails the check; an empty list means the run is consistent.
    #[must_use]
    pub fn check_conservation(&self) -> Vec<ConservationViolation> {
        self.original_counts
            .iter()
            .filter_map(|(block, &original)| {
                let recorded = self.chart.get(block).map_or(0, Vec::len);
                let unmatched = self
                    .unmatched
                    .iter()
                    .filter(|u| u.binding.block == *block)
                    .count();
                let consumed = recorded.saturating_sub(unmatched);
                let remaining = self.residual.get(block).map_or(0, Vec::len);

                (original != consumed + remaining).then_some(ConservationViolation {
                    block: *block,
                    original,
                    consumed,
                    remaining,
                })
            })
            .collect()
    }
}

// ============================================================================
// Console Rendering
// ============================================================================

fn write_assignment(f: &mut fmt::Formatter<'_>, assignment: &Assignment) -> fmt::Result {
    write!(f, "{}: ", assignment.seat)?;
    if !assignment.member_name.is_empty() {
        write!(f, "Member: {} ", assignment.member_name)?;
    }
    write!(f, "Ticket Holder: {}", assignment.holder_name)?;
    if !assignment.pickup_method.is_empty() {
        write!(f, " Pickup Method: {}", assignment.pickup_method)?;
    }
    if let Some(priority) = assignment.priority.filter(|p| p.is_valid()) {
        write!(f, " Allocation Time: {priority}")?;
    }
    writeln!(f)
}

fn write_request(f: &mut fmt::Formatter<'_>, request: &Request) -> fmt::Result {
    write!(
        f,
        "- Ticket Holder: {}, Tickets: {}, Time: {}",
        request.holder_name, request.party_size, request.priority
    )?;
    match request.source_row {
        Some(row) => writeln!(f, " (Original CSV Row: {row})"),
        None => writeln!(f, " (Original CSV Row: N/A)"),
    }
}

impl fmt::Display for SeatingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Seating Assignment Results ---")?;
        for (block, assignments) in &self.chart {
            if assignments.is_empty() {
                continue;
            }
            writeln!(f, "\n{} ======", block.display_name())?;
            for assignment in assignments {
                write_assignment(f, assignment)?;
            }
        }

        if !self.has_assignments() {
            if self.unassigned.is_empty() {
                writeln!(
                    f,
                    "No seats were assigned, and no unassigned requests (possibly all requests were for 0 tickets or no valid requests/seats)."
                )?;
            } else {
                writeln!(f, "No seats were successfully assigned.")?;
            }
        }

        if !self.unassigned.is_empty() {
            writeln!(f, "\n--- Requests That Could Not Be Seated ---")?;
            for request in &self.unassigned {
                write_request(f, request)?;
            }
        }

        if !self.covered.is_empty() {
            writeln!(f, "\n--- Requests Already Covered by Preserved Seats ---")?;
            for request in &self.covered {
                write_request(f, request)?;
            }
        }

        if !self.unmatched.is_empty() {
            writeln!(f, "\n--- Preserved Seats Not Found in Inventory ---")?;
            for finding in &self.unmatched {
                writeln!(
                    f,
                    "- {} {}: Ticket Holder: {} ({})",
                    finding.binding.block.display_name(),
                    finding.binding.seat,
                    finding.binding.holder_name,
                    finding.reason
                )?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} seat(s) in {} block(s): {} preserved, {} assigned, {} remaining; \
             {} request(s) seated, {} covered, {} unassigned",
            self.seats_total,
            self.blocks,
            self.seats_preserved,
            self.seats_assigned,
            self.seats_remaining,
            self.requests_seated,
            self.requests_covered,
            self.requests_unassigned
        )
    }
}
