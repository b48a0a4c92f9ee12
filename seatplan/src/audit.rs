//! Inventory audits: seat counts, duplicate seats, seats left unpreserved.
//!
//! These work on the raw inventory file so that a broken file (duplicate
//! seats, odd labels) can still be inspected.

use crate::error::{Result, SeatingError};
use crate::loading::RawInventory;
use crate::types::{BlockName, PreservedBinding, SeatId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Seat count of one block
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockCount {
    /// Label as written in the file
    pub label: String,
    /// Number of seats listed
    pub seats: usize,
}

/// Seat counts of every block
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeatCounts {
    /// Per block, by block number; labels without a number go last
    pub blocks: Vec<BlockCount>,
    /// Seats across all blocks
    pub total: usize,
}

impl fmt::Display for SeatCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "Block: {}", block.label)?;
            writeln!(f, "Number of seats: {}", block.seats)?;
            writeln!(f, "========")?;
        }
        writeln!(f, "Total number of seats: {}", self.total)
    }
}

/// A seat listed more than once
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateSeat {
    /// Seat identifier
    pub seat: SeatId,
    /// Number of occurrences
    pub count: usize,
}

/// Counts seats per block
#[must_use]
pub fn count_seats(raw: &RawInventory) -> SeatCounts {
    let mut blocks: Vec<BlockCount> = raw
        .blocks()
        .map(|(label, seats)| BlockCount {
            label: label.to_string(),
            seats: seats.len(),
        })
        .collect();
    blocks.sort_by_key(|block| {
        let index = BlockName::parse(&block.label).ok();
        (index.is_none(), index, block.label.clone())
    });

    let total = blocks.iter().map(|block| block.seats).sum();
    SeatCounts { blocks, total }
}

/// Seats listed more than once, within or across blocks, by seat
#[must_use]
pub fn find_duplicates(raw: &RawInventory) -> Vec<DuplicateSeat> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, seats) in raw.blocks() {
        for seat in seats {
            *counts.entry(seat.as_str()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(seat, count)| DuplicateSeat {
            seat: SeatId::new(seat),
            count,
        })
        .collect()
}

/// Available seats not claimed by any preserved binding, sorted
///
/// # Errors
///
/// Returns [`SeatingError::DuplicateSeat`] for the first duplicate seat in
/// the inventory; the listing is meaningless until that is fixed.
pub fn unpreserved_seats(raw: &RawInventory, preserved: &[PreservedBinding]) -> Result<Vec<SeatId>> {
    if let Some(duplicate) = find_duplicates(raw).into_iter().next() {
        return Err(SeatingError::DuplicateSeat {
            seat: duplicate.seat.to_string(),
            count: duplicate.count,
        });
    }

    let preserved: BTreeSet<&SeatId> = preserved.iter().map(|binding| &binding.seat).collect();
    let available: BTreeSet<SeatId> = raw
        .blocks()
        .flat_map(|(_, seats)| seats.iter().map(|seat| SeatId::new(seat.as_str())))
        .collect();

    Ok(available
        .into_iter()
        .filter(|seat| !preserved.contains(seat))
        .collect())
}
