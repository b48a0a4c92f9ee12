//! Seat inventory: unassigned seats grouped into ordered blocks.
//!
//! Blocks are kept in a `BTreeMap` keyed by [`BlockName`], so iteration is
//! always in ascending block number. Within a block seats are consumed from
//! the front: the first registered seat is the first handed out.

use crate::error::{Result, SeatingError};
use crate::types::{BlockName, SeatId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// One block of seats
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    name: BlockName,
    seats: VecDeque<SeatId>,
    original_count: usize,
}

impl Block {
    /// Creates a block holding `seats` in registration order
    #[must_use]
    pub fn new(name: BlockName, seats: Vec<SeatId>) -> Self {
        let original_count = seats.len();
        Self {
            name,
            seats: seats.into(),
            original_count,
        }
    }

    /// Block name
    #[must_use]
    pub const fn name(&self) -> BlockName {
        self.name
    }

    /// Number of seats still available
    #[must_use]
    pub fn available(&self) -> usize {
        self.seats.len()
    }

    /// Number of seats the block was loaded with
    #[must_use]
    pub const fn original_count(&self) -> usize {
        self.original_count
    }

    /// Available seats, front first
    pub fn seats(&self) -> impl Iterator<Item = &SeatId> {
        self.seats.iter()
    }

    /// Checks if the seat is still available in this block
    #[must_use]
    pub fn contains(&self, seat: &SeatId) -> bool {
        self.seats.contains(seat)
    }

    /// Checks if the block can seat a party of `quantity`
    #[must_use]
    pub fn has_availability(&self, quantity: usize) -> bool {
        self.available() >= quantity
    }

    /// Removes one seat wherever it sits; the rest keep their order.
    ///
    /// Returns false if the seat was not available.
    pub fn remove_seat(&mut self, seat: &SeatId) -> bool {
        match self.seats.iter().position(|candidate| candidate == seat) {
            Some(position) => self.seats.remove(position).is_some(),
            None => false,
        }
    }
}

/// All unassigned seats of a run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInventory {
    blocks: BTreeMap<BlockName, Block>,
}

impl SeatInventory {
    /// Creates an empty inventory
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// Builds an inventory, rejecting repeated blocks and repeated seats.
    ///
    /// # Errors
    ///
    /// - [`SeatingError::DuplicateBlock`] if a block number occurs twice
    /// - [`SeatingError::DuplicateSeat`] if a seat occurs more than once,
    ///   within one block or across blocks
    pub fn from_blocks<I>(blocks: I) -> Result<Self>
    where
        I: IntoIterator<Item = (BlockName, Vec<SeatId>)>,
    {
        let mut inventory = Self::new();
        for (name, seats) in blocks {
            if inventory.blocks.contains_key(&name) {
                return Err(SeatingError::DuplicateBlock {
                    index: name.index(),
                    first: name.to_string(),
                    second: name.to_string(),
                });
            }
            inventory.blocks.insert(name, Block::new(name, seats));
        }

        let mut occurrences: BTreeMap<&SeatId, usize> = BTreeMap::new();
        for seat in inventory.blocks.values().flat_map(Block::seats) {
            *occurrences.entry(seat).or_default() += 1;
        }
        if let Some((seat, count)) = occurrences.into_iter().find(|(_, count)| *count > 1) {
            return Err(SeatingError::DuplicateSeat {
                seat: seat.to_string(),
                count,
            });
        }

        Ok(inventory)
    }

    /// Gets a block by name
    #[must_use]
    pub fn block(&self, name: &BlockName) -> Option<&Block> {
        self.blocks.get(name)
    }

    /// Blocks in ascending block order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Block names in ascending order
    pub fn block_names(&self) -> impl Iterator<Item = BlockName> + '_ {
        self.blocks.keys().copied()
    }

    /// Returns the number of blocks
    #[must_use]
    pub fn count_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// True when no block was loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Seats still available across all blocks
    #[must_use]
    pub fn total_available(&self) -> usize {
        self.blocks.values().map(Block::available).sum()
    }

    /// Seats the inventory was loaded with
    #[must_use]
    pub fn total_original(&self) -> usize {
        self.blocks.values().map(Block::original_count).sum()
    }

    /// Removes a specific seat from a specific block.
    ///
    /// Returns false if the block is unknown or the seat is not available in
    /// it; the inventory is unchanged in that case.
    pub fn remove_seat(&mut self, block: &BlockName, seat: &SeatId) -> bool {
        self.blocks
            .get_mut(block)
            .is_some_and(|b| b.remove_seat(seat))
    }

    /// First block, in ascending order, able to seat `quantity` together
    #[must_use]
    pub fn first_block_with_capacity(&self, quantity: usize) -> Option<BlockName> {
        self.blocks
            .values()
            .find(|block| block.has_availability(quantity))
            .map(Block::name)
    }

    /// The `quantity` seats at the front of a block, without removing them.
    ///
    /// Returns `None` unless the block holds at least `quantity` seats, so a
    /// party is never partially served.
    #[must_use]
    pub fn front_seats(&self, block: &BlockName, quantity: usize) -> Option<Vec<SeatId>> {
        let block = self.blocks.get(block)?;
        if !block.has_availability(quantity) {
            return None;
        }
        Some(block.seats().take(quantity).cloned().collect())
    }

    /// Seats left in each block, in block order
    #[must_use]
    pub fn residual(&self) -> BTreeMap<BlockName, Vec<SeatId>> {
        self.blocks
            .iter()
            .map(|(name, block)| (*name, block.seats().cloned().collect()))
            .collect()
    }

    /// Original seat count of each block
    #[must_use]
    pub fn original_counts(&self) -> BTreeMap<BlockName, usize> {
        self.blocks
            .iter()
            .map(|(name, block)| (*name, block.original_count()))
            .collect()
    }
}
