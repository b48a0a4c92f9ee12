//! Seat inventory loading.
//!
//! The file is a JSON object mapping block labels to seat arrays:
//!
//! ```json
//! { "block-1": ["A-01", "A-02"], "block-2": ["B-01"] }
//! ```

use super::read_text;
use crate::error::{Result, SeatingError};
use crate::inventory::SeatInventory;
use crate::types::{BlockName, SeatId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Inventory file contents as written, before validation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInventory(pub BTreeMap<String, Vec<String>>);

impl RawInventory {
    /// Block labels with their seats
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(label, seats)| (label.as_str(), seats.as_slice()))
    }

    /// Validates the raw contents into a [`SeatInventory`].
    ///
    /// # Errors
    ///
    /// - [`SeatingError::InvalidBlockName`] for a label without a block number
    /// - [`SeatingError::DuplicateBlock`] when two labels name the same block
    /// - [`SeatingError::DuplicateSeat`] when a seat occurs more than once
    pub fn into_inventory(self) -> Result<SeatInventory> {
        let mut labels: BTreeMap<BlockName, String> = BTreeMap::new();
        let mut blocks = Vec::with_capacity(self.0.len());

        for (label, seats) in self.0 {
            let name = BlockName::parse(&label)?;
            if let Some(first) = labels.get(&name) {
                return Err(SeatingError::DuplicateBlock {
                    index: name.index(),
                    first: first.clone(),
                    second: label,
                });
            }
            labels.insert(name, label);
            blocks.push((name, seats.into_iter().map(SeatId::new).collect()));
        }

        SeatInventory::from_blocks(blocks)
    }
}

/// Reads an inventory file without validating it
///
/// # Errors
///
/// Returns [`SeatingError::Io`] if the file cannot be read and
/// [`SeatingError::Json`] if it is not an object of string arrays.
pub fn read_raw_inventory(path: &Path) -> Result<RawInventory> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| SeatingError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates an inventory file
///
/// # Errors
///
/// Any error of [`read_raw_inventory`] or [`RawInventory::into_inventory`].
pub fn load_inventory(path: &Path) -> Result<SeatInventory> {
    let inventory = read_raw_inventory(path)?.into_inventory()?;
    tracing::info!(
        "Loaded {} seat(s) in {} block(s) from '{}'",
        inventory.total_available(),
        inventory.count_blocks(),
        path.display()
    );
    Ok(inventory)
}
