//! Preserved seat loading.
//!
//! The file has a header row and is read by column name. `Block` and
//! `Seat Number` are required; `Ticket Holder Name`, `Member Name`,
//! `Pickup Method` and `Allocation Time` are optional. The seating chart
//! export uses the same headers, so the chart of an earlier run can be fed
//! back in as the preserved seats of the next one.

use super::{parse_timestamp, read_text};
use crate::error::{Result, SeatingError};
use crate::types::{BlockName, PreservedBinding, SeatId};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PreservedRow {
    #[serde(rename = "Block")]
    block: String,
    #[serde(rename = "Seat Number")]
    seat: String,
    #[serde(rename = "Ticket Holder Name", default)]
    holder_name: String,
    #[serde(rename = "Member Name", default)]
    member_name: String,
    #[serde(rename = "Pickup Method", default)]
    pickup_method: String,
    #[serde(rename = "Allocation Time", default)]
    allocation_time: String,
}

impl PreservedRow {
    fn into_binding(self) -> std::result::Result<PreservedBinding, String> {
        let block = BlockName::parse(&self.block).map_err(|e| e.to_string())?;
        if self.seat.is_empty() {
            return Err("seat number is empty".to_string());
        }

        let holder_name = if self.holder_name.is_empty() {
            self.member_name.clone()
        } else {
            self.holder_name
        };
        let mut binding = PreservedBinding::new(block, SeatId::new(self.seat), holder_name)
            .with_member_name(self.member_name)
            .with_pickup_method(self.pickup_method);
        if !self.allocation_time.is_empty() {
            binding = binding.with_priority(parse_timestamp(&self.allocation_time));
        }
        Ok(binding)
    }
}

/// Reads preserved bindings from CSV text, in file order
///
/// # Errors
///
/// Returns [`SeatingError::Csv`] if the header row cannot be read or the
/// underlying reader fails. Rows without a usable block or seat are skipped.
pub fn preserved_from_reader<R: std::io::Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<PreservedBinding>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    reader
        .headers()
        .map_err(|e| SeatingError::csv(source, e))?;

    let mut bindings = Vec::new();
    for (index, row) in reader.deserialize::<PreservedRow>().enumerate() {
        let line = index + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(SeatingError::csv(source, e)),
            Err(e) => {
                tracing::warn!("Skipping preserved row {} of '{}': {}", line, source.display(), e);
                continue;
            }
        };

        match row.into_binding() {
            Ok(binding) => bindings.push(binding),
            Err(reason) => {
                tracing::warn!(
                    "Skipping preserved row {} of '{}': {}",
                    line,
                    source.display(),
                    reason
                );
            }
        }
    }

    Ok(bindings)
}

/// Loads preserved bindings, in file order
///
/// # Errors
///
/// Returns [`SeatingError::Io`] if the file cannot be read, or any error of
/// [`preserved_from_reader`].
pub fn load_preserved(path: &Path) -> Result<Vec<PreservedBinding>> {
    let text = read_text(path)?;
    let bindings = preserved_from_reader(text.as_bytes(), path)?;
    tracing::info!(
        "Loaded {} preserved seat(s) from '{}'",
        bindings.len(),
        path.display()
    );
    Ok(bindings)
}
