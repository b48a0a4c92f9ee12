//! Input loaders: seat inventory (JSON), waiting list and preserved seats (CSV).
//!
//! Files are read whole and a leading UTF-8 byte order mark is dropped, since
//! spreadsheet exports commonly carry one. Malformed records are skipped
//! with a warning; only I/O and structural errors abort a load.

mod inventory;
mod preserved;
mod requests;
mod timestamp;

pub use inventory::{RawInventory, load_inventory, read_raw_inventory};
pub use preserved::{load_preserved, preserved_from_reader};
pub use requests::{load_requests, requests_from_reader};
pub use timestamp::parse_timestamp;

use crate::error::{Result, SeatingError};
use std::path::Path;

/// UTF-8 byte order mark
const BOM: char = '\u{feff}';

/// Reads a text file, dropping a leading byte order mark
fn read_text(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|e| SeatingError::io(path, e))?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    })
}
