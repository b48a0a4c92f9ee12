//! Waiting list loading.
//!
//! The form export has a header row and is read by column position:
//! allocation time (0), member name (2), ticket holder name (3), number of
//! tickets (6) and pickup method (7). Other columns are ignored.

use super::{parse_timestamp, read_text};
use crate::error::{Result, SeatingError};
use crate::types::Request;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::num::NonZeroU32;
use std::path::Path;

const COL_TIMESTAMP: usize = 0;
const COL_MEMBER: usize = 2;
const COL_HOLDER: usize = 3;
const COL_TICKETS: usize = 6;
const COL_PICKUP: usize = 7;

/// Why a row did not become a request
enum Skip {
    /// Logged and dropped
    Malformed(String),
    /// Dropped without a warning (no tickets wanted)
    Empty,
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

fn parse_row(record: &StringRecord, row: usize) -> std::result::Result<Request, Skip> {
    if record.len() <= COL_PICKUP {
        return Err(Skip::Malformed(format!(
            "expected at least {} columns, found {}",
            COL_PICKUP + 1,
            record.len()
        )));
    }

    let tickets = field(record, COL_TICKETS);
    if tickets.is_empty() {
        return Err(Skip::Empty);
    }
    let tickets: i64 = tickets
        .parse()
        .map_err(|_| Skip::Malformed(format!("number of tickets '{tickets}' is not a number")))?;
    if tickets <= 0 {
        return Err(Skip::Empty);
    }
    let party_size = u32::try_from(tickets)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| Skip::Malformed(format!("number of tickets {tickets} is too large")))?;

    let member_name = field(record, COL_MEMBER);
    let holder_name = match field(record, COL_HOLDER) {
        "" => member_name,
        holder => holder,
    };

    Ok(Request::new(
        parse_timestamp(field(record, COL_TIMESTAMP)),
        holder_name,
        party_size,
    )
    .with_member_name(member_name)
    .with_pickup_method(field(record, COL_PICKUP))
    .with_source_row(row))
}

/// Reads requests from CSV text, in file order.
///
/// `source` names the input in log messages. Rows are numbered as in a
/// spreadsheet: the header is row 1.
///
/// # Errors
///
/// Returns [`SeatingError::Csv`] if the underlying reader fails. Malformed
/// rows are skipped, not reported as errors.
pub fn requests_from_reader<R: std::io::Read>(reader: R, source: &Path) -> Result<Vec<Request>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut requests = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(SeatingError::csv(source, e)),
            Err(e) => {
                tracing::warn!("Skipping row {} of '{}': {}", row, source.display(), e);
                continue;
            }
        };

        match parse_row(&record, row) {
            Ok(request) => requests.push(request),
            Err(Skip::Empty) => {}
            Err(Skip::Malformed(reason)) => {
                tracing::warn!(
                    "Skipping row {} of '{}': {} (original data: {:?})",
                    row,
                    source.display(),
                    reason,
                    record
                );
            }
        }
    }

    Ok(requests)
}

/// Loads the waiting list, in file order
///
/// # Errors
///
/// Returns [`SeatingError::Io`] if the file cannot be read, or any error of
/// [`requests_from_reader`].
pub fn load_requests(path: &Path) -> Result<Vec<Request>> {
    let text = read_text(path)?;
    let requests = requests_from_reader(text.as_bytes(), path)?;
    tracing::info!("Loaded {} request(s) from '{}'", requests.len(), path.display());
    Ok(requests)
}
