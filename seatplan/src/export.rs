//! Writing results: seating chart CSV and JSON report.

use crate::error::{Result, SeatingError};
use crate::report::{ConservationViolation, SeatingResult, Summary};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Block column of unassigned rows
pub const UNASSIGNED_BLOCK: &str = "N/A (Unassigned)";

/// Seat column of unassigned rows
pub const UNASSIGNED_SEAT: &str = "N/A";

/// One row of the seating chart export
#[derive(Debug, Serialize)]
struct ChartRow<'a> {
    #[serde(rename = "Block")]
    block: String,
    #[serde(rename = "Seat Number")]
    seat: &'a str,
    #[serde(rename = "Member Name")]
    member_name: &'a str,
    #[serde(rename = "Ticket Holder Name")]
    holder_name: &'a str,
    #[serde(rename = "Number of Tickets")]
    tickets: u32,
    #[serde(rename = "Pickup Method")]
    pickup_method: &'a str,
    #[serde(rename = "Allocation Time")]
    allocation_time: String,
}

/// Appends `.csv` unless the path already ends in it (any case)
#[must_use]
pub fn with_csv_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    }
}

/// Writes the chart as CSV: one row per assigned seat, then one row per
/// unassigned request.
///
/// # Errors
///
/// Returns the underlying CSV error if a row cannot be written.
pub fn write_chart_csv<W: Write>(result: &SeatingResult, writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    for assignment in result.assignments() {
        writer.serialize(ChartRow {
            block: assignment.block.display_name(),
            seat: assignment.seat.as_str(),
            member_name: &assignment.member_name,
            holder_name: &assignment.holder_name,
            tickets: 1,
            pickup_method: &assignment.pickup_method,
            allocation_time: assignment
                .priority
                .map(|p| p.export_text())
                .unwrap_or_default(),
        })?;
    }

    for request in &result.unassigned {
        writer.serialize(ChartRow {
            block: UNASSIGNED_BLOCK.to_string(),
            seat: UNASSIGNED_SEAT,
            member_name: &request.member_name,
            holder_name: &request.holder_name,
            tickets: request.party_size.get(),
            pickup_method: &request.pickup_method,
            allocation_time: request.priority.export_text(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Exports the chart to a CSV file with a UTF-8 byte order mark
///
/// # Errors
///
/// Returns [`SeatingError::Io`] if the file cannot be written and
/// [`SeatingError::Csv`] if a row cannot be serialized.
pub fn export_csv(result: &SeatingResult, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| SeatingError::io(path, e))?;
    let mut out = BufWriter::new(file);
    out.write_all("\u{feff}".as_bytes())
        .map_err(|e| SeatingError::io(path, e))?;
    write_chart_csv(result, &mut out).map_err(|e| SeatingError::csv(path, e))?;
    out.flush().map_err(|e| SeatingError::io(path, e))?;

    tracing::info!("Results exported to '{}'", path.display());
    Ok(())
}

/// JSON report layout
#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    conservation_violations: Vec<ConservationViolation>,
    #[serde(flatten)]
    result: &'a SeatingResult,
}

/// Writes the full result, with its summary, as pretty JSON
///
/// # Errors
///
/// Returns [`SeatingError::Io`] if the file cannot be created and
/// [`SeatingError::Json`] if writing fails.
pub fn write_json_report(result: &SeatingResult, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| SeatingError::io(path, e))?;
    let report = JsonReport {
        summary: result.summary(),
        conservation_violations: result.check_conservation(),
        result,
    };
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &report).map_err(|source| SeatingError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|e| SeatingError::io(path, e))?;

    tracing::info!("Report written to '{}'", path.display());
    Ok(())
}
