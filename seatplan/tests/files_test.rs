//! File-level tests: load inputs from disk, run, export, audit.
//!
//! Run with: `cargo test -p seatplan --test files_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use seatplan::aggregates::SeatingEnvironment;
use seatplan::audit::{count_seats, find_duplicates, unpreserved_seats};
use seatplan::export::{export_csv, write_json_report};
use seatplan::loading::{load_inventory, load_preserved, load_requests, read_raw_inventory};
use seatplan::preservation::HolderAndPriority;
use seatplan::types::{BlockName, SeatId};
use seatplan::{RunOptions, SeatingError, SeatingRun, plan_seating};
use seatplan_testing::test_clock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const SEATS_JSON: &str = r#"{
  "block-2": ["B-01", "B-02"],
  "block-1": ["A-01", "A-02", "A-03"]
}"#;

const AUDIENCES_CSV: &str = "\u{feff}Allocation Time,Identity,Member Name,Ticket Holder Name,Copiable,Instrument,Number of Tickets,Pickup Method
2025/5/14 下午 5:51:07,Member,Chen,Lin,Y,Violin,2,Counter
2025/5/14 上午 9:12:00,Member,Wu,,N,Cello,2,Mail
2025/5/14 下午 6:00:00,Member,Zhao,Zhao,N,Flute,4,Mail
2025/5/14 下午 6:01:00,Member,Empty,Empty,N,Flute,,Mail
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn env() -> SeatingEnvironment {
    SeatingEnvironment::new(Arc::new(HolderAndPriority), Arc::new(test_clock()))
}

fn run_from_files(seats: &Path, audiences: &Path, preserved: Option<&Path>) -> SeatingRun {
    let inventory = load_inventory(seats).unwrap();
    let requests = load_requests(audiences).unwrap();
    let preserved = preserved.map(|p| load_preserved(p).unwrap()).unwrap_or_default();
    plan_seating(inventory, &preserved, requests, &env(), RunOptions::default()).unwrap()
}

#[test]
fn test_run_from_files_in_allocation_time_order() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", SEATS_JSON);
    let audiences = write(&dir, "audiences.csv", AUDIENCES_CSV);

    let run = run_from_files(&seats, &audiences, None);
    let result = &run.result;

    // Wu (09:12) comes before Lin (17:51) and takes the front of block 1
    let block_1: Vec<_> = result.chart[&BlockName::new(1)]
        .iter()
        .map(|a| (a.seat.as_str(), a.holder_name.as_str()))
        .collect();
    assert_eq!(block_1, vec![("A-01", "Wu"), ("A-02", "Wu")]);

    let block_2: Vec<_> = result.chart[&BlockName::new(2)]
        .iter()
        .map(|a| (a.seat.as_str(), a.holder_name.as_str()))
        .collect();
    assert_eq!(block_2, vec![("B-01", "Lin"), ("B-02", "Lin")]);

    assert_eq!(result.unassigned.len(), 1);
    assert_eq!(result.unassigned[0].holder_name, "Zhao");
    assert_eq!(result.unassigned[0].source_row, Some(4));
    assert_eq!(result.residual[&BlockName::new(1)], vec![SeatId::new("A-03")]);
}

#[test]
fn test_csv_export_layout() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", SEATS_JSON);
    let audiences = write(&dir, "audiences.csv", AUDIENCES_CSV);
    let run = run_from_files(&seats, &audiences, None);

    let output = dir.path().join("output.csv");
    export_csv(&run.result, &output).unwrap();

    let bytes = fs::read(&output).unwrap();
    assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Block,Seat Number,Member Name,Ticket Holder Name,Number of Tickets,Pickup Method,Allocation Time",
            "Block 1,A-01,Wu,Wu,1,Mail,2025/05/14 09:12:00",
            "Block 1,A-02,Wu,Wu,1,Mail,2025/05/14 09:12:00",
            "Block 2,B-01,Chen,Lin,1,Counter,2025/05/14 17:51:07",
            "Block 2,B-02,Chen,Lin,1,Counter,2025/05/14 17:51:07",
            "N/A (Unassigned),N/A,Zhao,Zhao,4,Mail,2025/05/14 18:00:00",
        ]
    );
}

#[test]
fn test_exported_chart_feeds_the_next_run_as_preserved_seats() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", SEATS_JSON);
    let audiences = write(&dir, "audiences.csv", AUDIENCES_CSV);
    let first = run_from_files(&seats, &audiences, None);

    let chart = dir.path().join("chart.csv");
    export_csv(&first.result, &chart).unwrap();

    // Same waiting list again: everyone already seated is covered
    let second = run_from_files(&seats, &audiences, Some(&chart));
    let summary = second.result.summary();
    assert_eq!(summary.seats_preserved, 4);
    assert_eq!(summary.requests_covered, 2);
    assert_eq!(summary.seats_assigned, 0);
    assert_eq!(second.result.unassigned.len(), 1);
    assert!(second.result.unmatched.is_empty());
    assert_eq!(
        second.result.residual[&BlockName::new(1)],
        vec![SeatId::new("A-03")]
    );
}

#[test]
fn test_json_report_contains_summary_and_result() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", SEATS_JSON);
    let audiences = write(&dir, "audiences.csv", AUDIENCES_CSV);
    let run = run_from_files(&seats, &audiences, None);

    let report = dir.path().join("report.json");
    write_json_report(&run.result, &report).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["seats_total"], 5);
    assert_eq!(json["summary"]["requests_unassigned"], 1);
    assert_eq!(json["conservation_violations"], serde_json::json!([]));
    assert_eq!(json["residual"]["block-1"], serde_json::json!(["A-03"]));
    assert_eq!(json["chart"]["block-2"][0]["origin"], "new");
}

#[test]
fn test_inventory_with_duplicate_seats_is_rejected_but_auditable() {
    let dir = TempDir::new().unwrap();
    let seats = write(
        &dir,
        "available-seats.json",
        r#"{"block-1": ["A-01", "X"], "block-2": ["X"]}"#,
    );

    let err = load_inventory(&seats).unwrap_err();
    assert!(matches!(err, SeatingError::DuplicateSeat { ref seat, count: 2 } if seat == "X"));

    let raw = read_raw_inventory(&seats).unwrap();
    assert_eq!(count_seats(&raw).total, 3);
    let duplicates = find_duplicates(&raw);
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].seat, SeatId::new("X"));
}

#[test]
fn test_unpreserved_seats_from_files() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", SEATS_JSON);
    let preserved = write(
        &dir,
        "preserved-seats.csv",
        "Block,Seat Number,Ticket Holder Name\nblock-1,A-02,Lin\nblock-2,B-01,Wu\n",
    );

    let raw = read_raw_inventory(&seats).unwrap();
    let bindings = load_preserved(&preserved).unwrap();
    let free = unpreserved_seats(&raw, &bindings).unwrap();
    assert_eq!(
        free,
        vec![SeatId::new("A-01"), SeatId::new("A-03"), SeatId::new("B-02")]
    );
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let err = load_inventory(&missing).unwrap_err();
    assert!(matches!(err, SeatingError::Io { .. }));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn test_malformed_json_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let seats = write(&dir, "available-seats.json", r#"{"block-1": "A-01"}"#);
    assert!(matches!(load_inventory(&seats), Err(SeatingError::Json { .. })));
}
