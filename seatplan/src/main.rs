//! Seatplan command-line tool.
//!
//! ## Commands
//!
//! - `seatplan allocate` - seat the waiting list and print the chart (default)
//! - `seatplan count` - print the number of seats per block
//! - `seatplan audit` - report duplicate seats and seats left unpreserved

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use seatplan::aggregates::SeatingEnvironment;
use seatplan::audit::{count_seats, find_duplicates, unpreserved_seats};
use seatplan::config::{Config, DEFAULT_PRESERVED_FILE};
use seatplan::export::{export_csv, with_csv_extension, write_json_report};
use seatplan::loading::{load_inventory, load_preserved, load_requests, read_raw_inventory};
use seatplan::plan_seating;
use seatplan::preservation::MatchPolicyKind;
use seatplan_core::environment::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "seatplan")]
#[command(author, version, about = "Block-contiguous seat allocation for ticket waiting lists")]
struct Cli {
    /// Inventory JSON (overrides SEATPLAN_SEATS_FILE)
    #[arg(long, global = true)]
    seats: Option<PathBuf>,

    /// Preserved seats CSV (overrides SEATPLAN_PRESERVED_FILE)
    #[arg(long, global = true)]
    preserved: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Seat the waiting list and print the chart
    Allocate(AllocateArgs),
    /// Print the number of seats per block
    Count,
    /// Report duplicate seats and available seats that are not preserved
    Audit,
}

#[derive(Args, Default)]
struct AllocateArgs {
    /// Waiting list CSV (overrides SEATPLAN_AUDIENCES_FILE)
    #[arg(long)]
    audiences: Option<PathBuf>,

    /// Export the chart to this CSV file; `.csv` is appended if missing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Fail if a preserved seat is not in the inventory
    #[arg(long)]
    strict: bool,

    /// How requests are paired with preserved seats: holder-and-priority, disabled
    #[arg(long)]
    match_policy: Option<MatchPolicyKind>,
}

fn allocate(mut config: Config, args: AllocateArgs) -> Result<()> {
    if let Some(path) = args.audiences {
        config.input.audiences_file = path;
    }
    if let Some(path) = args.output {
        config.output.csv_file = Some(path);
    }
    if let Some(path) = args.report {
        config.output.report_file = Some(path);
    }
    if let Some(policy) = args.match_policy {
        config.allocation.match_policy = policy;
    }
    config.allocation.strict_preservations |= args.strict;

    let seats_file = &config.input.seats_file;
    let inventory = load_inventory(seats_file)
        .with_context(|| format!("Failed to load available seats from '{}'", seats_file.display()))?;

    let audiences_file = &config.input.audiences_file;
    let requests = load_requests(audiences_file).with_context(|| {
        format!("Failed to load audience requests from '{}'", audiences_file.display())
    })?;

    let preserved = match &config.input.preserved_file {
        Some(path) => load_preserved(path)
            .with_context(|| format!("Failed to load preserved seats from '{}'", path.display()))?,
        None => Vec::new(),
    };

    let env = SeatingEnvironment::new(
        config.allocation.match_policy.into_policy(),
        Arc::new(SystemClock),
    );
    let run = plan_seating(
        inventory,
        &preserved,
        requests,
        &env,
        config.allocation.run_options(),
    )
    .context("Seat assignment failed")?;

    print!("{}", run.result);

    match &config.output.csv_file {
        Some(path) => {
            let path = with_csv_extension(path);
            export_csv(&run.result, &path)
                .with_context(|| format!("Failed to export results to '{}'", path.display()))?;
        }
        None => info!("No output file given; CSV export skipped"),
    }

    if let Some(path) = &config.output.report_file {
        write_json_report(&run.result, path)
            .with_context(|| format!("Failed to write report to '{}'", path.display()))?;
    }

    info!(events = run.events.len(), "Run finished");
    Ok(())
}

fn count(config: &Config) -> Result<()> {
    let seats_file = &config.input.seats_file;
    let raw = read_raw_inventory(seats_file)
        .with_context(|| format!("Failed to read '{}'", seats_file.display()))?;
    print!("{}", count_seats(&raw));
    Ok(())
}

fn audit(config: &Config) -> Result<()> {
    let seats_file = &config.input.seats_file;
    let raw = read_raw_inventory(seats_file)
        .with_context(|| format!("Failed to read '{}'", seats_file.display()))?;

    let duplicates = find_duplicates(&raw);
    if duplicates.is_empty() {
        println!("No duplicate seats found.");
    } else {
        println!("Duplicate seats found:");
        for duplicate in &duplicates {
            println!("{} (count: {})", duplicate.seat, duplicate.count);
        }
        bail!(
            "{} duplicate seat(s) in '{}'",
            duplicates.len(),
            seats_file.display()
        );
    }

    let preserved_file = config
        .input
        .preserved_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRESERVED_FILE));
    if !preserved_file.exists() {
        info!(
            "No preserved seats file at '{}'; skipping unpreserved seat listing",
            preserved_file.display()
        );
        return Ok(());
    }

    let preserved = load_preserved(&preserved_file)
        .with_context(|| format!("Failed to load '{}'", preserved_file.display()))?;
    for seat in unpreserved_seats(&raw, &preserved)? {
        println!("Available (not preserved) seat: {seat}");
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.seats {
        config.input.seats_file = path;
    }
    if let Some(path) = cli.preserved {
        config.input.preserved_file = Some(path);
    }

    match cli.command.unwrap_or_else(|| Commands::Allocate(AllocateArgs::default())) {
        Commands::Allocate(args) => allocate(config, args),
        Commands::Count => count(&config),
        Commands::Audit => audit(&config),
    }
}
