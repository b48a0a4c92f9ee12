//! Configuration management for seating runs.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary loads a `.env` file first and lets command-line flags override
//! whatever is set here.

use crate::preservation::MatchPolicyKind;
use crate::run::RunOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default inventory file
pub const DEFAULT_SEATS_FILE: &str = "available-seats.json";

/// Default waiting list file
pub const DEFAULT_AUDIENCES_FILE: &str = "audiences.csv";

/// Preserved seat file the audit falls back to
pub const DEFAULT_PRESERVED_FILE: &str = "preserved-seats.csv";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Input files
    pub input: InputConfig,
    /// Output files
    pub output: OutputConfig,
    /// Allocation behaviour
    pub allocation: AllocationConfig,
}

/// Input file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Inventory JSON (default: `available-seats.json`)
    pub seats_file: PathBuf,
    /// Waiting list CSV (default: `audiences.csv`)
    pub audiences_file: PathBuf,
    /// Preserved seats CSV (default: none)
    pub preserved_file: Option<PathBuf>,
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Seating chart CSV (default: none, export skipped)
    pub csv_file: Option<PathBuf>,
    /// JSON report (default: none)
    pub report_file: Option<PathBuf>,
}

/// Allocation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// How requests are paired with preserved seats
    pub match_policy: MatchPolicyKind,
    /// Fail when a preserved seat is not in the inventory (default: false)
    pub strict_preservations: bool,
}

impl AllocationConfig {
    /// Run options for this configuration
    #[must_use]
    pub const fn run_options(&self) -> RunOptions {
        RunOptions {
            strict_preservations: self.strict_preservations,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for any unset or unparseable variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| lookup(key).filter(|s| !s.trim().is_empty()).map(PathBuf::from);

        Self {
            input: InputConfig {
                seats_file: path("SEATPLAN_SEATS_FILE")
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SEATS_FILE)),
                audiences_file: path("SEATPLAN_AUDIENCES_FILE")
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_AUDIENCES_FILE)),
                preserved_file: path("SEATPLAN_PRESERVED_FILE"),
            },
            output: OutputConfig {
                csv_file: path("SEATPLAN_OUTPUT_FILE"),
                report_file: path("SEATPLAN_REPORT_FILE"),
            },
            allocation: AllocationConfig {
                match_policy: lookup("SEATPLAN_MATCH_POLICY")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
                strict_preservations: lookup("SEATPLAN_STRICT_PRESERVATIONS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
