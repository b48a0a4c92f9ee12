//! Error types for loading inputs and running a seating plan.
//!
//! Only conditions that abort a run live here. Per-record anomalies (a
//! malformed CSV row, an unparseable timestamp, a preserved seat that is not
//! in the inventory, a party that does not fit) are logged and carried as
//! data instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for seating operations.
pub type Result<T> = std::result::Result<T, SeatingError>;

/// Fatal errors for a seating run.
#[derive(Debug, Error)]
pub enum SeatingError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// An input or output file could not be read or written.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The inventory file is not a JSON object of seat arrays.
    #[error("Invalid JSON in '{}': {source}", .path.display())]
    Json {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A CSV file could not be read or written.
    #[error("CSV error in '{}': {source}", .path.display())]
    Csv {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: csv::Error,
    },

    /// A block label carries no trailing block number.
    #[error("Invalid block name '{0}': expected a trailing block number such as 'block-3'")]
    InvalidBlockName(String),

    /// Two inventory labels resolve to the same block number.
    #[error("Block {index} is defined twice ('{first}' and '{second}')")]
    DuplicateBlock {
        /// Block number
        index: u32,
        /// First label seen
        first: String,
        /// Conflicting label
        second: String,
    },

    /// A seat identifier appears more than once in the inventory.
    #[error("Seat '{seat}' appears {count} times in the inventory")]
    DuplicateSeat {
        /// Offending seat
        seat: String,
        /// Number of occurrences
        count: usize,
    },

    // ═══════════════════════════════════════════════════════════
    // Run Errors
    // ═══════════════════════════════════════════════════════════

    /// The inventory holds no blocks.
    #[error("No available seats were loaded")]
    EmptyInventory,

    /// No valid request survived loading.
    #[error("No valid audience requests were loaded")]
    EmptyDemand,

    /// Preserved seats were not found in their claimed block (strict mode).
    #[error("{count} preserved seat(s) were not found in the inventory")]
    UnmatchedPreservations {
        /// Number of unmatched bindings
        count: usize,
    },
}

impl SeatingError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a CSV error with the path it occurred on.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
