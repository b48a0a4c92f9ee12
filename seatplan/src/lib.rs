//! # Seatplan
//!
//! Block-contiguous seat allocation for an ordered ticket waiting list.
//!
//! Seats are grouped into numbered blocks. Some seats are preserved ahead of
//! time for specific holders; everything else is handed out to the waiting
//! list in allocation-time order, each party seated together in the first
//! block that can hold it.
//!
//! # Architecture
//!
//! ```text
//!   available-seats.json     preserved-seats.csv       audiences.csv
//!          │                        │                        │
//!          ▼                        ▼                        ▼
//!   ┌──────────────┐      ┌───────────────────┐      ┌──────────────┐
//!   │ SeatInventory│─────▶│ Preservation      │      │ Demand queue │
//!   │  (blocks)    │      │ Resolver          │      │ (sorted once)│
//!   └──────────────┘      └───────────────────┘      └──────────────┘
//!                                   │ reduced inventory     │
//!                                   │ + match index         │
//!                                   ▼                       │
//!                         ┌───────────────────┐             │
//!                         │ Allocation Engine │◀────────────┘
//!                         └───────────────────┘
//!                                   │
//!                                   ▼
//!                 SeatingResult: chart, residual, unassigned
//! ```
//!
//! Both stages drive one [`SeatingReducer`](aggregates::SeatingReducer):
//! commands go in, events come out and are applied to a single owned
//! [`SeatingState`](aggregates::SeatingState).
//!
//! # Example
//!
//! ```
//! use seatplan::aggregates::SeatingEnvironment;
//! use seatplan::inventory::SeatInventory;
//! use seatplan::run::{RunOptions, plan_seating};
//! use seatplan::types::{BlockName, PriorityKey, Request, SeatId};
//! use std::num::NonZeroU32;
//!
//! # fn main() -> Result<(), seatplan::SeatingError> {
//! let inventory = SeatInventory::from_blocks([
//!     (BlockName::new(1), vec![SeatId::new("A1"), SeatId::new("A2")]),
//!     (BlockName::new(2), vec![SeatId::new("B1"), SeatId::new("B2"), SeatId::new("B3")]),
//! ])?;
//! let requests = vec![Request::new(PriorityKey::Invalid, "Lin", NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN))];
//!
//! let run = plan_seating(inventory, &[], requests, &SeatingEnvironment::default(), RunOptions::default())?;
//! assert_eq!(run.result.chart[&BlockName::new(2)].len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod aggregates;
pub mod allocation;
pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod inventory;
pub mod loading;
pub mod preservation;
pub mod report;
pub mod run;
pub mod types;

pub use error::{Result, SeatingError};
pub use report::{SeatingResult, Summary};
pub use run::{RunOptions, SeatingRun, plan_seating};
