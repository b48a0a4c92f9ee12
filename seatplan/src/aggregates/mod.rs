//! Aggregate reducers for seat allocation.
//!
//! - Seating: inventory, preserved seats, and the waiting list of one run

pub mod seating;

pub use seating::{SeatingAction, SeatingEnvironment, SeatingReducer, SeatingState};
