//! # Seatplan Core
//!
//! Core traits for the seatplan allocation engine.
//!
//! The engine is written as a reducer: a single owned state value is driven
//! by a sequence of commands, and every command produces the events that
//! describe what happened to the state. Events are plain values, so a run can
//! be replayed, logged or asserted on in tests.
//!
//! ## Core Concepts
//!
//! - **State**: everything a run owns (inventory, seating chart, match index)
//! - **Action**: commands (requests to change state) and events (facts)
//! - **Reducer**: `(State, Action, Environment) → (State, Events)`
//! - **Environment**: injected collaborators (clock, matching policy)
//!
//! ## Example
//!
//! ```
//! use seatplan_core::reducer::Reducer;
//! use seatplan_core::{SmallVec, smallvec};
//!
//! struct Counter;
//!
//! #[derive(Debug, PartialEq)]
//! enum CounterAction {
//!     Increment,
//!     Incremented { to: u32 },
//! }
//!
//! impl Reducer for Counter {
//!     type State = u32;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut u32,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[CounterAction; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 *state += 1;
//!                 smallvec![CounterAction::Incremented { to: *state }]
//!             }
//!             CounterAction::Incremented { .. } => SmallVec::new(),
//!         }
//!     }
//! }
//!
//! let mut count = 0;
//! let events = Counter.reduce(&mut count, CounterAction::Increment, &());
//! assert_eq!(count, 1);
//! assert_eq!(events.as_slice(), &[CounterAction::Incremented { to: 1 }]);
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
///
/// Reducers are deterministic functions: `(State, Action, Environment) → (State, Events)`.
/// They hold all business logic and never perform I/O.
pub mod reducer {
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer mutates
    /// - `Action`: Commands and events handled by this reducer
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and emitted events
        ///
        /// 1. Decides what the action means for the current state
        /// 2. Applies the resulting events to state in place
        /// 3. Returns those events, in the order they were applied
        ///
        /// Reducing an event (rather than a command) is a no-op that returns
        /// no events.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Self::Action; 4]>;
    }
}

/// Environment module - Dependency injection traits
///
/// External dependencies are abstracted behind traits and injected via the
/// Environment parameter of a reducer.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{DateTime, Utc};
    /// use seatplan_core::environment::Clock;
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
