//! Ergonomic testing utilities for reducers
//!
//! Given-When-Then harness: seed a state, reduce one action, assert on the
//! resulting state and on the events the reducer emitted.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use seatplan_core::reducer::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for event assertion functions
type EventAssertion<A> = Box<dyn FnOnce(&[A])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(SeatingReducer::new())
///     .with_env(test_environment())
///     .given_state(state)
///     .when_action(SeatingAction::AllocateRequest { request })
///     .then_state(|state| {
///         assert_eq!(state.inventory.total_available(), 1);
///     })
///     .then_events(|events| {
///         assert_eq!(events.len(), 1);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    environment: Option<E>,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
    event_assertions: Vec<EventAssertion<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
            event_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to reduce (When)
    ///
    /// Can be called more than once; actions are reduced in call order and
    /// the events of all of them are collected.
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the emitted events (Then)
    #[must_use]
    pub fn then_events<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[A]) + 'static,
    {
        self.event_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        let mut events = Vec::new();
        for action in self.actions {
            events.extend(self.reducer.reduce(&mut state, action, &env));
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.event_assertions {
            assertion(&events);
        }
    }
}

/// Helper assertions for emitted events
pub mod assertions {
    /// Assert that no events were emitted
    ///
    /// # Panics
    ///
    /// Panics if events is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_events<A: std::fmt::Debug>(events: &[A]) {
        assert!(
            events.is_empty(),
            "Expected no events, but found {}: {:?}",
            events.len(),
            events
        );
    }

    /// Assert the number of events
    ///
    /// # Panics
    ///
    /// Panics if the number of events doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_events_count<A>(events: &[A], expected: usize) {
        assert_eq!(
            events.len(),
            expected,
            "Expected {} events, but found {}",
            expected,
            events.len()
        );
    }

    /// Assert that at least one event satisfies the predicate
    ///
    /// # Panics
    ///
    /// Panics if no event matches.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_event<A: std::fmt::Debug>(events: &[A], predicate: impl Fn(&A) -> bool) {
        assert!(
            events.iter().any(predicate),
            "Expected a matching event, but none found in {events:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_core::reducer::Reducer;
    use smallvec::{SmallVec, smallvec};

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        Changed { to: i32 },
    }

    struct TestReducer;

    struct TestEnv;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Self::Action; 4]> {
            match action {
                TestAction::Increment => {
                    state.count += 1;
                    smallvec![TestAction::Changed { to: state.count }]
                }
                TestAction::Decrement => {
                    state.count -= 1;
                    smallvec![TestAction::Changed { to: state.count }]
                }
                TestAction::Changed { .. } => SmallVec::new(),
            }
        }
    }

    #[test]
    fn test_reducer_test_increment() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_events(|events| {
                assert_eq!(events, &[TestAction::Changed { to: 1 }]);
            })
            .run();
    }

    #[test]
    fn test_reducer_test_collects_events_of_every_action() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 5 })
            .when_action(TestAction::Decrement)
            .when_action(TestAction::Decrement)
            .then_state(|state| {
                assert_eq!(state.count, 3);
            })
            .then_events(|events| {
                assertions::assert_events_count(events, 2);
                assertions::assert_has_event(events, |e| *e == TestAction::Changed { to: 3 });
            })
            .run();
    }

    #[test]
    fn test_reducing_an_event_emits_nothing() {
        ReducerTest::new(TestReducer)
            .with_env(TestEnv)
            .given_state(TestState { count: 0 })
            .when_action(TestAction::Changed { to: 9 })
            .then_state(|state| assert_eq!(state.count, 0))
            .then_events(assertions::assert_no_events)
            .run();
    }
}
