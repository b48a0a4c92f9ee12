//! Preserved seats: removal from the inventory and the match index.
//!
//! A preserved binding commits a seat to a holder before the waiting list is
//! processed. The holder often also appears in the waiting list; the match
//! index lets the allocation engine recognise such a request as already
//! served instead of seating the party twice.
//!
//! How a request is paired with a preservation is decided by a
//! [`MatchPolicy`]. The default, [`HolderAndPriority`], pairs on the exact
//! holder name plus the original allocation time.

use crate::aggregates::seating::{SeatingAction, SeatingEnvironment, SeatingReducer, SeatingState};
use crate::types::{PreservedBinding, Request};
use seatplan_core::reducer::Reducer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Match Keys and Policies
// ============================================================================

/// Key pairing a preserved binding with a request
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    /// Holder the seats are issued to
    pub holder: String,
    /// Policy-specific discriminator (e.g., the allocation time)
    pub token: String,
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.holder, self.token)
    }
}

/// Decides which requests are covered by which preservations.
///
/// Returning `None` opts a record out of matching entirely.
pub trait MatchPolicy: Send + Sync {
    /// Key under which a preserved seat is counted
    fn binding_key(&self, binding: &PreservedBinding) -> Option<MatchKey>;

    /// Key a request is looked up under
    fn request_key(&self, request: &Request) -> Option<MatchKey>;
}

/// Pairs on exact holder name and a valid, equal allocation time
#[derive(Debug, Clone, Copy, Default)]
pub struct HolderAndPriority;

impl HolderAndPriority {
    fn key(holder: &str, at: chrono::NaiveDateTime) -> MatchKey {
        MatchKey {
            holder: holder.to_string(),
            token: at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

impl MatchPolicy for HolderAndPriority {
    fn binding_key(&self, binding: &PreservedBinding) -> Option<MatchKey> {
        let at = binding.priority?.as_valid()?;
        Some(Self::key(&binding.holder_name, at))
    }

    fn request_key(&self, request: &Request) -> Option<MatchKey> {
        let at = request.priority.as_valid()?;
        Some(Self::key(&request.holder_name, at))
    }
}

/// Never pairs anything; every request goes through allocation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMatching;

impl MatchPolicy for NoMatching {
    fn binding_key(&self, _binding: &PreservedBinding) -> Option<MatchKey> {
        None
    }

    fn request_key(&self, _request: &Request) -> Option<MatchKey> {
        None
    }
}

/// Configurable choice of [`MatchPolicy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicyKind {
    /// [`HolderAndPriority`]
    #[default]
    HolderAndPriority,
    /// [`NoMatching`]
    Disabled,
}

impl MatchPolicyKind {
    /// Instantiates the policy
    #[must_use]
    pub fn into_policy(self) -> Arc<dyn MatchPolicy> {
        match self {
            Self::HolderAndPriority => Arc::new(HolderAndPriority),
            Self::Disabled => Arc::new(NoMatching),
        }
    }
}

impl FromStr for MatchPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "holder-and-priority" | "holder_and_priority" | "default" => Ok(Self::HolderAndPriority),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(format!("unknown match policy '{other}'")),
        }
    }
}

impl fmt::Display for MatchPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HolderAndPriority => f.write_str("holder-and-priority"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

// ============================================================================
// Match Index
// ============================================================================

/// Remaining preserved seat counts per match key
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchIndex {
    counts: BTreeMap<MatchKey, u32>,
}

impl MatchIndex {
    /// Creates an empty index
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// Counts one more preserved seat under `key`
    pub fn reserve(&mut self, key: MatchKey) {
        *self.counts.entry(key).or_default() += 1;
    }

    /// Preserved seats still unclaimed under `key`
    #[must_use]
    pub fn remaining(&self, key: &MatchKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Takes `quantity` seats from `key` if that many remain.
    ///
    /// Returns false (and changes nothing) otherwise.
    pub fn try_consume(&mut self, key: &MatchKey, quantity: u32) -> bool {
        match self.counts.get_mut(key) {
            Some(count) if *count >= quantity => {
                *count -= quantity;
                true
            }
            _ => false,
        }
    }

    /// Number of distinct keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no preservation is indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Preserved seats not yet claimed by any request
    #[must_use]
    pub fn total_remaining(&self) -> u32 {
        self.counts.values().sum()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Applies every preserved binding, in order, to the run state.
///
/// Seats found in their claimed block leave the inventory; seats that are not
/// found are still recorded as preserved assignments and reported through
/// [`SeatingState::unmatched`]. Returns the emitted events.
pub fn resolve(
    state: &mut SeatingState,
    bindings: &[PreservedBinding],
    env: &SeatingEnvironment,
) -> Vec<SeatingAction> {
    let reducer = SeatingReducer::new();
    let mut events = Vec::with_capacity(bindings.len());
    for binding in bindings {
        events.extend(reducer.reduce(
            state,
            SeatingAction::PreserveSeat {
                binding: binding.clone(),
            },
            env,
        ));
    }

    tracing::debug!(
        "Resolved {} preserved binding(s): {} unmatched, {} match key(s)",
        bindings.len(),
        state.unmatched.len(),
        state.match_index.len()
    );

    events
}
