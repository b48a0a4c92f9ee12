//! Domain types for seat allocation.
//!
//! Value objects (seat and block identifiers, priority keys) and the records
//! that flow through a run: requests from the waiting list, preserved seat
//! bindings, and the assignments the engine produces.

use crate::error::SeatingError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

/// Format used when printing and exporting priority keys.
pub const PRIORITY_DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a physical seat (e.g., "A-12", "2F-031")
///
/// Seat identifiers are opaque and unique across the whole inventory.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    /// Creates a new `SeatId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the seat identifier as a string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeatId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Block identifier, ordered by the block number embedded in its label.
///
/// `block-3`, `Block 3` and `B-3` all name block 3. The canonical form is
/// `block-3`; [`BlockName::display_name`] gives the human form `Block 3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockName(u32);

impl BlockName {
    /// Creates a `BlockName` from its block number
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the block number
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.0
    }

    /// Parses a block label by its trailing block number.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::InvalidBlockName`] if the label does not end in
    /// a number that fits a `u32`.
    pub fn parse(label: &str) -> Result<Self, SeatingError> {
        let trimmed = label.trim();
        let prefix_len = trimmed
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .len();
        trimmed[prefix_len..]
            .parse::<u32>()
            .map(Self)
            .map_err(|_| SeatingError::InvalidBlockName(label.to_string()))
    }

    /// Human readable name used in reports and exports (`Block 3`)
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("Block {}", self.0)
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

impl FromStr for BlockName {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BlockName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::parse(&label).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Priority Keys
// ============================================================================

/// Ordering key of a request in the waiting list.
///
/// `Invalid` marks a timestamp that failed to parse. Derived ordering places
/// every `Valid` key before `Invalid`, so such requests are served last.
/// Use [`PriorityKey::matches`] (not `==`) when pairing keys: an `Invalid`
/// key never matches anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriorityKey {
    /// A parsed allocation time
    Valid(NaiveDateTime),
    /// Unparseable allocation time
    Invalid,
}

impl PriorityKey {
    /// Returns true for a parsed key
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns the parsed time, if any
    #[must_use]
    pub const fn as_valid(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Valid(at) => Some(*at),
            Self::Invalid => None,
        }
    }

    /// True when both keys are valid and equal
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Valid(a), Self::Valid(b)) => a == b,
            _ => false,
        }
    }

    /// Text used in CSV exports (empty for `Invalid`)
    #[must_use]
    pub fn export_text(&self) -> String {
        self.as_valid()
            .map(|at| at.format(PRIORITY_DISPLAY_FORMAT).to_string())
            .unwrap_or_default()
    }
}

impl From<NaiveDateTime> for PriorityKey {
    fn from(at: NaiveDateTime) -> Self {
        Self::Valid(at)
    }
}

impl fmt::Display for PriorityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(at) => write!(f, "{}", at.format(PRIORITY_DISPLAY_FORMAT)),
            Self::Invalid => f.write_str("invalid time"),
        }
    }
}

// ============================================================================
// Requests and Preservations
// ============================================================================

/// A ticket request from the waiting list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Position in the waiting list (allocation time)
    pub priority: PriorityKey,
    /// Member who filed the request
    pub member_name: String,
    /// Name the seats are issued to
    pub holder_name: String,
    /// Number of seats needed, all in one block
    pub party_size: NonZeroU32,
    /// How the tickets are collected
    pub pickup_method: String,
    /// Row in the source file, for tracing a request back to its input
    pub source_row: Option<usize>,
}

impl Request {
    /// Creates a new `Request` with empty display fields
    #[must_use]
    pub fn new(priority: PriorityKey, holder_name: impl Into<String>, party_size: NonZeroU32) -> Self {
        Self {
            priority,
            member_name: String::new(),
            holder_name: holder_name.into(),
            party_size,
            pickup_method: String::new(),
            source_row: None,
        }
    }

    /// Sets the member name
    #[must_use]
    pub fn with_member_name(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = member_name.into();
        self
    }

    /// Sets the pickup method
    #[must_use]
    pub fn with_pickup_method(mut self, pickup_method: impl Into<String>) -> Self {
        self.pickup_method = pickup_method.into();
        self
    }

    /// Sets the source row
    #[must_use]
    pub fn with_source_row(mut self, row: usize) -> Self {
        self.source_row = Some(row);
        self
    }

    /// Number of seats as a `usize`
    #[must_use]
    pub fn seats(&self) -> usize {
        usize::try_from(self.party_size.get()).unwrap_or(usize::MAX)
    }
}

/// A seat committed to a holder outside the waiting list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservedBinding {
    /// Block the seat belongs to
    pub block: BlockName,
    /// Preserved seat
    pub seat: SeatId,
    /// Name the seat is issued to
    pub holder_name: String,
    /// Member name, if known
    pub member_name: String,
    /// How the ticket is collected
    pub pickup_method: String,
    /// Allocation time of the request this seat was preserved for
    pub priority: Option<PriorityKey>,
}

impl PreservedBinding {
    /// Creates a new `PreservedBinding` without an original allocation time
    #[must_use]
    pub fn new(block: BlockName, seat: SeatId, holder_name: impl Into<String>) -> Self {
        Self {
            block,
            seat,
            holder_name: holder_name.into(),
            member_name: String::new(),
            pickup_method: String::new(),
            priority: None,
        }
    }

    /// Sets the original allocation time
    #[must_use]
    pub fn with_priority(mut self, priority: PriorityKey) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the member name
    #[must_use]
    pub fn with_member_name(mut self, member_name: impl Into<String>) -> Self {
        self.member_name = member_name.into();
        self
    }

    /// Sets the pickup method
    #[must_use]
    pub fn with_pickup_method(mut self, pickup_method: impl Into<String>) -> Self {
        self.pickup_method = pickup_method.into();
        self
    }
}

// ============================================================================
// Assignments
// ============================================================================

/// Where an assignment came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOrigin {
    /// Seated by the allocation engine
    New,
    /// Carried over from a preserved binding
    Preserved,
}

impl fmt::Display for AssignmentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::Preserved => f.write_str("preserved"),
        }
    }
}

/// One seat bound to one holder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned seat
    pub seat: SeatId,
    /// Block of the seat
    pub block: BlockName,
    /// Member who filed the request
    pub member_name: String,
    /// Name the seat is issued to
    pub holder_name: String,
    /// How the ticket is collected
    pub pickup_method: String,
    /// Allocation time of the originating request
    pub priority: Option<PriorityKey>,
    /// New or preserved
    pub origin: AssignmentOrigin,
}

impl Assignment {
    /// Builds the assignment of `seat` in `block` to a request
    #[must_use]
    pub fn for_request(request: &Request, block: BlockName, seat: SeatId) -> Self {
        Self {
            seat,
            block,
            member_name: request.member_name.clone(),
            holder_name: request.holder_name.clone(),
            pickup_method: request.pickup_method.clone(),
            priority: Some(request.priority),
            origin: AssignmentOrigin::New,
        }
    }

    /// Builds the assignment recorded for a preserved binding
    #[must_use]
    pub fn preserved(binding: &PreservedBinding) -> Self {
        Self {
            seat: binding.seat.clone(),
            block: binding.block,
            member_name: binding.member_name.clone(),
            holder_name: binding.holder_name.clone(),
            pickup_method: binding.pickup_method.clone(),
            priority: binding.priority,
            origin: AssignmentOrigin::Preserved,
        }
    }
}

/// Why a preserved seat could not be taken out of the inventory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
    /// The claimed block is not in the inventory
    UnknownBlock,
    /// The block exists but the seat is not available in it
    SeatNotAvailable,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlock => f.write_str("block not in inventory"),
            Self::SeatNotAvailable => f.write_str("seat not available in block"),
        }
    }
}

/// A preserved binding whose seat was not found where it was claimed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedPreservation {
    /// The binding as loaded
    pub binding: PreservedBinding,
    /// What was wrong
    pub reason: MissingReason,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> PriorityKey {
        PriorityKey::Valid(
            NaiveDate::from_ymd_opt(2025, 5, 14)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_block_name_parses_trailing_number() {
        assert_eq!(BlockName::parse("block-3").unwrap(), BlockName::new(3));
        assert_eq!(BlockName::parse("Block 12").unwrap(), BlockName::new(12));
        assert_eq!(BlockName::parse(" B-07 ").unwrap(), BlockName::new(7));
        assert!(BlockName::parse("balcony").is_err());
        assert!(BlockName::parse("block-").is_err());
        assert!(BlockName::parse("N/A (Unassigned)").is_err());
    }

    #[test]
    fn test_block_names_order_numerically() {
        let mut blocks = vec![
            BlockName::parse("block-10").unwrap(),
            BlockName::parse("block-2").unwrap(),
            BlockName::parse("block-1").unwrap(),
        ];
        blocks.sort();
        assert_eq!(
            blocks.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["block-1", "block-2", "block-10"]
        );
        assert_eq!(blocks[2].display_name(), "Block 10");
    }

    #[test]
    fn test_block_name_serializes_canonically() {
        let json = serde_json::to_string(&BlockName::new(4)).unwrap();
        assert_eq!(json, "\"block-4\"");
        let parsed: BlockName = serde_json::from_str("\"Block 4\"").unwrap();
        assert_eq!(parsed, BlockName::new(4));
    }

    #[test]
    fn test_invalid_priority_sorts_last() {
        let mut keys = vec![PriorityKey::Invalid, at(18), at(9)];
        keys.sort();
        assert_eq!(keys, vec![at(9), at(18), PriorityKey::Invalid]);
    }

    #[test]
    fn test_invalid_priority_never_matches() {
        assert!(at(9).matches(&at(9)));
        assert!(!at(9).matches(&at(10)));
        assert!(!PriorityKey::Invalid.matches(&PriorityKey::Invalid));
        assert!(!PriorityKey::Invalid.matches(&at(9)));
        assert!(!at(9).matches(&PriorityKey::Invalid));
    }

    #[test]
    fn test_priority_export_text() {
        assert_eq!(at(17).export_text(), "2025/05/14 17:00:00");
        assert_eq!(PriorityKey::Invalid.export_text(), "");
    }

    #[test]
    fn test_assignment_for_request_copies_display_fields() {
        let request = Request::new(at(9), "Lin", NonZeroU32::new(2).unwrap())
            .with_member_name("Chen")
            .with_pickup_method("Counter");
        let assignment = Assignment::for_request(&request, BlockName::new(1), SeatId::new("A1"));
        assert_eq!(assignment.holder_name, "Lin");
        assert_eq!(assignment.member_name, "Chen");
        assert_eq!(assignment.pickup_method, "Counter");
        assert_eq!(assignment.priority, Some(at(9)));
        assert_eq!(assignment.origin, AssignmentOrigin::New);
    }
}
