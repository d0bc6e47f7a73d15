//! Workflow status and its canonical normalization.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Workflow stage of a ticket. Each variant is one board column.
///
/// Raw status strings coming from the backend are normalized exactly once,
/// when a ticket is decoded: lower-cased, all whitespace removed, and
/// matched against the column ids. Anything else lands in `Todo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketStatus {
    #[default]
    Todo,
    InProcess,
    InReview,
    Done,
    OnHold,
    Suggestion,
}

impl TicketStatus {
    /// All statuses in board column order.
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Todo,
        TicketStatus::InProcess,
        TicketStatus::InReview,
        TicketStatus::Done,
        TicketStatus::OnHold,
        TicketStatus::Suggestion,
    ];

    /// Normalize a raw status string, falling back to `Todo`.
    pub fn normalize(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Self::from_column_id(&key).unwrap_or_default()
    }

    /// Exact lookup by column id (`todo`, `inprocess`, ...).
    pub fn from_column_id(id: &str) -> Option<Self> {
        match id {
            "todo" => Some(TicketStatus::Todo),
            "inprocess" => Some(TicketStatus::InProcess),
            "inreview" => Some(TicketStatus::InReview),
            "done" => Some(TicketStatus::Done),
            "onhold" => Some(TicketStatus::OnHold),
            "suggestion" => Some(TicketStatus::Suggestion),
            _ => None,
        }
    }

    /// Column id used as the partition key.
    pub fn column_id(&self) -> &'static str {
        match self {
            TicketStatus::Todo => "todo",
            TicketStatus::InProcess => "inprocess",
            TicketStatus::InReview => "inreview",
            TicketStatus::Done => "done",
            TicketStatus::OnHold => "onhold",
            TicketStatus::Suggestion => "suggestion",
        }
    }

    /// Human-readable label, also the form sent back to the backend.
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Todo => "To Do",
            TicketStatus::InProcess => "In Process",
            TicketStatus::InReview => "In Review",
            TicketStatus::Done => "Done",
            TicketStatus::OnHold => "On Hold",
            TicketStatus::Suggestion => "Suggestion",
        }
    }

    /// Position of this status in column order.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TicketStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl Serialize for TicketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TicketStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::normalize).unwrap_or_default())
    }
}
