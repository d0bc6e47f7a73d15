//! Core ticket data types.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TicketStatus;

// ============================================================================
// Identifiers
// ============================================================================

/// Wire form of an id: the backend emits integers, but ids are opaque to us.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// Compares by its text; the wire form (number or string) is kept only
        /// so the id is sent back exactly as it was received.
        #[derive(Debug, Clone)]
        pub struct $name {
            text: String,
            numeric: bool,
        }

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    text: id.into(),
                    numeric: false,
                }
            }

            pub fn as_str(&self) -> &str {
                &self.text
            }

            /// Whether the backend sent this id as a JSON number.
            pub fn is_numeric(&self) -> bool {
                self.numeric
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.text == other.text
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.text.hash(state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.text.cmp(&other.text)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.text)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self {
                    text: id.to_string(),
                    numeric: true,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.text.parse::<i64>() {
                    Ok(n) if self.numeric => serializer.serialize_i64(n),
                    _ => serializer.serialize_str(&self.text),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Int(n) => Self::from(n),
                    RawId::Text(s) => Self::new(s),
                })
            }
        }
    };
}

opaque_id!(
    /// Stable ticket identifier, unique within a collection.
    TicketId
);

opaque_id!(
    /// Attachment identifier.
    AttachmentId
);

// ============================================================================
// Ticket
// ============================================================================

/// Snapshot of a ticket as returned by the backend.
///
/// The client never mutates a ticket in place; every fetch replaces the
/// previous snapshot wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTicket")]
pub struct Ticket {
    pub id: TicketId,
    /// Short display string.
    pub summary: String,
    /// Normalized workflow status.
    pub status: TicketStatus,
    /// Classification, e.g. "Task" or "Bug".
    pub work_type: String,
    pub game_name: String,
    pub project: String,
    pub team: String,
    /// Assignee user id. Display names are resolved through a `UserDirectory`.
    pub assignee: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Attachments in backend order; may repeat filenames.
    pub attachments: Vec<Attachment>,
}

/// Ticket as it appears on the wire.
///
/// Some fields arrive under several keys, sometimes more than one at once.
/// Each key gets its own slot and the camelCase one wins when non-empty.
#[derive(Deserialize)]
struct RawTicket {
    id: TicketId,
    #[serde(default, deserialize_with = "lenient_string")]
    summary: String,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default, rename = "workType", deserialize_with = "lenient_string")]
    work_type: String,
    #[serde(default, rename = "work_type", deserialize_with = "lenient_string")]
    work_type_snake: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    work_type_short: String,
    #[serde(default, rename = "gameName", deserialize_with = "lenient_string")]
    game_name: String,
    #[serde(default, rename = "game_name", deserialize_with = "lenient_string")]
    game_name_snake: String,
    #[serde(default, rename = "game", deserialize_with = "lenient_string")]
    game_name_short: String,
    #[serde(default, deserialize_with = "lenient_string")]
    project: String,
    #[serde(default, deserialize_with = "lenient_string")]
    team: String,
    #[serde(default, deserialize_with = "lenient_string")]
    assignee: String,
    #[serde(default, deserialize_with = "lenient_string")]
    description: String,
    #[serde(default, rename = "createdAt", deserialize_with = "lenient_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "created_at", deserialize_with = "lenient_timestamp")]
    created_at_snake: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    attachments: Vec<Attachment>,
}

/// First non-empty value in key priority order.
fn first_non_empty(candidates: [String; 3]) -> String {
    candidates
        .into_iter()
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

impl From<RawTicket> for Ticket {
    fn from(raw: RawTicket) -> Self {
        Self {
            id: raw.id,
            summary: raw.summary,
            status: raw.status,
            work_type: first_non_empty([raw.work_type, raw.work_type_snake, raw.work_type_short]),
            game_name: first_non_empty([raw.game_name, raw.game_name_snake, raw.game_name_short]),
            project: raw.project,
            team: raw.team,
            assignee: raw.assignee,
            description: raw.description,
            created_at: raw.created_at.or(raw.created_at_snake),
            attachments: raw.attachments,
        }
    }
}

impl Ticket {
    /// Create a ticket with only an id and summary set.
    pub fn new(id: impl Into<TicketId>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            status: TicketStatus::Todo,
            work_type: String::new(),
            game_name: String::new(),
            project: String::new(),
            team: String::new(),
            assignee: String::new(),
            description: String::new(),
            created_at: None,
            attachments: Vec::new(),
        }
    }

    /// Attachments with duplicate filenames removed (first occurrence wins).
    pub fn unique_attachments(&self) -> Vec<&Attachment> {
        unique_attachments(&self.attachments)
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// File extensions rendered inline as images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// A file associated with a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
}

impl Attachment {
    pub fn new(id: impl Into<AttachmentId>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }

    /// Lower-cased extension, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }

    /// Whether the attachment should be previewed as an image.
    pub fn is_image(&self) -> bool {
        self.extension()
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }
}

/// De-duplicate attachments by filename, keeping the first occurrence.
pub fn unique_attachments(attachments: &[Attachment]) -> Vec<&Attachment> {
    let mut seen: HashSet<&str> = HashSet::new();
    attachments
        .iter()
        .filter(|a| seen.insert(a.filename.as_str()))
        .collect()
}

// ============================================================================
// Lenient decoding helpers
// ============================================================================

/// Decode strings that may be missing, null, or numeric.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse RFC 3339, falling back to a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
