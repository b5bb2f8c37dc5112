//! Core types of Notewell.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};

/// ID of notes.
///
/// Assigned by the remote store on creation and unique across a store.
/// The local cache keys everything by [`NoteId`] and never holds two entries
/// with the same id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Clone, Copy, Hash)]
#[serde(transparent)]
pub struct NoteId(i64);

impl From<i64> for NoteId {
    fn from(id: i64) -> NoteId {
        NoteId(id)
    }
}

impl From<NoteId> for i64 {
    fn from(id: NoteId) -> i64 {
        id.0
    }
}

impl NoteId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user owning a set of notes.
///
/// Every gateway operation and change subscription is scoped to one owner.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Hash)]
#[serde(into = "String", from = "String")]
pub struct OwnerId {
    id: String,
}

impl OwnerId {
    pub fn new(id: String) -> Self {
        OwnerId { id }
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> String {
        id.id
    }
}

impl From<String> for OwnerId {
    fn from(id: String) -> OwnerId {
        OwnerId::new(id)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> OwnerId {
        OwnerId::new(id.to_owned())
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.id
    }
}

/// A note: one node of an owner's forest.
///
/// `parent_id` is self-referential; `None` marks a root note. `content` holds
/// a serialized rich-text document that this crate treats as an opaque blob:
/// whatever the editor handed over is stored and later handed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: OwnerId,
    pub parent_id: Option<NoteId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Title for display purposes. Absent or empty titles render as a
    /// placeholder rather than an empty string.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => "Untitled",
        }
    }
}

/// Canonical sibling order: newest first, ids descending on equal timestamps
/// so that the order is total.
pub(crate) fn newest_first(a: &Note, b: &Note) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
