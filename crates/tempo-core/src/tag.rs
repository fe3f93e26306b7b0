//! Tags and their links to time entries.

use serde::{Deserialize, Serialize};

use crate::types::{EntryId, TagId};

/// A free-form label attached to time entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// A row of the entry/tag cross-reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeEntryTag {
    pub entry_id: EntryId,
    pub tag_id: TagId,
}
