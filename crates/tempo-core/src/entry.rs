//! Time entries: intervals of time spent on an activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::period::TimeRange;
use crate::types::{ActivityId, EntryId, ValidationError, normalize_note, truncate_to_millis};

/// A logged interval of time.
///
/// An entry without an `end` is the running timer. Completed entries always
/// satisfy `end >= start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: EntryId,
    pub activity_id: ActivityId,
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TimeEntry {
    /// Whether this entry is the running timer.
    pub const fn is_running(&self) -> bool {
        self.end.is_none()
    }

    /// Checks the ordering invariant after an in-place edit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_order(self.start, self.end)
    }

    /// Re-applies the constructor rules after an in-place edit: instants are
    /// truncated to milliseconds and a blank note becomes `None`.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let start = truncate_to_millis(self.start);
        let end = self.end.map(truncate_to_millis);
        check_order(start, end)?;
        Ok(Self {
            start,
            end,
            note: normalize_note(self.note),
            ..self
        })
    }

    /// Elapsed milliseconds, counting a running entry up to `now`.
    pub fn duration_ms(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end.unwrap_or(now);
        (end - self.start).num_milliseconds().max(0)
    }

    /// Milliseconds of this entry that fall inside `range`.
    pub fn overlap_ms(&self, range: &TimeRange, now: DateTime<Utc>) -> i64 {
        let end = self.end.unwrap_or(now);
        range.overlap_ms(self.start, end)
    }
}

/// A time entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub activity_id: ActivityId,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl NewTimeEntry {
    /// Creates a completed entry.
    pub fn completed(
        activity_id: ActivityId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<Self, ValidationError> {
        let start = truncate_to_millis(start);
        let end = truncate_to_millis(end);
        check_order(start, Some(end))?;
        Ok(Self {
            activity_id,
            start,
            end: Some(end),
            note: normalize_note(note),
        })
    }

    /// Creates a running entry starting at `start`.
    pub fn running(activity_id: ActivityId, start: DateTime<Utc>, note: Option<String>) -> Self {
        Self {
            activity_id,
            start: truncate_to_millis(start),
            end: None,
            note: normalize_note(note),
        }
    }

    /// Attaches the row id assigned by the store.
    #[must_use]
    pub fn with_id(self, id: EntryId) -> TimeEntry {
        TimeEntry {
            id,
            activity_id: self.activity_id,
            start: self.start,
            end: self.end,
            note: self.note,
        }
    }
}

fn check_order(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => Err(ValidationError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}
