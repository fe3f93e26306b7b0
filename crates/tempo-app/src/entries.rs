//! Time entry and timer use cases.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tempo_core::{ActivityId, EntryId, NewTimeEntry, Tag, TimeEntry, TimeRange};
use tempo_db::{StartedTimer, Store};

use crate::{Tempo, UseCaseError};

/// A completed entry to log after the fact.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub activity_id: ActivityId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub note: Option<String>,
    /// Tag names; unknown tags are created.
    pub tags: Vec<String>,
}

/// A timer to start.
#[derive(Debug, Clone)]
pub struct StartTimer {
    pub activity_id: ActivityId,
    pub at: DateTime<Utc>,
    pub note: Option<String>,
    pub tags: Vec<String>,
}

/// An entry with its tags, as listed to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedEntry {
    #[serde(flatten)]
    pub entry: TimeEntry,
    pub tags: Vec<Tag>,
}

fn require_activity(store: &Store, id: ActivityId) -> Result<(), UseCaseError> {
    match store.activities().get(id)? {
        Some(_) => Ok(()),
        None => Err(UseCaseError::not_found("activity", id)),
    }
}

impl Tempo {
    pub async fn log_entry(&self, request: LogEntry) -> Result<TimeEntry, UseCaseError> {
        self.run("log_entry", move |store| {
            require_activity(store, request.activity_id)?;
            let new = NewTimeEntry::completed(
                request.activity_id,
                request.start,
                request.end,
                request.note,
            )?;
            Ok(store.entries().insert_tagged(&new, &request.tags)?)
        })
        .await
    }

    /// Starts a timer, stopping the one already running.
    pub async fn start_timer(&self, request: StartTimer) -> Result<StartedTimer, UseCaseError> {
        self.run("start_timer", move |store| {
            require_activity(store, request.activity_id)?;
            let new = NewTimeEntry::running(request.activity_id, request.at, request.note);
            Ok(store.entries().start(&new, &request.tags)?)
        })
        .await
    }

    /// Stops the running timer at `at`.
    pub async fn stop_timer(&self, at: DateTime<Utc>) -> Result<TimeEntry, UseCaseError> {
        self.run("stop_timer", move |store| {
            store
                .entries()
                .stop(at)?
                .ok_or(UseCaseError::NoRunningTimer)
        })
        .await
    }

    pub async fn running_entry(&self) -> Result<Option<TimeEntry>, UseCaseError> {
        self.run("running_entry", |store| Ok(store.entries().running()?))
            .await
    }

    /// Replaces an entry's fields and returns the entry as stored.
    pub async fn edit_entry(&self, entry: TimeEntry) -> Result<TimeEntry, UseCaseError> {
        self.run("edit_entry", move |store| {
            require_activity(store, entry.activity_id)?;
            store
                .entries()
                .update(&entry)?
                .ok_or_else(|| UseCaseError::not_found("entry", entry.id))
        })
        .await
    }

    pub async fn delete_entry(&self, id: EntryId) -> Result<(), UseCaseError> {
        self.run("delete_entry", move |store| {
            if store.entries().delete(id)? {
                Ok(())
            } else {
                Err(UseCaseError::not_found("entry", id))
            }
        })
        .await
    }

    pub async fn get_entry(&self, id: EntryId) -> Result<TimeEntry, UseCaseError> {
        self.run("get_entry", move |store| {
            store
                .entries()
                .get(id)?
                .ok_or_else(|| UseCaseError::not_found("entry", id))
        })
        .await
    }

    /// Entries overlapping `range` with their tags, oldest first.
    pub async fn list_entries(&self, range: TimeRange) -> Result<Vec<TaggedEntry>, UseCaseError> {
        self.run("list_entries", move |store| {
            let entries = store.entries().list_between(&range)?;
            let mut tags = store.tags().tags_by_entry()?;
            Ok(entries
                .into_iter()
                .map(|entry| TaggedEntry {
                    tags: tags.remove(&entry.id).unwrap_or_default(),
                    entry,
                })
                .collect())
        })
        .await
    }
}
