//! Time entry repository, including the running timer.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use tempo_core::types::truncate_to_millis;
use tempo_core::{ActivityId, EntryId, NewTimeEntry, TimeEntry, TimeRange, ValidationError};

use crate::convert::{instant_to_millis, millis_to_instant};
use crate::tags::{attach_tag, find_or_create};
use crate::{DbError, LiveQuery, Store, Table, decode_rows};

const TABLE: &str = "time_entries";

const ENTRY_COLUMNS: &str = "id, activity_id, start_ms, end_ms, note";

const ENTRY_TABLES: &[Table] = &[Table::TimeEntries];
const TAGGED_TABLES: &[Table] = &[Table::TimeEntries, Table::Tags, Table::TimeEntryTags];

/// Outcome of starting the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedTimer {
    /// The entry that was running before, now completed.
    pub stopped: Option<TimeEntry>,
    pub started: TimeEntry,
}

/// Reads and writes [`TimeEntry`] records.
#[derive(Debug, Clone)]
pub struct TimeEntryRepository {
    store: Store,
}

struct EntryRow {
    id: i64,
    activity_id: i64,
    start_ms: i64,
    end_ms: Option<i64>,
    note: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            activity_id: row.get(1)?,
            start_ms: row.get(2)?,
            end_ms: row.get(3)?,
            note: row.get(4)?,
        })
    }

    fn decode(self) -> Result<TimeEntry, DbError> {
        let id = self.id;
        let instant = |column: &'static str, millis: i64| {
            millis_to_instant(millis).ok_or_else(|| DbError::Corrupt {
                table: TABLE,
                id,
                column,
                value: millis.to_string(),
            })
        };
        let start = instant("start_ms", self.start_ms)?;
        let end = self.end_ms.map(|ms| instant("end_ms", ms)).transpose()?;
        Ok(TimeEntry {
            id: EntryId::new(self.id),
            activity_id: ActivityId::new(self.activity_id),
            start,
            end,
            note: self.note,
        })
    }
}

impl TimeEntryRepository {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stores an entry.
    ///
    /// Fails with [`DbError::MissingReference`] for an unknown activity and
    /// with [`DbError::Duplicate`] when inserting a second running entry.
    pub fn insert(&self, entry: &NewTimeEntry) -> Result<TimeEntry, DbError> {
        self.store.write(ENTRY_TABLES, |tx| insert_entry(tx, entry))
    }

    /// Stores an entry and links it to the named tags, creating missing tags.
    pub fn insert_tagged(&self, entry: &NewTimeEntry, tags: &[String]) -> Result<TimeEntry, DbError> {
        let tables = if tags.is_empty() { ENTRY_TABLES } else { TAGGED_TABLES };
        self.store.write(tables, |tx| {
            let stored = insert_entry(tx, entry)?;
            tag_entry(tx, stored.id, tags)?;
            Ok(stored)
        })
    }

    /// Overwrites an entry with its normalized fields.
    ///
    /// Returns the stored entry, or `None` when it does not exist.
    pub fn update(&self, entry: &TimeEntry) -> Result<Option<TimeEntry>, DbError> {
        let entry = entry.clone().normalized()?;
        self.store.write(ENTRY_TABLES, |tx| {
            let changed = tx
                .execute(
                    "UPDATE time_entries SET activity_id = ?, start_ms = ?, end_ms = ?, note = ?
                     WHERE id = ?",
                    params![
                        entry.activity_id.get(),
                        instant_to_millis(entry.start),
                        entry.end.map(instant_to_millis),
                        entry.note,
                        entry.id.get(),
                    ],
                )
                .map_err(|err| DbError::from_write(err, TABLE, &entry.id.to_string()))?;
            Ok((changed > 0).then(|| entry.clone()))
        })
    }

    /// Deletes an entry and its tag links.
    pub fn delete(&self, id: EntryId) -> Result<bool, DbError> {
        self.store
            .write(&[Table::TimeEntries, Table::TimeEntryTags], |tx| {
                let deleted = tx.execute("DELETE FROM time_entries WHERE id = ?", [id.get()])?;
                Ok(deleted > 0)
            })
    }

    pub fn get(&self, id: EntryId) -> Result<Option<TimeEntry>, DbError> {
        self.store.read(|conn| {
            conn.query_row(
                &format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE id = ?"),
                [id.get()],
                EntryRow::from_row,
            )
            .optional()?
            .map(EntryRow::decode)
            .transpose()
        })
    }

    /// Entries overlapping the half-open `range`, oldest first.
    ///
    /// A running entry is included once it started before the range ends.
    pub fn list_between(&self, range: &TimeRange) -> Result<Vec<TimeEntry>, DbError> {
        self.store.read(|conn| list_between(conn, range))
    }

    /// Every entry of one activity, oldest first.
    pub fn list_for_activity(&self, activity: ActivityId) -> Result<Vec<TimeEntry>, DbError> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM time_entries
                 WHERE activity_id = ? ORDER BY start_ms ASC, id ASC"
            ))?;
            let rows = stmt.query_map([activity.get()], EntryRow::from_row)?;
            decode_rows(rows, EntryRow::decode)
        })
    }

    /// Every entry, oldest first.
    pub fn list_all(&self) -> Result<Vec<TimeEntry>, DbError> {
        self.store.read(list_all)
    }

    /// The running entry, if any.
    pub fn running(&self) -> Result<Option<TimeEntry>, DbError> {
        self.store.read(running)
    }

    /// Starts the timer, completing any entry that is still running.
    ///
    /// The previous entry is stopped at the new start, or at its own start
    /// when the new start lies before it. Both writes share one transaction.
    pub fn start(&self, entry: &NewTimeEntry, tags: &[String]) -> Result<StartedTimer, DbError> {
        let entry = NewTimeEntry::running(entry.activity_id, entry.start, entry.note.clone());
        let tables = if tags.is_empty() { ENTRY_TABLES } else { TAGGED_TABLES };
        self.store.write(tables, |tx| {
            let stopped = match running(tx)? {
                Some(previous) => {
                    let at = entry.start.max(previous.start);
                    Some(finish(tx, previous, at)?)
                }
                None => None,
            };
            let started = insert_entry(tx, &entry)?;
            tag_entry(tx, started.id, tags)?;
            tracing::debug!(entry = %started.id, activity = %started.activity_id, "started timer");
            Ok(StartedTimer { stopped, started })
        })
    }

    /// Stops the running entry at `at`.
    ///
    /// Returns `None` when nothing is running. Fails with
    /// [`DbError::Invalid`] when `at` lies before the entry's start.
    pub fn stop(&self, at: DateTime<Utc>) -> Result<Option<TimeEntry>, DbError> {
        let at = truncate_to_millis(at);
        self.store.write(ENTRY_TABLES, |tx| {
            running(tx)?
                .map(|entry| finish(tx, entry, at))
                .transpose()
        })
    }

    /// Observes entries overlapping `range`.
    pub fn watch_between(&self, range: TimeRange) -> Result<LiveQuery<Vec<TimeEntry>>, DbError> {
        LiveQuery::spawn(&self.store, ENTRY_TABLES, move |store| {
            store.read(|conn| list_between(conn, &range))
        })
    }

    /// Observes the running entry.
    pub fn watch_running(&self) -> Result<LiveQuery<Option<TimeEntry>>, DbError> {
        LiveQuery::spawn(&self.store, ENTRY_TABLES, |store| store.read(running))
    }
}

pub(crate) fn insert_entry(conn: &Connection, entry: &NewTimeEntry) -> Result<TimeEntry, DbError> {
    if let Some(end) = entry.end {
        if end < entry.start {
            return Err(ValidationError::EndBeforeStart {
                start: entry.start,
                end,
            }
            .into());
        }
    }
    conn.execute(
        "INSERT INTO time_entries (activity_id, start_ms, end_ms, note) VALUES (?, ?, ?, ?)",
        params![
            entry.activity_id.get(),
            instant_to_millis(entry.start),
            entry.end.map(instant_to_millis),
            entry.note,
        ],
    )
    .map_err(|err| {
        let value = if entry.end.is_none() { "running entry" } else { "entry" };
        DbError::from_write(err, TABLE, value)
    })?;
    Ok(entry
        .clone()
        .with_id(EntryId::new(conn.last_insert_rowid())))
}

fn tag_entry(conn: &Connection, entry: EntryId, tags: &[String]) -> Result<(), DbError> {
    for name in tags {
        let tag = find_or_create(conn, name)?;
        attach_tag(conn, entry, tag.id)?;
    }
    Ok(())
}

fn finish(conn: &Connection, mut entry: TimeEntry, at: DateTime<Utc>) -> Result<TimeEntry, DbError> {
    entry.end = Some(at);
    entry.validate()?;
    conn.execute(
        "UPDATE time_entries SET end_ms = ? WHERE id = ?",
        params![instant_to_millis(at), entry.id.get()],
    )?;
    Ok(entry)
}

fn running(conn: &Connection) -> Result<Option<TimeEntry>, DbError> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM time_entries WHERE end_ms IS NULL"),
        [],
        EntryRow::from_row,
    )
    .optional()?
    .map(EntryRow::decode)
    .transpose()
}

fn list_between(conn: &Connection, range: &TimeRange) -> Result<Vec<TimeEntry>, DbError> {
    // Zero-length entries count when they sit inside the range.
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries
         WHERE start_ms < ?2 AND (end_ms IS NULL OR end_ms > ?1 OR start_ms >= ?1)
         ORDER BY start_ms ASC, id ASC"
    ))?;
    let rows = stmt.query_map(
        params![
            instant_to_millis(range.start()),
            instant_to_millis(range.end())
        ],
        EntryRow::from_row,
    )?;
    decode_rows(rows, EntryRow::decode)
}

pub(crate) fn list_all(conn: &Connection) -> Result<Vec<TimeEntry>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM time_entries ORDER BY start_ms ASC, id ASC"
    ))?;
    let rows = stmt.query_map([], EntryRow::from_row)?;
    decode_rows(rows, EntryRow::decode)
}
