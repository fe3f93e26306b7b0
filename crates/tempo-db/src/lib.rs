//! Storage layer for the tempo time tracker.
//!
//! Provides persistence for activity types, time entries, tags and goals
//! using `rusqlite`, plus one repository per entity family.
//!
//! # Lifecycle
//!
//! A [`Store`] is constructed once at startup with [`Store::open`] and cloned
//! into every repository. Clones share a single connection behind a mutex,
//! which serializes writes. [`Store::close`] tears the connection down once
//! every other handle (repositories, live queries) has been dropped.
//!
//! # Change notification
//!
//! Every committed write publishes the tables it touched on a broadcast
//! channel (see [`Store::subscribe`]). [`LiveQuery`] builds observable views
//! on top of it.
//!
//! # Schema
//!
//! See [`schema`] for the table layout and versioning. Instants are stored as
//! epoch milliseconds, dates as ISO strings and enumerations by name; the
//! [`convert`] module holds the mappings.
//!
//! Rows whose stored values no longer decode (for example a goal type written
//! by a newer build) are skipped with a warning by list queries and reported
//! as [`DbError::Corrupt`] by single-record lookups.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, ErrorCode, Transaction, ffi};
use thiserror::Error;
use tokio::sync::broadcast;

use tempo_core::ValidationError;

mod activities;
pub mod convert;
mod entries;
mod goals;
mod live;
pub mod schema;
mod snapshot;
mod tags;

pub use activities::ActivityRepository;
pub use entries::{StartedTimer, TimeEntryRepository};
pub use goals::GoalRepository;
pub use live::LiveQuery;
pub use schema::{SCHEMA_VERSION, schema_sql};
pub use snapshot::{RestoreStats, Snapshot, SnapshotEntry};
pub use tags::TagRepository;

/// Capacity of the change-notification channel.
///
/// Subscribers that fall further behind observe a lag and re-query.
const CHANGE_CAPACITY: usize = 256;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The database was written by a newer schema version.
    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: i64, supported: i64 },
    /// A unique name or key is already taken.
    #[error("{table} already contains {value:?}")]
    Duplicate { table: &'static str, value: String },
    /// A row references a record that does not exist.
    #[error("{table} row references a missing record")]
    MissingReference { table: &'static str },
    /// A stored value no longer decodes into its domain type.
    #[error("corrupt {column} in {table} row {id}: {value:?}")]
    Corrupt {
        table: &'static str,
        id: i64,
        column: &'static str,
        value: String,
    },
    /// A record failed domain validation before being written.
    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),
    /// `close` was called while other handles were still alive.
    #[error("store is still shared by {handles} other handle(s)")]
    InUse { handles: usize },
    /// A live query was requested outside a Tokio runtime.
    #[error("live queries require a Tokio runtime")]
    NoRuntime,
}

impl DbError {
    /// Maps constraint violations on `table` to specific variants.
    pub(crate) fn from_write(err: rusqlite::Error, table: &'static str, value: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::Duplicate {
                            table,
                            value: value.to_string(),
                        };
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::MissingReference { table },
                    _ => {}
                }
            }
        }
        Self::Sqlite(err)
    }
}

/// Tables that publish change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    ActivityTypes,
    TimeEntries,
    Tags,
    TimeEntryTags,
    Goals,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActivityTypes => "activity_types",
            Self::TimeEntries => "time_entries",
            Self::Tags => "tags",
            Self::TimeEntryTags => "time_entry_tags",
            Self::Goals => "goals",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared handle to the database.
///
/// Cheap to clone; all clones use the same connection.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<Table>,
    location: String,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.inner.location)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is migrated to [`SCHEMA_VERSION`] on open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::init(conn, path.display().to_string())
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the last handle drops.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(mut conn: Connection, location: String) -> Result<Self, DbError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::migrate(&mut conn)?;
        tracing::debug!(%location, version = SCHEMA_VERSION, "opened store");
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                changes,
                location,
            }),
        })
    }

    /// Closes the connection.
    ///
    /// Fails with [`DbError::InUse`] while repositories or live queries still
    /// hold clones of this store. Those clones stay usable in that case.
    pub fn close(self) -> Result<(), DbError> {
        let inner = Arc::try_unwrap(self.inner).map_err(|inner| DbError::InUse {
            handles: Arc::strong_count(&inner) - 1,
        })?;
        let conn = inner
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        tracing::debug!(location = %inner.location, "closed store");
        Ok(())
    }

    /// Where the database lives (`:memory:` for in-memory stores).
    pub fn location(&self) -> &str {
        &self.inner.location
    }

    /// The schema version recorded in the database.
    pub fn schema_version(&self) -> Result<i64, DbError> {
        self.read(schema::schema_version)
    }

    /// Subscribes to table change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.inner.changes.subscribe()
    }

    pub fn activities(&self) -> ActivityRepository {
        ActivityRepository::new(self.clone())
    }

    pub fn entries(&self) -> TimeEntryRepository {
        TimeEntryRepository::new(self.clone())
    }

    pub fn tags(&self) -> TagRepository {
        TagRepository::new(self.clone())
    }

    pub fn goals(&self) -> GoalRepository {
        GoalRepository::new(self.clone())
    }

    /// Runs `f` against the connection.
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let conn = self.lock();
        f(&conn)
    }

    /// Runs `f` in a transaction and announces `tables` once it commits.
    pub(crate) fn write<T>(
        &self,
        tables: &[Table],
        f: impl FnOnce(&Transaction<'_>) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let value = {
            let mut conn = self.lock();
            let tx = conn.transaction()?;
            let value = f(&tx)?;
            tx.commit()?;
            value
        };
        for table in tables {
            // No subscribers is fine.
            let _ = self.inner.changes.send(*table);
        }
        Ok(value)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-write rolls its transaction back on drop, so the
        // connection is still consistent after poisoning.
        self.inner
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Decodes raw rows, skipping rows whose stored values no longer decode.
pub(crate) fn decode_rows<R, T>(
    rows: impl Iterator<Item = rusqlite::Result<R>>,
    decode: impl Fn(R) -> Result<T, DbError>,
) -> Result<Vec<T>, DbError> {
    let mut decoded = Vec::new();
    for row in rows {
        match decode(row?) {
            Ok(value) => decoded.push(value),
            Err(DbError::Corrupt {
                table,
                id,
                column,
                value,
            }) => {
                tracing::warn!(table, id, column, value = %value, "skipping row that no longer decodes");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(decoded)
}
