//! Activity type repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use tempo_core::{ActivityId, ActivityType, Color, NewActivity};

use crate::{DbError, LiveQuery, Store, Table, decode_rows};

const TABLE: &str = "activity_types";

/// Tables touched when an activity is deleted (cascade included).
const CASCADE: &[Table] = &[
    Table::ActivityTypes,
    Table::TimeEntries,
    Table::TimeEntryTags,
    Table::Goals,
];

/// Reads and writes [`ActivityType`] records.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    store: Store,
}

struct ActivityRow {
    id: i64,
    name: String,
    color: String,
}

impl ActivityRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
        })
    }

    fn decode(self) -> Result<ActivityType, DbError> {
        let color = Color::parse(&self.color).map_err(|_| DbError::Corrupt {
            table: TABLE,
            id: self.id,
            column: "color",
            value: self.color.clone(),
        })?;
        Ok(ActivityType {
            id: ActivityId::new(self.id),
            name: self.name,
            color,
        })
    }
}

impl ActivityRepository {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stores a new activity type.
    ///
    /// Fails with [`DbError::Duplicate`] when the name is taken.
    pub fn insert(&self, activity: &NewActivity) -> Result<ActivityType, DbError> {
        self.store.write(&[Table::ActivityTypes], |tx| {
            insert_activity(tx, activity)
        })
    }

    /// Overwrites the name and color of an existing activity.
    ///
    /// Returns the stored activity with its name trimmed, or `None` when no
    /// activity has that id.
    pub fn update(&self, activity: &ActivityType) -> Result<Option<ActivityType>, DbError> {
        let activity = activity.clone().normalized()?;
        self.store.write(&[Table::ActivityTypes], |tx| {
            let changed = tx
                .execute(
                    "UPDATE activity_types SET name = ?, color = ? WHERE id = ?",
                    params![activity.name, activity.color.as_str(), activity.id.get()],
                )
                .map_err(|err| DbError::from_write(err, TABLE, &activity.name))?;
            Ok((changed > 0).then(|| activity.clone()))
        })
    }

    /// Deletes an activity together with its entries, their tag links and its goals.
    pub fn delete(&self, id: ActivityId) -> Result<bool, DbError> {
        self.store.write(CASCADE, |tx| {
            let deleted = tx.execute("DELETE FROM activity_types WHERE id = ?", [id.get()])?;
            Ok(deleted > 0)
        })
    }

    pub fn get(&self, id: ActivityId) -> Result<Option<ActivityType>, DbError> {
        self.store.read(|conn| {
            conn.query_row(
                "SELECT id, name, color FROM activity_types WHERE id = ?",
                [id.get()],
                ActivityRow::from_row,
            )
            .optional()?
            .map(ActivityRow::decode)
            .transpose()
        })
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<ActivityType>, DbError> {
        self.store.read(|conn| {
            conn.query_row(
                "SELECT id, name, color FROM activity_types WHERE name = ?",
                [name.trim()],
                ActivityRow::from_row,
            )
            .optional()?
            .map(ActivityRow::decode)
            .transpose()
        })
    }

    /// Lists all activity types ordered by name.
    pub fn list(&self) -> Result<Vec<ActivityType>, DbError> {
        self.store.read(list_activities)
    }

    /// Observes the full activity list.
    pub fn watch_all(&self) -> Result<LiveQuery<Vec<ActivityType>>, DbError> {
        LiveQuery::spawn(&self.store, &[Table::ActivityTypes], |store| {
            store.read(list_activities)
        })
    }
}

pub(crate) fn insert_activity(
    conn: &Connection,
    activity: &NewActivity,
) -> Result<ActivityType, DbError> {
    conn.execute(
        "INSERT INTO activity_types (name, color) VALUES (?, ?)",
        params![activity.name, activity.color.as_str()],
    )
    .map_err(|err| DbError::from_write(err, TABLE, &activity.name))?;
    Ok(activity
        .clone()
        .with_id(ActivityId::new(conn.last_insert_rowid())))
}

pub(crate) fn list_activities(conn: &Connection) -> Result<Vec<ActivityType>, DbError> {
    let mut stmt = conn.prepare("SELECT id, name, color FROM activity_types ORDER BY name ASC")?;
    let rows = stmt.query_map([], ActivityRow::from_row)?;
    decode_rows(rows, ActivityRow::decode)
}
