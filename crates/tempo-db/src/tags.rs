//! Tag repository and entry/tag links.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, params};

use tempo_core::types::validate_name;
use tempo_core::{EntryId, Tag, TagId};

use crate::{DbError, LiveQuery, Store, Table};

const TABLE: &str = "tags";
const LINK_TABLE: &str = "time_entry_tags";

/// Reads and writes [`Tag`] records and their links to time entries.
#[derive(Debug, Clone)]
pub struct TagRepository {
    store: Store,
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: TagId::new(row.get(0)?),
        name: row.get(1)?,
    })
}

impl TagRepository {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a tag. Fails with [`DbError::Duplicate`] when the name exists.
    pub fn insert(&self, name: &str) -> Result<Tag, DbError> {
        let name = validate_name("tag name", name)?;
        self.store.write(&[Table::Tags], |tx| insert_tag(tx, &name))
    }

    /// Renames a tag; `false` when it does not exist.
    pub fn rename(&self, id: TagId, name: &str) -> Result<bool, DbError> {
        let name = validate_name("tag name", name)?;
        self.store.write(&[Table::Tags], |tx| {
            let changed = tx
                .execute(
                    "UPDATE tags SET name = ? WHERE id = ?",
                    params![name, id.get()],
                )
                .map_err(|err| DbError::from_write(err, TABLE, &name))?;
            Ok(changed > 0)
        })
    }

    /// Deletes a tag and its links.
    pub fn delete(&self, id: TagId) -> Result<bool, DbError> {
        self.store
            .write(&[Table::Tags, Table::TimeEntryTags], |tx| {
                let deleted = tx.execute("DELETE FROM tags WHERE id = ?", [id.get()])?;
                Ok(deleted > 0)
            })
    }

    pub fn get(&self, id: TagId) -> Result<Option<Tag>, DbError> {
        self.store.read(|conn| {
            Ok(conn
                .query_row(
                    "SELECT id, name FROM tags WHERE id = ?",
                    [id.get()],
                    tag_from_row,
                )
                .optional()?)
        })
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Tag>, DbError> {
        self.store
            .read(|conn| find_tag(conn, name.trim()))
    }

    /// Lists all tags ordered by name.
    pub fn list(&self) -> Result<Vec<Tag>, DbError> {
        self.store.read(list_tags)
    }

    /// Links a tag to an entry.
    ///
    /// Returns `false` when the link already existed. Fails with
    /// [`DbError::MissingReference`] when either side does not exist.
    pub fn attach(&self, entry: EntryId, tag: TagId) -> Result<bool, DbError> {
        self.store.write(&[Table::TimeEntryTags], |tx| attach_tag(tx, entry, tag))
    }

    /// Removes a link; `false` when there was none.
    pub fn detach(&self, entry: EntryId, tag: TagId) -> Result<bool, DbError> {
        self.store.write(&[Table::TimeEntryTags], |tx| {
            let deleted = tx.execute(
                "DELETE FROM time_entry_tags WHERE entry_id = ? AND tag_id = ?",
                params![entry.get(), tag.get()],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Tags linked to an entry, ordered by name.
    pub fn tags_for_entry(&self, entry: EntryId) -> Result<Vec<Tag>, DbError> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.name FROM tags t
                 JOIN time_entry_tags l ON l.tag_id = t.id
                 WHERE l.entry_id = ?
                 ORDER BY t.name ASC",
            )?;
            let tags = stmt
                .query_map([entry.get()], tag_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tags)
        })
    }

    /// Entries carrying a tag, oldest id first.
    pub fn entries_for_tag(&self, tag: TagId) -> Result<Vec<EntryId>, DbError> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT entry_id FROM time_entry_tags WHERE tag_id = ? ORDER BY entry_id ASC",
            )?;
            let ids = stmt
                .query_map([tag.get()], |row| row.get(0).map(EntryId::new))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Tag names for every tagged entry, in one query.
    pub fn tags_by_entry(&self) -> Result<HashMap<EntryId, Vec<Tag>>, DbError> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.entry_id, t.id, t.name FROM time_entry_tags l
                 JOIN tags t ON t.id = l.tag_id
                 ORDER BY l.entry_id, t.name",
            )?;
            let mut rows = stmt.query([])?;
            let mut by_entry: HashMap<EntryId, Vec<Tag>> = HashMap::new();
            while let Some(row) = rows.next()? {
                let entry = EntryId::new(row.get(0)?);
                by_entry.entry(entry).or_default().push(Tag {
                    id: TagId::new(row.get(1)?),
                    name: row.get(2)?,
                });
            }
            Ok(by_entry)
        })
    }

    /// Observes the full tag list.
    pub fn watch_all(&self) -> Result<LiveQuery<Vec<Tag>>, DbError> {
        LiveQuery::spawn(&self.store, &[Table::Tags], |store| store.read(list_tags))
    }
}

pub(crate) fn insert_tag(conn: &Connection, name: &str) -> Result<Tag, DbError> {
    conn.execute("INSERT INTO tags (name) VALUES (?)", [name])
        .map_err(|err| DbError::from_write(err, TABLE, name))?;
    Ok(Tag {
        id: TagId::new(conn.last_insert_rowid()),
        name: name.to_string(),
    })
}

pub(crate) fn find_tag(conn: &Connection, name: &str) -> Result<Option<Tag>, DbError> {
    Ok(conn
        .query_row(
            "SELECT id, name FROM tags WHERE name = ?",
            [name],
            tag_from_row,
        )
        .optional()?)
}

pub(crate) fn list_tags(conn: &Connection) -> Result<Vec<Tag>, DbError> {
    let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name ASC")?;
    let tags = stmt
        .query_map([], tag_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Looks a tag up by name, creating it when missing.
pub(crate) fn find_or_create(conn: &Connection, name: &str) -> Result<Tag, DbError> {
    let name = validate_name("tag name", name)?;
    match find_tag(conn, &name)? {
        Some(tag) => Ok(tag),
        None => insert_tag(conn, &name),
    }
}

pub(crate) fn attach_tag(conn: &Connection, entry: EntryId, tag: TagId) -> Result<bool, DbError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO time_entry_tags (entry_id, tag_id) VALUES (?, ?)",
            params![entry.get(), tag.get()],
        )
        .map_err(|err| DbError::from_write(err, LINK_TABLE, &format!("{entry}/{tag}")))?;
    Ok(inserted > 0)
}
