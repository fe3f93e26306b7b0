//! Whole-store snapshots for backup and restore.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use tempo_core::{
    ActivityId, ActivityType, EntryId, Goal, NewActivity, NewGoal, NewTimeEntry, Tag, TagId,
    TimeEntry,
};

use crate::activities::{insert_activity, list_activities};
use crate::entries::{insert_entry, list_all};
use crate::goals::{insert_goal, list_goals};
use crate::tags::{attach_tag, find_tag, insert_tag, list_tags};
use crate::{DbError, Store, Table};

const ALL_TABLES: &[Table] = &[
    Table::ActivityTypes,
    Table::TimeEntries,
    Table::Tags,
    Table::TimeEntryTags,
    Table::Goals,
];

/// Every record in a store, with ids as they were at capture time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub activities: Vec<ActivityType>,
    pub tags: Vec<Tag>,
    pub goals: Vec<Goal>,
    pub entries: Vec<SnapshotEntry>,
}

/// A time entry together with the ids of its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(flatten)]
    pub entry: TimeEntry,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

/// What [`Store::restore`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreStats {
    pub activities_created: usize,
    pub activities_reused: usize,
    pub tags_created: usize,
    pub tags_reused: usize,
    pub goals: usize,
    pub entries: usize,
    pub tag_links: usize,
}

impl Store {
    /// Captures every record under one lock.
    pub fn snapshot(&self) -> Result<Snapshot, DbError> {
        self.read(|conn| {
            let mut links = links_by_entry(conn)?;
            let entries = list_all(conn)?
                .into_iter()
                .map(|entry| SnapshotEntry {
                    tag_ids: links.remove(&entry.id).unwrap_or_default(),
                    entry,
                })
                .collect();
            Ok(Snapshot {
                activities: list_activities(conn)?,
                tags: list_tags(conn)?,
                goals: list_goals(conn)?,
                entries,
            })
        })
    }

    /// Adds the content of a snapshot to this store in one transaction.
    ///
    /// Activities and tags whose names already exist are reused; everything
    /// else gets fresh ids. References are remapped from snapshot ids to
    /// store ids. Any failure leaves the store untouched.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<RestoreStats, DbError> {
        self.write(ALL_TABLES, |tx| {
            let mut stats = RestoreStats::default();

            // Insert in id order so a restore into an empty store keeps ids.
            let mut activities: Vec<&ActivityType> = snapshot.activities.iter().collect();
            activities.sort_by_key(|activity| activity.id);
            let mut activity_ids = HashMap::new();
            for activity in activities {
                let id = match find_activity_id(tx, &activity.name)? {
                    Some(id) => {
                        stats.activities_reused += 1;
                        id
                    }
                    None => {
                        stats.activities_created += 1;
                        let new = NewActivity::new(&activity.name, activity.color.clone())?;
                        insert_activity(tx, &new)?.id
                    }
                };
                activity_ids.insert(activity.id, id);
            }
            let activity = |old: ActivityId, table: &'static str| {
                activity_ids
                    .get(&old)
                    .copied()
                    .ok_or(DbError::MissingReference { table })
            };

            let mut tags: Vec<&Tag> = snapshot.tags.iter().collect();
            tags.sort_by_key(|tag| tag.id);
            let mut tag_ids = HashMap::new();
            for tag in tags {
                let id = match find_tag(tx, &tag.name)? {
                    Some(existing) => {
                        stats.tags_reused += 1;
                        existing.id
                    }
                    None => {
                        stats.tags_created += 1;
                        insert_tag(tx, &tag.name)?.id
                    }
                };
                tag_ids.insert(tag.id, id);
            }

            for goal in &snapshot.goals {
                let new = NewGoal::new(
                    activity(goal.activity_id, "goals")?,
                    goal.goal_type,
                    goal.period,
                    goal.target_ms,
                    goal.created_on,
                )?;
                insert_goal(tx, &new)?;
                stats.goals += 1;
            }

            for item in &snapshot.entries {
                let entry = &item.entry;
                let activity_id = activity(entry.activity_id, "time_entries")?;
                let new = match entry.end {
                    Some(end) => {
                        NewTimeEntry::completed(activity_id, entry.start, end, entry.note.clone())?
                    }
                    None => NewTimeEntry::running(activity_id, entry.start, entry.note.clone()),
                };
                let stored = insert_entry(tx, &new)?;
                stats.entries += 1;
                for old in &item.tag_ids {
                    let tag = tag_ids
                        .get(old)
                        .copied()
                        .ok_or(DbError::MissingReference { table: "time_entry_tags" })?;
                    if attach_tag(tx, stored.id, tag)? {
                        stats.tag_links += 1;
                    }
                }
            }

            tracing::debug!(?stats, "restored snapshot");
            Ok(stats)
        })
    }
}

fn find_activity_id(conn: &Connection, name: &str) -> Result<Option<ActivityId>, DbError> {
    Ok(conn
        .query_row(
            "SELECT id FROM activity_types WHERE name = ?",
            [name],
            |row| row.get(0).map(ActivityId::new),
        )
        .optional()?)
}

fn links_by_entry(conn: &Connection) -> Result<HashMap<EntryId, Vec<TagId>>, DbError> {
    let mut stmt =
        conn.prepare("SELECT entry_id, tag_id FROM time_entry_tags ORDER BY entry_id, tag_id")?;
    let mut rows = stmt.query([])?;
    let mut links: HashMap<EntryId, Vec<TagId>> = HashMap::new();
    while let Some(row) = rows.next()? {
        links
            .entry(EntryId::new(row.get(0)?))
            .or_default()
            .push(TagId::new(row.get(1)?));
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, NaiveDate, Utc};
    use tempo_core::{Color, GoalPeriod, GoalType};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn populated() -> Store {
        let store = Store::open_in_memory().unwrap();
        let coding = store
            .activities()
            .insert(&NewActivity::new("Coding", Color::parse("#336699").unwrap()).unwrap())
            .unwrap();
        store
            .activities()
            .insert(&NewActivity::new("Reading", Color::default()).unwrap())
            .unwrap();
        store
            .entries()
            .insert_tagged(
                &NewTimeEntry::completed(
                    coding.id,
                    ts("2025-03-01T09:00:00Z"),
                    ts("2025-03-01T10:00:00Z"),
                    Some("morning".to_string()),
                )
                .unwrap(),
                &["focus".to_string(), "client".to_string()],
            )
            .unwrap();
        store
            .entries()
            .insert(&NewTimeEntry::running(coding.id, ts("2025-03-01T11:00:00Z"), None))
            .unwrap();
        store
            .goals()
            .insert(
                &NewGoal::new(
                    coding.id,
                    GoalType::Minimum,
                    GoalPeriod::Day,
                    3_600_000,
                    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn snapshot_collects_links() {
        let snapshot = populated().snapshot().unwrap();
        assert_eq!(snapshot.activities.len(), 2);
        assert_eq!(snapshot.tags.len(), 2);
        assert_eq!(snapshot.goals.len(), 1);
        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].tag_ids.len(), 2);
        assert!(snapshot.entries[1].tag_ids.is_empty());
    }

    #[test]
    fn restore_into_empty_store_reproduces_data() {
        let original = populated().snapshot().unwrap();
        let target = Store::open_in_memory().unwrap();
        let stats = target.restore(&original).unwrap();
        assert_eq!(
            stats,
            RestoreStats {
                activities_created: 2,
                activities_reused: 0,
                tags_created: 2,
                tags_reused: 0,
                goals: 1,
                entries: 2,
                tag_links: 2,
            }
        );
        assert_eq!(target.snapshot().unwrap(), original);
    }

    #[test]
    fn restore_reuses_names_and_rolls_back_on_failure() {
        let store = populated();
        let snapshot = store.snapshot().unwrap();
        // The snapshot carries a running entry and one is already running.
        let err = store.restore(&snapshot).unwrap_err();
        assert!(matches!(err, DbError::Duplicate { table: "time_entries", .. }));
        assert_eq!(store.snapshot().unwrap(), snapshot);

        let mut completed_only = snapshot.clone();
        completed_only.entries.retain(|e| e.entry.end.is_some());
        let stats = store.restore(&completed_only).unwrap();
        assert_eq!(stats.activities_reused, 2);
        assert_eq!(stats.tags_reused, 2);
        assert_eq!(stats.activities_created + stats.tags_created, 0);
        assert_eq!(store.entries().list_all().unwrap().len(), 3);
    }

    #[test]
    fn restore_normalizes_entries() {
        let mut snapshot = populated().snapshot().unwrap();
        snapshot.entries.truncate(1);
        let entry = &mut snapshot.entries[0].entry;
        entry.start += chrono::Duration::nanoseconds(456_789);
        entry.note = Some("  ".to_string());
        let expected_start = snapshot.entries[0].entry.start;

        let target = Store::open_in_memory().unwrap();
        target.restore(&snapshot).unwrap();
        let restored = &target.entries().list_all().unwrap()[0];
        assert_eq!(restored.start.timestamp_millis(), expected_start.timestamp_millis());
        assert_eq!(restored.start.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(restored.note, None);

        let entry = &mut snapshot.entries[0].entry;
        entry.end = Some(entry.start - chrono::Duration::hours(1));
        let err = target.restore(&snapshot).unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }

    #[test]
    fn dangling_activity_reference_fails() {
        let mut snapshot = populated().snapshot().unwrap();
        snapshot.activities.clear();
        let err = Store::open_in_memory().unwrap().restore(&snapshot).unwrap_err();
        assert!(matches!(err, DbError::MissingReference { table: "goals" }));
    }

    #[test]
    fn snapshot_serializes_entries_flat() {
        let snapshot = populated().snapshot().unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();
        let first = &json["entries"][0];
        assert_eq!(first["note"], "morning");
        assert_eq!(first["tag_ids"].as_array().unwrap().len(), 2);
        assert!(json["entries"][1].get("end").is_none());
        let parsed: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
