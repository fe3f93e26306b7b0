//! Goal repository.

use rusqlite::{Connection, OptionalExtension, Row, params};

use tempo_core::{ActivityId, Goal, GoalId, GoalPeriod, GoalType, NewGoal};

use crate::convert::{date_to_string, enum_to_name, name_to_enum, string_to_date};
use crate::{DbError, LiveQuery, Store, Table, decode_rows};

const TABLE: &str = "goals";

const GOAL_COLUMNS: &str = "id, activity_id, goal_type, period, target_ms, created_on";

/// Reads and writes [`Goal`] records.
#[derive(Debug, Clone)]
pub struct GoalRepository {
    store: Store,
}

struct GoalRow {
    id: i64,
    activity_id: i64,
    goal_type: String,
    period: String,
    target_ms: i64,
    created_on: String,
}

impl GoalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            activity_id: row.get(1)?,
            goal_type: row.get(2)?,
            period: row.get(3)?,
            target_ms: row.get(4)?,
            created_on: row.get(5)?,
        })
    }

    fn corrupt(&self, column: &'static str, value: &str) -> DbError {
        DbError::Corrupt {
            table: TABLE,
            id: self.id,
            column,
            value: value.to_string(),
        }
    }

    fn decode(self) -> Result<Goal, DbError> {
        let goal_type: GoalType = name_to_enum(&self.goal_type)
            .ok_or_else(|| self.corrupt("goal_type", &self.goal_type))?;
        let period: GoalPeriod =
            name_to_enum(&self.period).ok_or_else(|| self.corrupt("period", &self.period))?;
        let created_on = string_to_date(&self.created_on)
            .ok_or_else(|| self.corrupt("created_on", &self.created_on))?;
        Ok(Goal {
            id: GoalId::new(self.id),
            activity_id: ActivityId::new(self.activity_id),
            goal_type,
            period,
            target_ms: self.target_ms,
            created_on,
        })
    }
}

impl GoalRepository {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stores a goal. Fails with [`DbError::MissingReference`] for an unknown activity.
    pub fn insert(&self, goal: &NewGoal) -> Result<Goal, DbError> {
        self.store.write(&[Table::Goals], |tx| insert_goal(tx, goal))
    }

    /// Overwrites a goal; `false` when it does not exist.
    pub fn update(&self, goal: &Goal) -> Result<bool, DbError> {
        goal.validate()?;
        self.store.write(&[Table::Goals], |tx| {
            let changed = tx
                .execute(
                    "UPDATE goals
                     SET activity_id = ?, goal_type = ?, period = ?, target_ms = ?, created_on = ?
                     WHERE id = ?",
                    params![
                        goal.activity_id.get(),
                        enum_to_name(goal.goal_type),
                        enum_to_name(goal.period),
                        goal.target_ms,
                        date_to_string(goal.created_on),
                        goal.id.get(),
                    ],
                )
                .map_err(|err| DbError::from_write(err, TABLE, &goal.id.to_string()))?;
            Ok(changed > 0)
        })
    }

    pub fn delete(&self, id: GoalId) -> Result<bool, DbError> {
        self.store.write(&[Table::Goals], |tx| {
            let deleted = tx.execute("DELETE FROM goals WHERE id = ?", [id.get()])?;
            Ok(deleted > 0)
        })
    }

    /// Fetches one goal.
    ///
    /// Fails with [`DbError::Corrupt`] when its stored enum names are unknown.
    pub fn get(&self, id: GoalId) -> Result<Option<Goal>, DbError> {
        self.store.read(|conn| {
            conn.query_row(
                &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"),
                [id.get()],
                GoalRow::from_row,
            )
            .optional()?
            .map(GoalRow::decode)
            .transpose()
        })
    }

    /// Lists every goal, skipping rows that no longer decode.
    pub fn list(&self) -> Result<Vec<Goal>, DbError> {
        self.store.read(list_goals)
    }

    pub fn list_for_activity(&self, activity: ActivityId) -> Result<Vec<Goal>, DbError> {
        self.store.read(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GOAL_COLUMNS} FROM goals WHERE activity_id = ? ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map([activity.get()], GoalRow::from_row)?;
            decode_rows(rows, GoalRow::decode)
        })
    }

    /// Observes the full goal list.
    pub fn watch_all(&self) -> Result<LiveQuery<Vec<Goal>>, DbError> {
        LiveQuery::spawn(&self.store, &[Table::Goals], |store| store.read(list_goals))
    }
}

pub(crate) fn insert_goal(conn: &Connection, goal: &NewGoal) -> Result<Goal, DbError> {
    conn.execute(
        "INSERT INTO goals (activity_id, goal_type, period, target_ms, created_on)
         VALUES (?, ?, ?, ?, ?)",
        params![
            goal.activity_id.get(),
            enum_to_name(goal.goal_type),
            enum_to_name(goal.period),
            goal.target_ms,
            date_to_string(goal.created_on),
        ],
    )
    .map_err(|err| DbError::from_write(err, TABLE, &goal.activity_id.to_string()))?;
    Ok(goal.clone().with_id(GoalId::new(conn.last_insert_rowid())))
}

pub(crate) fn list_goals(conn: &Connection) -> Result<Vec<Goal>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([], GoalRow::from_row)?;
    decode_rows(rows, GoalRow::decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tempo_core::{ActivityType, Color, NewActivity};

    fn setup() -> (Store, ActivityType) {
        let store = Store::open_in_memory().unwrap();
        let activity = store
            .activities()
            .insert(&NewActivity::new("Exercise", Color::default()).unwrap())
            .unwrap();
        (store, activity)
    }

    fn created_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn weekly_minimum(activity: ActivityId) -> NewGoal {
        NewGoal::new(
            activity,
            GoalType::Minimum,
            GoalPeriod::Week,
            3 * 3_600_000,
            created_on(),
        )
        .unwrap()
    }

    #[test]
    fn insert_get_update_delete() {
        let (store, activity) = setup();
        let goals = store.goals();
        let mut goal = goals.insert(&weekly_minimum(activity.id)).unwrap();
        assert_eq!(goals.get(goal.id).unwrap(), Some(goal.clone()));

        goal.goal_type = GoalType::Maximum;
        goal.period = GoalPeriod::Day;
        goal.target_ms = 1_800_000;
        assert!(goals.update(&goal).unwrap());
        assert_eq!(goals.get(goal.id).unwrap(), Some(goal.clone()));

        goal.target_ms = 0;
        assert!(matches!(goals.update(&goal).unwrap_err(), DbError::Invalid(_)));

        assert!(goals.delete(goal.id).unwrap());
        assert_eq!(goals.get(goal.id).unwrap(), None);
    }

    #[test]
    fn insert_for_missing_activity_fails() {
        let (store, _) = setup();
        let err = store
            .goals()
            .insert(&weekly_minimum(ActivityId::new(500)))
            .unwrap_err();
        assert!(matches!(err, DbError::MissingReference { table: "goals" }));
    }

    #[test]
    fn enum_names_are_stored_verbatim() {
        let (store, activity) = setup();
        let goal = store.goals().insert(&weekly_minimum(activity.id)).unwrap();
        let (goal_type, period, created): (String, String, String) = store
            .read(|conn| {
                Ok(conn.query_row(
                    "SELECT goal_type, period, created_on FROM goals WHERE id = ?",
                    [goal.id.get()],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )?)
            })
            .unwrap();
        assert_eq!(goal_type, "MINIMUM");
        assert_eq!(period, "WEEK");
        assert_eq!(created, "2025-03-01");
    }

    #[test]
    fn unknown_goal_type_is_skipped_by_list_and_corrupt_on_get() {
        let (store, activity) = setup();
        let goals = store.goals();
        let good = goals.insert(&weekly_minimum(activity.id)).unwrap();
        let bad_id = store
            .write(&[], |tx| {
                tx.execute(
                    "INSERT INTO goals (activity_id, goal_type, period, target_ms, created_on)
                     VALUES (?, 'AT_LEAST', 'WEEK', 60000, '2025-03-01')",
                    [activity.id.get()],
                )?;
                Ok(GoalId::new(tx.last_insert_rowid()))
            })
            .unwrap();

        assert_eq!(goals.list().unwrap(), vec![good.clone()]);
        assert_eq!(goals.list_for_activity(activity.id).unwrap(), vec![good]);
        let err = goals.get(bad_id).unwrap_err();
        assert!(matches!(
            err,
            DbError::Corrupt { column: "goal_type", ref value, .. } if value == "AT_LEAST"
        ));
    }

    #[test]
    fn deleting_activity_cascades_to_goals() {
        let (store, activity) = setup();
        let goals = store.goals();
        goals.insert(&weekly_minimum(activity.id)).unwrap();
        assert!(store.activities().delete(activity.id).unwrap());
        assert!(goals.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn watch_all_follows_inserts_and_cascades() {
        let (store, activity) = setup();
        let goals = store.goals();
        let mut live = goals.watch_all().unwrap();
        assert!(live.get().is_empty());

        let goal = goals.insert(&weekly_minimum(activity.id)).unwrap();
        let next = tokio::time::timeout(std::time::Duration::from_secs(5), live.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, vec![goal]);

        store.activities().delete(activity.id).unwrap();
        let next = tokio::time::timeout(std::time::Duration::from_secs(5), live.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(next.is_empty());
    }
}
