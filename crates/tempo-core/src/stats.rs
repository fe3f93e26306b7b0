//! Statistics over time entries.
//!
//! All functions are pure: callers load the entries overlapping the range of
//! interest and pass `now` explicitly so running entries count up to a fixed
//! instant.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::activity::ActivityType;
use crate::entry::TimeEntry;
use crate::goal::Goal;
use crate::period::{DateSpan, TimeRange, midnight_in};
use crate::types::{ActivityId, Color};

/// Tracked time for one activity within a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTotal {
    pub activity_id: ActivityId,
    pub name: String,
    pub color: Color,
    pub total_ms: i64,
    pub entry_count: usize,
}

/// Tracked time on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_ms: i64,
}

/// How far a goal has progressed in the period containing a reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal: Goal,
    pub span: DateSpan,
    pub tracked_ms: i64,
    pub met: bool,
}

impl GoalProgress {
    /// Tracked time as a fraction of the target.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        self.tracked_ms as f64 / self.goal.target_ms as f64
    }
}

/// Sums tracked time per activity, clipped to `range`.
///
/// Activities with no time in the range are omitted. Entries referencing an
/// activity missing from `activities` are ignored. Sorted by total
/// descending, then name.
pub fn totals_by_activity(
    entries: &[TimeEntry],
    activities: &[ActivityType],
    range: &TimeRange,
    now: DateTime<Utc>,
) -> Vec<ActivityTotal> {
    let mut sums: HashMap<ActivityId, (i64, usize)> = HashMap::new();
    for entry in entries {
        let ms = entry.overlap_ms(range, now);
        if ms == 0 {
            continue;
        }
        let slot = sums.entry(entry.activity_id).or_default();
        slot.0 += ms;
        slot.1 += 1;
    }

    let mut totals: Vec<ActivityTotal> = activities
        .iter()
        .filter_map(|activity| {
            let (total_ms, entry_count) = sums.get(&activity.id).copied()?;
            Some(ActivityTotal {
                activity_id: activity.id,
                name: activity.name.clone(),
                color: activity.color.clone(),
                total_ms,
                entry_count,
            })
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total_ms
            .cmp(&a.total_ms)
            .then_with(|| a.name.cmp(&b.name))
    });
    totals
}

/// Sums tracked time per local date of `span`, splitting entries at midnight.
///
/// Every date in the span is present, including days with no time.
pub fn totals_by_day<Tz: TimeZone>(
    entries: &[TimeEntry],
    span: &DateSpan,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Vec<DailyTotal> {
    span.days()
        .map(|date| {
            let start = midnight_in(tz, date);
            let end = date.succ_opt().map_or(start, |next| midnight_in(tz, next));
            let total_ms = TimeRange::new(start, end).map_or(0, |day| {
                entries
                    .iter()
                    .map(|entry| entry.overlap_ms(&day, now))
                    .sum()
            });
            DailyTotal { date, total_ms }
        })
        .collect()
}

/// Evaluates `goal` against entries overlapping `range`.
///
/// `range` must be the UTC conversion of `span`; entries for other
/// activities are ignored.
pub fn goal_progress(
    goal: &Goal,
    span: DateSpan,
    range: &TimeRange,
    entries: &[TimeEntry],
    now: DateTime<Utc>,
) -> GoalProgress {
    let tracked_ms = entries
        .iter()
        .filter(|entry| entry.activity_id == goal.activity_id)
        .map(|entry| entry.overlap_ms(range, now))
        .sum();
    GoalProgress {
        goal: goal.clone(),
        span,
        tracked_ms,
        met: goal.is_met(tracked_ms),
    }
}
