//! Statistics use cases.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use tempo_core::stats::{goal_progress, totals_by_activity, totals_by_day};
use tempo_core::{
    ActivityTotal, DailyTotal, DateSpan, GoalProgress, TimeRange, WeekStart, period_containing,
};

use crate::{Tempo, UseCaseError};

impl Tempo {
    /// Tracked time per activity within `range`.
    ///
    /// Entries are clipped to the range; a running entry counts up to `now`.
    pub async fn activity_totals(
        &self,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActivityTotal>, UseCaseError> {
        self.run("activity_totals", move |store| {
            let entries = store.entries().list_between(&range)?;
            let activities = store.activities().list()?;
            Ok(totals_by_activity(&entries, &activities, &range, now))
        })
        .await
    }

    /// Tracked time per local day of `span`, with days split at midnight in `tz`.
    pub async fn daily_totals<Tz>(
        &self,
        span: DateSpan,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyTotal>, UseCaseError>
    where
        Tz: TimeZone + Send + 'static,
    {
        self.run("daily_totals", move |store| {
            let range = span.to_range(&tz)?;
            let entries = store.entries().list_between(&range)?;
            Ok(totals_by_day(&entries, &span, &tz, now))
        })
        .await
    }

    /// Progress of every goal over its period containing `reference`.
    pub async fn goal_progress<Tz>(
        &self,
        reference: NaiveDate,
        week_start: WeekStart,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Vec<GoalProgress>, UseCaseError>
    where
        Tz: TimeZone + Send + 'static,
    {
        self.run("goal_progress", move |store| {
            let goals = store.goals().list()?;
            let entries = store.entries();
            let mut progress = Vec::with_capacity(goals.len());
            for goal in &goals {
                let span = period_containing(goal.period, reference, week_start);
                let range = span.to_range(&tz)?;
                let tracked = entries.list_between(&range)?;
                progress.push(goal_progress(goal, span, &range, &tracked, now));
            }
            Ok(progress)
        })
        .await
    }
}
