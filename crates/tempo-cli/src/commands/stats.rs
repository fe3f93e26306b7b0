//! `tempo stats`: totals per activity, per day and goal progress.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use tempo_app::Tempo;
use tempo_core::{ActivityTotal, DailyTotal, GoalProgress, GoalType, WeekStart};

use super::util::{Period, activity_names, format_duration};

#[derive(Debug, Serialize)]
struct JsonStats<'a> {
    period: JsonPeriod,
    total_ms: i64,
    activities: &'a [ActivityTotal],
    daily: &'a [DailyTotal],
    goals: &'a [GoalProgress],
}

#[derive(Debug, Serialize)]
struct JsonPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

fn goal_status(progress: &GoalProgress) -> &'static str {
    match (progress.goal.goal_type, progress.met) {
        (GoalType::Minimum, true) => "met",
        (GoalType::Minimum, false) => "not yet",
        (GoalType::Maximum, true) => "within limit",
        (GoalType::Maximum, false) => "over limit",
    }
}

#[expect(clippy::too_many_arguments, reason = "CLI flag passthrough")]
pub async fn run<W, Tz>(
    writer: &mut W,
    tempo: &Tempo,
    period: Period,
    today: NaiveDate,
    week_start: WeekStart,
    tz: Tz,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone + Send + 'static,
{
    let span = period.span(today, week_start);
    let range = span.to_range(&tz)?;

    let totals = tempo.activity_totals(range, now).await?;
    let daily = tempo.daily_totals(span, tz.clone(), now).await?;
    let goals = tempo.goal_progress(today, week_start, tz, now).await?;
    let total_ms: i64 = totals.iter().map(|total| total.total_ms).sum();

    if json {
        let doc = JsonStats {
            period: JsonPeriod {
                start: span.first,
                end: span.last(),
            },
            total_ms,
            activities: &totals,
            daily: &daily,
            goals: &goals,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&doc)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Stats {} ({} to {})",
        period.label(),
        span.first,
        span.last()
    )?;
    writeln!(writer)?;

    if totals.is_empty() {
        writeln!(writer, "No time tracked.")?;
    } else {
        writeln!(writer, "{:<20}  {:<8}  Entries", "Activity", "Time")?;
        for total in &totals {
            writeln!(
                writer,
                "{:<20}  {:<8}  {}",
                total.name,
                format_duration(total.total_ms),
                total.entry_count
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {}", format_duration(total_ms))?;
    }

    if period != Period::Day && total_ms > 0 {
        writeln!(writer)?;
        writeln!(writer, "Daily")?;
        for day in &daily {
            writeln!(
                writer,
                "{}  {}",
                day.date.format("%Y-%m-%d %a"),
                format_duration(day.total_ms)
            )?;
        }
    }

    if !goals.is_empty() {
        let names = activity_names(tempo).await?;
        writeln!(writer)?;
        writeln!(writer, "Goals")?;
        for progress in &goals {
            let goal = &progress.goal;
            let name = names
                .get(&goal.activity_id)
                .map_or("(deleted)", String::as_str);
            let target = format!(
                "{} {} per {}",
                match goal.goal_type {
                    GoalType::Minimum => "at least",
                    GoalType::Maximum => "at most",
                },
                format_duration(goal.target_ms),
                goal.period
            );
            let percent = format!("{:.0}%", progress.ratio() * 100.0);
            writeln!(
                writer,
                "{:<20}  {:<24}  {:<8}  {:<5}  {}",
                name,
                target,
                format_duration(progress.tracked_ms),
                percent,
                goal_status(progress)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tempo_app::{LogEntry, SetGoal};
    use tempo_core::{ActivityId, GoalPeriod};

    use crate::testing::{output, tempo_with_activities, ts};

    async fn log(tempo: &Tempo, activity: i64, start: &str, end: &str) {
        tempo
            .log_entry(LogEntry {
                activity_id: ActivityId::new(activity),
                start: ts(start),
                end: ts(end),
                note: None,
                tags: Vec::new(),
            })
            .await
            .unwrap();
    }

    async fn goal(tempo: &Tempo, activity: i64, goal_type: GoalType, minutes: i64) {
        tempo
            .set_goal(SetGoal {
                activity_id: ActivityId::new(activity),
                goal_type,
                period: GoalPeriod::Week,
                target_ms: minutes * 60_000,
                created_on: "2025-03-01".parse().unwrap(),
            })
            .await
            .unwrap();
    }

    async fn seeded() -> Tempo {
        let tempo = tempo_with_activities(&["Coding", "Games"]).await;
        log(&tempo, 1, "2025-03-03T09:00:00Z", "2025-03-03T11:00:00Z").await;
        log(&tempo, 1, "2025-03-05T09:00:00Z", "2025-03-05T10:00:00Z").await;
        log(&tempo, 2, "2025-03-04T20:00:00Z", "2025-03-04T22:30:00Z").await;
        goal(&tempo, 1, GoalType::Minimum, 600).await;
        goal(&tempo, 2, GoalType::Maximum, 120).await;
        tempo
    }

    #[tokio::test]
    async fn week_report() {
        let tempo = seeded().await;
        let mut out = Vec::new();
        run(
            &mut out,
            &tempo,
            Period::Week,
            "2025-03-05".parse().unwrap(),
            WeekStart::Monday,
            Utc,
            false,
            ts("2025-03-05T12:00:00Z"),
        )
        .await
        .unwrap();
        assert_snapshot!(output(out), @r"
        Stats this week (2025-03-03 to 2025-03-09)

        Activity              Time      Entries
        Coding                3h 0m     2
        Games                 2h 30m    1

        Total: 5h 30m

        Daily
        2025-03-03 Mon  2h 0m
        2025-03-04 Tue  2h 30m
        2025-03-05 Wed  1h 0m
        2025-03-06 Thu  0m
        2025-03-07 Fri  0m
        2025-03-08 Sat  0m
        2025-03-09 Sun  0m

        Goals
        Coding                at least 10h 0m per week  3h 0m     30%    not yet
        Games                 at most 2h 0m per week    2h 30m    125%   over limit
        ");
    }

    #[tokio::test]
    async fn empty_day_report() {
        let tempo = tempo_with_activities(&["Coding"]).await;
        let mut out = Vec::new();
        run(
            &mut out,
            &tempo,
            Period::Day,
            "2025-03-05".parse().unwrap(),
            WeekStart::Monday,
            Utc,
            false,
            ts("2025-03-05T12:00:00Z"),
        )
        .await
        .unwrap();
        assert_snapshot!(output(out), @r"
        Stats today (2025-03-05 to 2025-03-05)

        No time tracked.
        ");
    }

    #[tokio::test]
    async fn json_report() {
        let tempo = seeded().await;
        let mut out = Vec::new();
        run(
            &mut out,
            &tempo,
            Period::Day,
            "2025-03-04".parse().unwrap(),
            WeekStart::Monday,
            Utc,
            true,
            ts("2025-03-05T12:00:00Z"),
        )
        .await
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output(out)).unwrap();
        assert_eq!(parsed["period"]["start"], "2025-03-04");
        assert_eq!(parsed["total_ms"], 9_000_000);
        assert_eq!(parsed["activities"][0]["name"], "Games");
        assert_eq!(parsed["daily"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["goals"][1]["met"], false);
        assert_eq!(parsed["goals"][0]["goal"]["goal_type"], "MINIMUM");
    }
}
