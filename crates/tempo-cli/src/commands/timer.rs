//! `tempo start` and `tempo stop`.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use tempo_app::{StartTimer, Tempo, UseCaseError};

use super::util::{activity_names, format_duration, format_instant, parse_datetime};

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Activity name or id.
    pub activity: String,

    /// Free-text note.
    #[arg(long)]
    pub note: Option<String>,

    /// Tag to attach; repeat for several. Unknown tags are created.
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Start time (RFC 3339 or e.g. "10 minutes ago"); defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

pub async fn start<W: Write>(
    writer: &mut W,
    tempo: &Tempo,
    args: &StartArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let at = match &args.at {
        Some(at) => parse_datetime(at, now)?,
        None => now,
    };
    let activity = tempo.find_activity(args.activity.clone()).await?;
    let result = tempo
        .start_timer(StartTimer {
            activity_id: activity.id,
            at,
            note: args.note.clone(),
            tags: args.tags.clone(),
        })
        .await
        .context("failed to start timer")?;

    if let Some(stopped) = &result.stopped {
        let names = activity_names(tempo).await?;
        let name = names
            .get(&stopped.activity_id)
            .map_or("(deleted)", String::as_str);
        writeln!(
            writer,
            "Stopped {name} after {}",
            format_duration(stopped.duration_ms(now))
        )?;
    }
    writeln!(
        writer,
        "Started {} at {} (entry {})",
        activity.name,
        format_instant(result.started.start),
        result.started.id
    )?;
    Ok(())
}

pub async fn stop<W: Write>(writer: &mut W, tempo: &Tempo, now: DateTime<Utc>) -> Result<()> {
    let stopped = match tempo.stop_timer(now).await {
        Ok(entry) => entry,
        Err(UseCaseError::NoRunningTimer) => {
            writeln!(writer, "No timer running.")?;
            return Ok(());
        }
        Err(err) => return Err(err).context("failed to stop timer"),
    };
    let names = activity_names(tempo).await?;
    let name = names
        .get(&stopped.activity_id)
        .map_or("(deleted)", String::as_str);
    writeln!(
        writer,
        "Stopped {name} after {} (entry {})",
        format_duration(stopped.duration_ms(now)),
        stopped.id
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::testing::{output, tempo_with_activities, ts};

    fn start_args(activity: &str, at: &str) -> StartArgs {
        StartArgs {
            activity: activity.to_string(),
            note: None,
            tags: Vec::new(),
            at: Some(at.to_string()),
        }
    }

    #[tokio::test]
    async fn start_switch_stop() {
        let tempo = tempo_with_activities(&["Coding", "Reading"]).await;
        let now = ts("2025-03-01T12:00:00Z");
        let mut out = Vec::new();
        start(&mut out, &tempo, &start_args("Coding", "2 hours ago"), now)
            .await
            .unwrap();
        start(&mut out, &tempo, &start_args("Reading", "30 minutes ago"), now)
            .await
            .unwrap();
        stop(&mut out, &tempo, now).await.unwrap();
        stop(&mut out, &tempo, now).await.unwrap();
        assert_snapshot!(output(out), @r"
        Started Coding at 2025-03-01 10:00 (entry 1)
        Stopped Coding after 1h 30m
        Started Reading at 2025-03-01 11:30 (entry 2)
        Stopped Reading after 30m (entry 2)
        No timer running.
        ");
    }

    #[tokio::test]
    async fn start_by_id_with_tags() {
        let tempo = tempo_with_activities(&["Coding"]).await;
        let mut args = start_args("1", "now");
        args.tags = vec!["focus".to_string()];
        start(&mut Vec::new(), &tempo, &args, ts("2025-03-01T12:00:00Z"))
            .await
            .unwrap();
        let running = tempo.running_entry().await.unwrap().unwrap();
        assert_eq!(running.start, ts("2025-03-01T12:00:00Z"));
        assert_eq!(tempo.find_tag("focus".to_string()).await.unwrap().name, "focus");
    }

    #[tokio::test]
    async fn start_unknown_activity_fails() {
        let tempo = tempo_with_activities(&[]).await;
        let err = start(
            &mut Vec::new(),
            &tempo,
            &start_args("Gym", "now"),
            ts("2025-03-01T12:00:00Z"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "activity Gym not found");
    }
}
