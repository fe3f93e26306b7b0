//! `tempo log`, `tempo entries` and `tempo entry rm`.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use tempo_app::{LogEntry, TaggedEntry, Tempo};
use tempo_core::{DateSpan, EntryId, TimeRange};

use super::util::{activity_names, format_duration, format_instant, parse_datetime};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Activity name or id.
    pub activity: String,

    /// Start time (RFC 3339 or e.g. "2 hours ago").
    #[arg(long)]
    pub start: String,

    /// End time (RFC 3339 or e.g. "30 minutes ago").
    #[arg(long)]
    pub end: String,

    /// Free-text note.
    #[arg(long)]
    pub note: Option<String>,

    /// Tag to attach; repeat for several. Unknown tags are created.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

pub async fn log<W: Write>(
    writer: &mut W,
    tempo: &Tempo,
    args: &LogArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let start = parse_datetime(&args.start, now).context("invalid --start")?;
    let end = parse_datetime(&args.end, now).context("invalid --end")?;
    let activity = tempo.find_activity(args.activity.clone()).await?;
    let entry = tempo
        .log_entry(LogEntry {
            activity_id: activity.id,
            start,
            end,
            note: args.note.clone(),
            tags: args.tags.clone(),
        })
        .await
        .context("failed to log entry")?;
    writeln!(
        writer,
        "Logged {} of {} (entry {})",
        format_duration(entry.duration_ms(now)),
        activity.name,
        entry.id
    )?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JsonEntries<'a> {
    period: JsonPeriod,
    total_ms: i64,
    entries: &'a [TaggedEntry],
}

#[derive(Debug, Serialize)]
struct JsonPeriod {
    start: String,
    end: String,
}

/// Lists entries overlapping `range`, labelled with `span` and `label`.
pub async fn list<W: Write>(
    writer: &mut W,
    tempo: &Tempo,
    label: &str,
    span: DateSpan,
    range: TimeRange,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let entries = tempo.list_entries(range).await?;
    let total_ms: i64 = entries
        .iter()
        .map(|tagged| tagged.entry.overlap_ms(&range, now))
        .sum();

    if json {
        let doc = JsonEntries {
            period: JsonPeriod {
                start: span.first.to_string(),
                end: span.last().to_string(),
            },
            total_ms,
            entries: &entries,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&doc)?)?;
        return Ok(());
    }

    writeln!(
        writer,
        "Entries {label} ({} to {})",
        span.first,
        span.last()
    )?;
    writeln!(writer)?;

    if entries.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }

    let names = activity_names(tempo).await?;
    writeln!(
        writer,
        "{:<4}  {:<16}  {:<16}  {:<8}  {:<16}  Tags",
        "ID", "Start", "End", "Duration", "Activity"
    )?;
    for TaggedEntry { entry, tags } in &entries {
        let end = entry.end.map_or_else(|| "running".to_string(), format_instant);
        let name = names
            .get(&entry.activity_id)
            .map_or("(deleted)", String::as_str);
        let tags: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        let line = format!(
            "{:<4}  {:<16}  {:<16}  {:<8}  {:<16}  {}",
            entry.id,
            format_instant(entry.start),
            end,
            format_duration(entry.duration_ms(now)),
            name,
            tags.join(", ")
        );
        writeln!(writer, "{}", line.trim_end())?;
        if let Some(note) = &entry.note {
            writeln!(writer, "      {note}")?;
        }
    }
    writeln!(writer)?;
    writeln!(writer, "Total: {}", format_duration(total_ms))?;
    Ok(())
}

pub async fn remove<W: Write>(writer: &mut W, tempo: &Tempo, id: i64) -> Result<()> {
    tempo
        .delete_entry(EntryId::new(id))
        .await
        .context("failed to delete entry")?;
    writeln!(writer, "Deleted entry {id}")?;
    Ok(())
}
