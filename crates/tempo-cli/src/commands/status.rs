//! `tempo status`: database location and running timer.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use tempo_app::Tempo;

use super::util::{activity_names, format_duration, format_instant};

pub async fn run<W: Write>(writer: &mut W, tempo: &Tempo, now: DateTime<Utc>) -> Result<()> {
    writeln!(writer, "Database: {}", tempo.store().location())?;

    let Some(entry) = tempo.running_entry().await? else {
        writeln!(writer, "No timer running.")?;
        return Ok(());
    };

    let names = activity_names(tempo).await?;
    let name = names
        .get(&entry.activity_id)
        .map_or("(deleted)", String::as_str);
    writeln!(
        writer,
        "Running: {name} since {} ({})",
        format_instant(entry.start),
        format_duration(entry.duration_ms(now))
    )?;
    if let Some(note) = &entry.note {
        writeln!(writer, "Note: {note}")?;
    }
    Ok(())
}
