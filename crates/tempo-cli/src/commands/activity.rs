//! `tempo activity` subcommands.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use tempo_app::Tempo;
use tempo_core::{ActivityId, Color};

#[derive(Debug, Args)]
pub struct ActivityAddArgs {
    /// Activity name (must be unique).
    pub name: String,

    /// Display color as `#RRGGBB`.
    #[arg(long)]
    pub color: Option<Color>,
}

#[derive(Debug, Args)]
pub struct ActivityEditArgs {
    /// Activity id.
    pub id: i64,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// New color as `#RRGGBB`.
    #[arg(long)]
    pub color: Option<Color>,
}

pub async fn add<W: Write>(writer: &mut W, tempo: &Tempo, args: &ActivityAddArgs) -> Result<()> {
    let activity = tempo
        .create_activity(args.name.clone(), args.color.clone())
        .await
        .context("failed to create activity")?;
    writeln!(
        writer,
        "Created activity {} {} ({})",
        activity.id, activity.name, activity.color
    )?;
    Ok(())
}

pub async fn list<W: Write>(writer: &mut W, tempo: &Tempo, json: bool) -> Result<()> {
    let activities = tempo.list_activities().await?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&activities)?)?;
        return Ok(());
    }

    if activities.is_empty() {
        writeln!(writer, "No activities. Create one with 'tempo activity add <name>'.")?;
        return Ok(());
    }

    writeln!(writer, "{:<4}  {:<20}  Color", "ID", "Name")?;
    for activity in &activities {
        writeln!(
            writer,
            "{:<4}  {:<20}  {}",
            activity.id, activity.name, activity.color
        )?;
    }
    Ok(())
}

pub async fn edit<W: Write>(writer: &mut W, tempo: &Tempo, args: &ActivityEditArgs) -> Result<()> {
    if args.name.is_none() && args.color.is_none() {
        anyhow::bail!("nothing to change: pass --name and/or --color");
    }
    let activity = tempo
        .update_activity(ActivityId::new(args.id), args.name.clone(), args.color.clone())
        .await
        .context("failed to update activity")?;
    writeln!(
        writer,
        "Updated activity {} {} ({})",
        activity.id, activity.name, activity.color
    )?;
    Ok(())
}

pub async fn remove<W: Write>(writer: &mut W, tempo: &Tempo, id: i64) -> Result<()> {
    tempo
        .delete_activity(ActivityId::new(id))
        .await
        .context("failed to delete activity")?;
    writeln!(writer, "Deleted activity {id} with its entries and goals")?;
    Ok(())
}
