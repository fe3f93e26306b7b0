//! `tempo tag` subcommands.

use std::io::Write;

use anyhow::{Context, Result};

use tempo_app::Tempo;
use tempo_core::{EntryId, TagId};

pub async fn add<W: Write>(writer: &mut W, tempo: &Tempo, name: &str) -> Result<()> {
    let tag = tempo
        .create_tag(name.to_string())
        .await
        .context("failed to create tag")?;
    writeln!(writer, "Created tag {} {}", tag.id, tag.name)?;
    Ok(())
}

pub async fn list<W: Write>(writer: &mut W, tempo: &Tempo) -> Result<()> {
    let tags = tempo.list_tags().await?;
    if tags.is_empty() {
        writeln!(writer, "No tags.")?;
        return Ok(());
    }
    writeln!(writer, "{:<4}  Name", "ID")?;
    for tag in &tags {
        writeln!(writer, "{:<4}  {}", tag.id, tag.name)?;
    }
    Ok(())
}

pub async fn remove<W: Write>(writer: &mut W, tempo: &Tempo, id: i64) -> Result<()> {
    tempo
        .delete_tag(TagId::new(id))
        .await
        .context("failed to delete tag")?;
    writeln!(writer, "Deleted tag {id}")?;
    Ok(())
}

pub async fn attach<W: Write>(writer: &mut W, tempo: &Tempo, entry: i64, tag: &str) -> Result<()> {
    let tag = tempo.find_tag(tag.to_string()).await?;
    let added = tempo
        .tag_entry(EntryId::new(entry), tag.id)
        .await
        .context("failed to tag entry")?;
    if added {
        writeln!(writer, "Tagged entry {entry} with {}", tag.name)?;
    } else {
        writeln!(writer, "Entry {entry} already tagged with {}", tag.name)?;
    }
    Ok(())
}

pub async fn detach<W: Write>(writer: &mut W, tempo: &Tempo, entry: i64, tag: &str) -> Result<()> {
    let tag = tempo.find_tag(tag.to_string()).await?;
    let removed = tempo
        .untag_entry(EntryId::new(entry), tag.id)
        .await
        .context("failed to untag entry")?;
    if removed {
        writeln!(writer, "Removed {} from entry {entry}", tag.name)?;
    } else {
        writeln!(writer, "Entry {entry} is not tagged with {}", tag.name)?;
    }
    Ok(())
}
