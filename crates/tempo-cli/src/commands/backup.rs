//! `tempo export` and `tempo import`.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};

use tempo_app::Tempo;

pub async fn export<W: Write>(
    writer: &mut W,
    tempo: &Tempo,
    file: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let summary = tempo.export_backup(file.to_path_buf(), now).await?;
    writeln!(
        writer,
        "Exported {} activities, {} tags, {} goals and {} entries to {}",
        summary.activities,
        summary.tags,
        summary.goals,
        summary.entries,
        file.display()
    )?;
    Ok(())
}

pub async fn import<W: Write>(writer: &mut W, tempo: &Tempo, file: &Path) -> Result<()> {
    let stats = tempo.import_backup(file.to_path_buf()).await?;
    writeln!(writer, "Imported from {}", file.display())?;
    writeln!(
        writer,
        "Activities: {} new, {} existing",
        stats.activities_created, stats.activities_reused
    )?;
    writeln!(
        writer,
        "Tags:       {} new, {} existing",
        stats.tags_created, stats.tags_reused
    )?;
    writeln!(writer, "Goals:      {}", stats.goals)?;
    writeln!(
        writer,
        "Entries:    {} ({} tag links)",
        stats.entries, stats.tag_links
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tempo_app::LogEntry;
    use tempo_core::ActivityId;

    use crate::testing::{output, tempo, tempo_with_activities, ts};

    #[tokio::test]
    async fn export_then_import_elsewhere() {
        let source = tempo_with_activities(&["Coding", "Reading"]).await;
        source
            .log_entry(LogEntry {
                activity_id: ActivityId::new(2),
                start: ts("2025-03-01T09:00:00Z"),
                end: ts("2025-03-01T10:00:00Z"),
                note: None,
                tags: vec!["books".to_string(), "evening".to_string()],
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested").join("backup.json");
        let mut out = Vec::new();
        export(&mut out, &source, &file, ts("2025-03-02T00:00:00Z"))
            .await
            .unwrap();
        let text = output(out);
        assert!(text.starts_with("Exported 2 activities, 2 tags, 0 goals and 1 entries to "));

        let target = tempo_with_activities(&["Reading"]).await;
        let mut out = Vec::new();
        import(&mut out, &target, &file).await.unwrap();
        let text = output(out);
        let summary = text.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_snapshot!(summary, @r"
        Activities: 1 new, 1 existing
        Tags:       2 new, 0 existing
        Goals:      0
        Entries:    1 (2 tag links)
        ");
    }

    #[tokio::test]
    async fn import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.json");
        std::fs::write(&file, "{\"version\": 99}").unwrap();
        let err = import(&mut Vec::new(), &tempo(), &file).await.unwrap_err();
        assert!(err.to_string().contains("invalid backup file"));
    }
}
