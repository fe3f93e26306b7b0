//! End-to-end tests driving the `tempo` binary against a temporary database.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn tempo_binary() -> String {
    env!("CARGO_BIN_EXE_tempo").to_string()
}

/// Runs `tempo` with its database at `db` and no user configuration.
fn tempo(home: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(tempo_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("TEMPO_DATABASE_PATH", db)
        .env_remove("TEMPO_WEEK_START")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run tempo")
}

fn stdout_of(output: &Output, what: &str) -> String {
    assert!(
        output.status.success(),
        "{what} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_track_export_import_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();
    let db = home.join("data").join("tempo.db");

    let out = stdout_of(
        &tempo(home, &db, &["activity", "add", "Coding", "--color", "#123ABC"]),
        "activity add",
    );
    assert_eq!(out.trim(), "Created activity 1 Coding (#123ABC)");
    assert!(db.exists(), "database file should be created");

    let out = stdout_of(
        &tempo(
            home,
            &db,
            &[
                "log", "Coding", "--start", "3 hours ago", "--end", "2 hours ago", "--tag",
                "deep", "--note", "parser",
            ],
        ),
        "log",
    );
    assert_eq!(out.trim(), "Logged 1h 0m of Coding (entry 1)");

    let out = stdout_of(&tempo(home, &db, &["start", "Coding"]), "start");
    assert!(out.starts_with("Started Coding at "), "{out}");

    let out = stdout_of(&tempo(home, &db, &["status"]), "status");
    assert!(out.contains("Running: Coding since "), "{out}");

    let out = stdout_of(&tempo(home, &db, &["stop"]), "stop");
    assert!(out.starts_with("Stopped Coding after "), "{out}");

    let out = stdout_of(&tempo(home, &db, &["stop"]), "second stop");
    assert_eq!(out.trim(), "No timer running.");

    let backup = home.join("backup.json");
    let out = stdout_of(
        &tempo(home, &db, &["export", backup.to_str().unwrap()]),
        "export",
    );
    assert!(
        out.starts_with("Exported 1 activities, 1 tags, 0 goals and 2 entries"),
        "{out}"
    );

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(parsed["version"], 1);
    let entries = parsed["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["note"], "parser");
    assert_eq!(entries[0]["tag_ids"][0], 1);
    assert!(entries[1]["end"].is_string(), "stopped entry has an end");

    // Import into a fresh database
    let other = home.join("other.db");
    let out = stdout_of(
        &tempo(home, &other, &["import", backup.to_str().unwrap()]),
        "import",
    );
    assert!(out.contains("Activities: 1 new, 0 existing"), "{out}");
    assert!(out.contains("Entries:    2 (1 tag links)"), "{out}");

    let out = stdout_of(
        &tempo(home, &other, &["activity", "list", "--json"]),
        "activity list",
    );
    let activities: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(activities[0]["name"], "Coding");
    assert_eq!(activities[0]["color"], "#123ABC");
}

#[test]
fn test_errors_exit_nonzero() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("tempo.db");

    let output = tempo(temp.path(), &db, &["start", "Nothing"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("activity Nothing not found"), "{stderr}");

    let output = tempo(temp.path(), &db, &["stats", "--day", "--week"]);
    assert!(!output.status.success());
}

#[test]
fn test_schema_does_not_touch_database() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("tempo.db");

    let out = stdout_of(&tempo(temp.path(), &db, &["schema"]), "schema");
    assert!(out.contains("CREATE TABLE time_entries"));
    assert!(!db.exists(), "schema should not open the database");
}
