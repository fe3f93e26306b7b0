use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tempo_app::Tempo;
use tempo_cli::commands::{activity, backup, entries, goal, schema, stats, status, tag, timer};
use tempo_cli::{ActivityAction, Cli, Commands, Config, EntryAction, GoalAction, TagAction};
use tempo_db::Store;

/// Load config and open the store, ensuring the parent directory exists.
fn open_store(config_path: Option<&Path>) -> Result<(Store, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let store = Store::open(&config.database_path).context("failed to open database")?;
    Ok((store, config))
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
async fn dispatch<W: Write>(
    out: &mut W,
    tempo: &Tempo,
    config: &Config,
    command: &Commands,
) -> Result<()> {
    let now = Utc::now();
    let today = Local::now().date_naive();

    match command {
        Commands::Activity(action) => match action {
            ActivityAction::Add(args) => activity::add(out, tempo, args).await,
            ActivityAction::List { json } => activity::list(out, tempo, *json).await,
            ActivityAction::Edit(args) => activity::edit(out, tempo, args).await,
            ActivityAction::Rm { id } => activity::remove(out, tempo, *id).await,
        },
        Commands::Start(args) => timer::start(out, tempo, args, now).await,
        Commands::Stop => timer::stop(out, tempo, now).await,
        Commands::Status => status::run(out, tempo, now).await,
        Commands::Log(args) => entries::log(out, tempo, args, now).await,
        Commands::Entries { period, json } => {
            let period = period.period();
            let span = period.span(today, config.week_start);
            let range = span.to_range(&Local)?;
            entries::list(out, tempo, period.label(), span, range, *json, now).await
        }
        Commands::Entry(EntryAction::Rm { id }) => entries::remove(out, tempo, *id).await,
        Commands::Tag(action) => match action {
            TagAction::Add { name } => tag::add(out, tempo, name).await,
            TagAction::List => tag::list(out, tempo).await,
            TagAction::Rm { id } => tag::remove(out, tempo, *id).await,
            TagAction::Attach { entry, tag: name } => tag::attach(out, tempo, *entry, name).await,
            TagAction::Detach { entry, tag: name } => tag::detach(out, tempo, *entry, name).await,
        },
        Commands::Goal(action) => match action {
            GoalAction::Set(args) => goal::set(out, tempo, args, today).await,
            GoalAction::List => goal::list(out, tempo).await,
            GoalAction::Rm { id } => goal::remove(out, tempo, *id).await,
        },
        Commands::Stats { period, json } => {
            stats::run(
                out,
                tempo,
                period.period(),
                today,
                config.week_start,
                Local,
                *json,
                now,
            )
            .await
        }
        Commands::Export { file } => backup::export(out, tempo, file, now).await,
        Commands::Import { file } => backup::import(out, tempo, file).await,
        Commands::Schema => schema::run(out),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match &cli.command {
        // Schema doesn't need a database
        Some(Commands::Schema) => schema::run(&mut io::stdout().lock())?,
        Some(command) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let tempo = Tempo::new(store.clone());
            dispatch(&mut io::stdout().lock(), &tempo, &config, command).await?;
            drop(tempo);
            store.close().context("failed to close database")?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
