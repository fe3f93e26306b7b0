//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::activity::{ActivityAddArgs, ActivityEditArgs};
use crate::commands::entries::LogArgs;
use crate::commands::goal::GoalSetArgs;
use crate::commands::timer::StartArgs;
use crate::commands::util::Period;

/// Local time tracker.
///
/// Log time against activities, tag entries, set goals and review where the
/// hours went.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage activity types.
    #[command(subcommand)]
    Activity(ActivityAction),

    /// Start the timer, stopping any running entry.
    Start(StartArgs),

    /// Stop the running timer.
    Stop,

    /// Show the running timer.
    Status,

    /// Log a completed entry.
    Log(LogArgs),

    /// List entries for a period.
    Entries {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Manage a single entry.
    #[command(subcommand)]
    Entry(EntryAction),

    /// Manage tags.
    #[command(subcommand)]
    Tag(TagAction),

    /// Manage goals.
    #[command(subcommand)]
    Goal(GoalAction),

    /// Show totals per activity and goal progress.
    Stats {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a JSON backup of all data.
    Export {
        /// Destination file.
        file: PathBuf,
    },

    /// Load a JSON backup into the database.
    Import {
        /// Backup file to read.
        file: PathBuf,
    },

    /// Print the database schema.
    Schema,
}

#[derive(Debug, Subcommand)]
pub enum ActivityAction {
    /// Create an activity type.
    Add(ActivityAddArgs),
    /// List activity types.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Rename or recolor an activity type.
    Edit(ActivityEditArgs),
    /// Delete an activity type with its entries and goals.
    Rm {
        /// Activity id.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum EntryAction {
    /// Delete an entry.
    Rm {
        /// Entry id.
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum TagAction {
    /// Create a tag.
    Add {
        /// Tag name.
        name: String,
    },
    /// List tags.
    List,
    /// Delete a tag and its links.
    Rm {
        /// Tag id.
        id: i64,
    },
    /// Attach a tag to an entry.
    Attach {
        /// Entry id.
        entry: i64,
        /// Tag name.
        tag: String,
    },
    /// Detach a tag from an entry.
    Detach {
        /// Entry id.
        entry: i64,
        /// Tag name.
        tag: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum GoalAction {
    /// Create a goal for an activity.
    Set(GoalSetArgs),
    /// List goals.
    List,
    /// Delete a goal.
    Rm {
        /// Goal id.
        id: i64,
    },
}

/// Period selection shared by `entries` and `stats`.
#[derive(Debug, Default, Args)]
#[group(multiple = false)]
pub struct PeriodArgs {
    /// Today.
    #[arg(long)]
    pub day: bool,

    /// The current week (default).
    #[arg(long)]
    pub week: bool,

    /// The current month.
    #[arg(long)]
    pub month: bool,
}

impl PeriodArgs {
    pub const fn period(&self) -> Period {
        if self.day {
            Period::Day
        } else if self.month {
            Period::Month
        } else {
            Period::Week
        }
    }
}
