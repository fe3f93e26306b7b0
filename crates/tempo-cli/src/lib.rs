//! Tempo CLI library.
//!
//! Argument definitions, configuration and one module per subcommand. Each
//! command writes to a caller-supplied writer so it can be tested without a
//! terminal.

mod cli;
pub mod commands;
mod config;

pub use cli::{ActivityAction, Cli, Commands, EntryAction, GoalAction, PeriodArgs, TagAction};
pub use config::Config;
