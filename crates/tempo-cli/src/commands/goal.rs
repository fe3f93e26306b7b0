//! `tempo goal` subcommands.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;

use tempo_app::{SetGoal, Tempo};
use tempo_core::{GoalId, GoalPeriod, GoalType};

use super::util::{activity_names, format_duration};

#[derive(Debug, Args)]
pub struct GoalSetArgs {
    /// Activity name or id.
    pub activity: String,

    /// `minimum` (spend at least) or `maximum` (spend at most).
    #[arg(long = "type")]
    pub goal_type: GoalType,

    /// `day`, `week` or `month`.
    #[arg(long)]
    pub period: GoalPeriod,

    /// Target in minutes.
    #[arg(long)]
    pub minutes: i64,
}

const fn bound(goal_type: GoalType) -> &'static str {
    match goal_type {
        GoalType::Minimum => "at least",
        GoalType::Maximum => "at most",
    }
}

pub async fn set<W: Write>(
    writer: &mut W,
    tempo: &Tempo,
    args: &GoalSetArgs,
    today: NaiveDate,
) -> Result<()> {
    let target_ms = args
        .minutes
        .checked_mul(60_000)
        .context("goal target is too large")?;
    let activity = tempo.find_activity(args.activity.clone()).await?;
    let goal = tempo
        .set_goal(SetGoal {
            activity_id: activity.id,
            goal_type: args.goal_type,
            period: args.period,
            target_ms,
            created_on: today,
        })
        .await
        .context("failed to set goal")?;
    writeln!(
        writer,
        "Goal {}: {} {} of {} per {}",
        goal.id,
        bound(goal.goal_type),
        format_duration(goal.target_ms),
        activity.name,
        goal.period
    )?;
    Ok(())
}

pub async fn list<W: Write>(writer: &mut W, tempo: &Tempo) -> Result<()> {
    let goals = tempo.list_goals().await?;
    if goals.is_empty() {
        writeln!(writer, "No goals.")?;
        return Ok(());
    }
    let names = activity_names(tempo).await?;
    writeln!(
        writer,
        "{:<4}  {:<20}  {:<8}  {:<6}  {:<8}  Since",
        "ID", "Activity", "Type", "Period", "Target"
    )?;
    for goal in &goals {
        let name = names
            .get(&goal.activity_id)
            .map_or("(deleted)", String::as_str);
        writeln!(
            writer,
            "{:<4}  {:<20}  {:<8}  {:<6}  {:<8}  {}",
            goal.id,
            name,
            goal.goal_type,
            goal.period,
            format_duration(goal.target_ms),
            goal.created_on
        )?;
    }
    Ok(())
}

pub async fn remove<W: Write>(writer: &mut W, tempo: &Tempo, id: i64) -> Result<()> {
    tempo
        .delete_goal(GoalId::new(id))
        .await
        .context("failed to delete goal")?;
    writeln!(writer, "Deleted goal {id}")?;
    Ok(())
}
