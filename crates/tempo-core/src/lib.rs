//! Core domain logic for the tempo time tracker.
//!
//! This crate contains the entity types and the pure logic around them:
//! - Entities: activity types, time entries, tags, goals
//! - Periods: day/week/month arithmetic on local dates
//! - Statistics: per-activity and per-day totals, goal progress

pub mod activity;
pub mod entry;
pub mod goal;
pub mod period;
pub mod stats;
pub mod tag;
pub mod types;

pub use activity::{ActivityType, NewActivity};
pub use entry::{NewTimeEntry, TimeEntry};
pub use goal::{Goal, GoalPeriod, GoalType, NewGoal, StoredEnum};
pub use period::{DateSpan, TimeRange, WeekStart, midnight_in, period_containing};
pub use stats::{ActivityTotal, DailyTotal, GoalProgress};
pub use tag::{Tag, TimeEntryTag};
pub use types::{ActivityId, Color, EntryId, GoalId, TagId, ValidationError};
