//! Goals: target durations per activity and period.
//!
//! [`GoalType`] and [`GoalPeriod`] are persisted by name. The names returned
//! by [`StoredEnum::stored_name`] are part of the on-disk format and must not
//! change; add new variants instead of renaming old ones.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, GoalId, ValidationError};

/// An enumeration persisted by a stable name rather than its ordinal.
pub trait StoredEnum: Sized + Copy + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Human-readable kind used in error messages.
    const KIND: &'static str;

    /// The persisted name of this variant.
    fn stored_name(self) -> &'static str;

    /// Looks a variant up by its persisted name.
    ///
    /// Returns `None` for names written by a different schema version.
    fn from_stored_name(name: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.stored_name() == name)
    }
}

/// Whether a goal sets a floor or a ceiling on tracked time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalType {
    /// Spend at least the target.
    Minimum,
    /// Spend at most the target.
    Maximum,
}

/// The calendar window a goal is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalPeriod {
    Day,
    Week,
    Month,
}

impl StoredEnum for GoalType {
    const VARIANTS: &'static [Self] = &[Self::Minimum, Self::Maximum];
    const KIND: &'static str = "goal type";

    fn stored_name(self) -> &'static str {
        match self {
            Self::Minimum => "MINIMUM",
            Self::Maximum => "MAXIMUM",
        }
    }
}

impl StoredEnum for GoalPeriod {
    const VARIANTS: &'static [Self] = &[Self::Day, Self::Week, Self::Month];
    const KIND: &'static str = "goal period";

    fn stored_name(self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
        }
    }
}

/// Implements lower-case `Display`, case-insensitive `FromStr` and by-name serde.
macro_rules! stored_enum_text {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.stored_name().to_ascii_lowercase())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_stored_name(&s.trim().to_ascii_uppercase()).ok_or_else(|| {
                    ValidationError::UnknownVariant {
                        kind: Self::KIND,
                        value: s.to_string(),
                    }
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.stored_name())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_stored_name(&s).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown {}: {s}", Self::KIND))
                })
            }
        }
    };
}

stored_enum_text!(GoalType);
stored_enum_text!(GoalPeriod);

/// A target duration for one activity over a recurring period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub activity_id: ActivityId,
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub target_ms: i64,
    pub created_on: NaiveDate,
}

impl Goal {
    /// Checks the positive-target invariant after an in-place edit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_target(self.target_ms)
    }

    /// Whether `tracked_ms` satisfies this goal.
    pub const fn is_met(&self, tracked_ms: i64) -> bool {
        match self.goal_type {
            GoalType::Minimum => tracked_ms >= self.target_ms,
            GoalType::Maximum => tracked_ms <= self.target_ms,
        }
    }
}

/// A goal that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGoal {
    pub activity_id: ActivityId,
    pub goal_type: GoalType,
    pub period: GoalPeriod,
    pub target_ms: i64,
    pub created_on: NaiveDate,
}

impl NewGoal {
    /// Creates a goal, rejecting non-positive targets.
    pub fn new(
        activity_id: ActivityId,
        goal_type: GoalType,
        period: GoalPeriod,
        target_ms: i64,
        created_on: NaiveDate,
    ) -> Result<Self, ValidationError> {
        check_target(target_ms)?;
        Ok(Self {
            activity_id,
            goal_type,
            period,
            target_ms,
            created_on,
        })
    }

    /// Attaches the row id assigned by the store.
    #[must_use]
    pub const fn with_id(self, id: GoalId) -> Goal {
        Goal {
            id,
            activity_id: self.activity_id,
            goal_type: self.goal_type,
            period: self.period,
            target_ms: self.target_ms,
            created_on: self.created_on,
        }
    }
}

fn check_target(target_ms: i64) -> Result<(), ValidationError> {
    if target_ms <= 0 {
        return Err(ValidationError::NonPositiveTarget { target_ms });
    }
    Ok(())
}
