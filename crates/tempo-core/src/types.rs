//! Core type definitions with validation.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty or only whitespace.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The color was not a `#RRGGBB` hex string.
    #[error("invalid color {value:?}: expected #RRGGBB")]
    InvalidColor { value: String },

    /// A completed entry ended before it started.
    #[error("entry ends at {end} before it starts at {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A goal target was zero or negative.
    #[error("goal target must be positive, got {target_ms}ms")]
    NonPositiveTarget { target_ms: i64 },

    /// A time range was empty or inverted.
    #[error("range start {start} must be before end {end}")]
    EmptyRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// An enumerated value did not match any known name.
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Generates a row identifier newtype over a `SQLite` integer key.
macro_rules! define_row_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw row id.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw row id.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_row_id!(
    /// Identifier of an [`ActivityType`](crate::ActivityType).
    ActivityId
);

define_row_id!(
    /// Identifier of a [`TimeEntry`](crate::TimeEntry).
    EntryId
);

define_row_id!(
    /// Identifier of a [`Tag`](crate::Tag).
    TagId
);

define_row_id!(
    /// Identifier of a [`Goal`](crate::Goal).
    GoalId
);

/// Trims a user-provided name and rejects blank values.
pub fn validate_name(field: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Normalizes an optional free-text note: blank notes become `None`.
pub fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Drops sub-millisecond precision.
///
/// Instants are persisted as epoch milliseconds, so every instant the domain
/// hands to the store goes through here first.
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// A display color in `#RRGGBB` form, stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Fallback color for activities created without one.
    pub const DEFAULT_HEX: &'static str = "#4CAF50";

    /// Parses a `#RRGGBB` color. The leading `#` is optional.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor {
                value: value.to_string(),
            });
        }
        Ok(Self(format!("#{}", hex.to_ascii_uppercase())))
    }

    /// Returns the color as a `#RRGGBB` string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self(Self::DEFAULT_HEX.to_string())
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_id_parses_and_displays() {
        let id: EntryId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<EntryId>().is_err());
    }

    #[test]
    fn row_id_serializes_transparently() {
        let json = serde_json::to_string(&ActivityId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ActivityId::new(7));
    }

    #[test]
    fn validate_name_trims_and_rejects_blank() {
        assert_eq!(validate_name("name", "  Coding ").unwrap(), "Coding");
        assert_eq!(
            validate_name("name", "   ").unwrap_err(),
            ValidationError::Empty { field: "name" }
        );
    }

    #[test]
    fn normalize_note_drops_blank() {
        assert_eq!(normalize_note(Some("  ".to_string())), None);
        assert_eq!(
            normalize_note(Some(" standup ".to_string())),
            Some("standup".to_string())
        );
        assert_eq!(normalize_note(None), None);
    }

    #[test]
    fn color_normalizes_hex() {
        assert_eq!(Color::parse("#ff8800").unwrap().as_str(), "#FF8800");
        assert_eq!(Color::parse("00aa11").unwrap().as_str(), "#00AA11");
    }

    #[test]
    fn color_rejects_malformed() {
        assert!(Color::parse("#FFF").is_err());
        assert!(Color::parse("#GG0000").is_err());
        assert!(Color::parse("").is_err());
    }

    #[test]
    fn color_serde_rejects_invalid() {
        let result: Result<Color, _> = serde_json::from_str("\"red\"");
        assert!(result.is_err());
    }

    #[test]
    fn truncate_to_millis_drops_nanos() {
        let instant = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(instant);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(truncated.timestamp_millis(), instant.timestamp_millis());
    }
}
