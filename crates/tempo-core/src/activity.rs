//! Activity types: the things time is spent on.

use serde::{Deserialize, Serialize};

use crate::types::{ActivityId, Color, ValidationError, validate_name};

/// A named, colored category of work referenced by entries and goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityType {
    pub id: ActivityId,
    pub name: String,
    pub color: Color,
}

impl ActivityType {
    /// Checks the fields a caller may have edited in place.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("activity name", &self.name)?;
        Ok(())
    }

    /// Trims the name after an in-place edit, rejecting blank names.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("activity name", &self.name)?,
            ..self
        })
    }
}

/// An activity type that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub name: String,
    pub color: Color,
}

impl NewActivity {
    /// Creates a new activity after trimming and validating the name.
    pub fn new(name: &str, color: Color) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_name("activity name", name)?,
            color,
        })
    }

    /// Attaches the row id assigned by the store.
    #[must_use]
    pub fn with_id(self, id: ActivityId) -> ActivityType {
        ActivityType {
            id,
            name: self.name,
            color: self.color,
        }
    }
}
