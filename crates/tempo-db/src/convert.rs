//! Conversions between domain values and `SQLite` primitives.
//!
//! Instants are stored as epoch milliseconds, dates as ISO 8601 strings
//! (`YYYY-MM-DD`) and enumerations by their stored name. Every decoding
//! direction returns `None` instead of failing: a stored value that no longer
//! decodes is a migration hazard for the caller to handle, not a crash.

use chrono::{DateTime, NaiveDate, Utc};
use tempo_core::StoredEnum;

/// Encodes an instant as epoch milliseconds.
pub fn instant_to_millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

/// Decodes epoch milliseconds; `None` when outside chrono's representable range.
pub fn millis_to_instant(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Encodes a local date in its canonical ISO form.
pub fn date_to_string(date: NaiveDate) -> String {
    date.to_string()
}

/// Decodes an ISO date; `None` when malformed.
pub fn string_to_date(value: &str) -> Option<NaiveDate> {
    value.parse().ok()
}

/// Encodes an enumeration by its stable name.
pub fn enum_to_name<E: StoredEnum>(value: E) -> &'static str {
    value.stored_name()
}

/// Decodes an enumeration by name; `None` when the name is unknown.
pub fn name_to_enum<E: StoredEnum>(name: &str) -> Option<E> {
    E::from_stored_name(name)
}
