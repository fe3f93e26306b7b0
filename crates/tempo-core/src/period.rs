//! Calendar arithmetic for days, weeks and months.
//!
//! Periods are computed on local dates and converted to half-open UTC
//! ranges at local midnight, so a "day" in a DST transition may be 23 or 25
//! hours long.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::goal::GoalPeriod;
use crate::types::ValidationError;

/// A half-open `[start, end)` interval of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a range, rejecting empty or inverted bounds.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Milliseconds of `[start, end)` that fall inside this range.
    pub fn overlap_ms(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        let lo = start.max(self.start);
        let hi = end.min(self.end);
        (hi - lo).num_milliseconds().max(0)
    }
}

/// First day of the week for weekly periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

/// A half-open `[first, end)` span of local dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub first: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Iterates over every date in the span.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.first.iter_days().take_while(move |day| *day < end)
    }

    /// The last date inside the span.
    pub fn last(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.first)
    }

    /// Converts the span to UTC using local midnights in `tz`.
    pub fn to_range<Tz: TimeZone>(&self, tz: &Tz) -> Result<TimeRange, ValidationError> {
        TimeRange::new(midnight_in(tz, self.first), midnight_in(tz, self.end))
    }
}

/// The period of kind `period` that contains `date`.
pub fn period_containing(period: GoalPeriod, date: NaiveDate, week_start: WeekStart) -> DateSpan {
    match period {
        GoalPeriod::Day => DateSpan {
            first: date,
            end: next_day(date),
        },
        GoalPeriod::Week => {
            let offset = match week_start {
                WeekStart::Monday => date.weekday().num_days_from_monday(),
                WeekStart::Sunday => date.weekday().num_days_from_sunday(),
            };
            let first = date
                .checked_sub_days(Days::new(u64::from(offset)))
                .unwrap_or(NaiveDate::MIN);
            let end = first
                .checked_add_days(Days::new(7))
                .unwrap_or(NaiveDate::MAX);
            DateSpan { first, end }
        }
        GoalPeriod::Month => {
            let first = date.with_day0(0).unwrap_or(date);
            let end = first
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX);
            DateSpan { first, end }
        }
    }
}

/// The UTC instant of local midnight at the start of `date`.
///
/// Ambiguous midnights (DST fall-back) resolve to the earlier instant; a
/// midnight skipped by a DST gap resolves to 1am local.
pub fn midnight_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::default());
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            let one_am = midnight.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&one_am).earliest()
        })
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(NaiveDate::MAX)
}
