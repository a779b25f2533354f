//! Due-date expressions.
//!
//! [`parse_due`] turns a short token such as `tom`, `fri` or `15-03-2025`
//! into the end of the named day, and [`format_due`] turns such an instant
//! back into the shortest label that identifies it relative to `now`.
//!
//! Both take the reference instant explicitly; nothing here reads the clock.

mod format;
mod parse;

use chrono::format::{Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDate, ParseResult, TimeDelta, TimeZone, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

pub use format::format_due;
pub use parse::{parse_absolute, parse_due, MIN_TOKEN_LEN};

/// Day markers resolved against the reference instant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Relative {
    Yesterday,
    Today,
    Tomorrow,
}

impl Relative {
    pub const ALL: [Relative; 3] = [Relative::Yesterday, Relative::Today, Relative::Tomorrow];

    pub fn offset_days(self) -> i64 {
        match self {
            Relative::Yesterday => -1,
            Relative::Today => 0,
            Relative::Tomorrow => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Relative::Yesterday => "Yesterday",
            Relative::Today => "Today",
            Relative::Tomorrow => "Tomorrow",
        }
    }
}

/// Weekday candidates in prefix-matching order; the first match wins.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Where the year of an absolute date comes from.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum YearSource {
    Explicit,
    Current,
}

// chrono alone accepts one-digit fields and signed or short years
static DAY_MONTH_YEAR_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}-\d{2}-\d{4}$").unwrap_or_else(|e| panic!("Invalid date regex: {e}"))
});

static DAY_MONTH_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}-\d{2}$").unwrap_or_else(|e| panic!("Invalid date regex: {e}"))
});

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DateTemplate {
    pub pattern: &'static str,
    pub year: YearSource,
}

impl DateTemplate {
    /// Strictly parse `token` against this template: two-digit day and month,
    /// plus a four-digit year for [`YearSource::Explicit`]. Year-less
    /// templates take `current_year`.
    ///
    /// Returns `None` when the token does not have the template's shape.
    pub fn parse(&self, token: &str, current_year: i32) -> Option<ParseResult<NaiveDate>> {
        let shape = match self.year {
            YearSource::Explicit => &DAY_MONTH_YEAR_SHAPE,
            YearSource::Current => &DAY_MONTH_SHAPE,
        };
        if !shape.is_match(token) {
            return None;
        }

        let mut parsed = Parsed::new();
        Some(
            chrono::format::parse(&mut parsed, token, StrftimeItems::new(self.pattern))
                .and_then(|()| match self.year {
                    YearSource::Current => parsed.set_year(current_year.into()),
                    YearSource::Explicit => Ok(()),
                })
                .and_then(|()| parsed.to_naive_date()),
        )
    }
}

/// Absolute date templates, tried in order.
pub const DATE_TEMPLATES: [DateTemplate; 2] = [
    DateTemplate {
        pattern: "%d-%m-%Y",
        year: YearSource::Explicit,
    },
    DateTemplate {
        pattern: "%d-%m",
        year: YearSource::Current,
    },
];

pub const WEEKDAY_FMT: &str = "%A";
pub const FULLER_HUMAN_FMT: &str = "%a, %d %b %Y";
pub const FULL_HUMAN_FMT: &str = "%a, %d %b";
pub const FULLER_FMT: &str = "%d-%m-%Y";
pub const FULL_FMT: &str = "%d-%m";

/// 23:59:59 of `date` in `tz`, or `None` if that wall time is skipped there.
pub fn end_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(23, 59, 59)?;
    tz.from_local_datetime(&naive).latest()
}

/// Calendar date `days` days away from `date`.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days)?)
}
