use chrono::format::ParseErrorKind;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};
use tracing::debug;

use super::{end_of_day, shift_days, weekday_name, Relative, DATE_TEMPLATES, WEEKDAYS};
use crate::error::DueDateError;

/// Shorter tokens would prefix-match too many names to be useful.
pub const MIN_TOKEN_LEN: usize = 3;

/// Parse a due-date token into the end of the day it names.
///
/// Strategies are tried in order and the first match wins:
/// a prefix of `today`, `tomorrow` or `yesterday`; a prefix of a weekday name
/// (Sunday to Saturday), resolved to its next occurrence counting `now`'s day
/// as offset 0; an absolute date from [`DATE_TEMPLATES`].
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use due::date::parse_due;
///
/// let tz = FixedOffset::east_opt(0).unwrap();
/// let now = tz.with_ymd_and_hms(2025, 3, 12, 10, 30, 0).unwrap();
///
/// let due = parse_due("tom", &now).unwrap();
/// assert_eq!(due, tz.with_ymd_and_hms(2025, 3, 13, 23, 59, 59).unwrap());
/// ```
pub fn parse_due<Tz: TimeZone>(
    token: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>, DueDateError> {
    let token = token.trim().to_lowercase();
    if token.chars().count() < MIN_TOKEN_LEN {
        return Err(DueDateError::InputTooShort);
    }

    if let Some(relative) = Relative::ALL
        .into_iter()
        .find(|r| is_prefix_of(&token, r.label()))
    {
        debug!(token = %token, ?relative, "matched relative marker");
        return end_of_day_after(now, relative.offset_days());
    }

    if let Some(weekday) = WEEKDAYS
        .into_iter()
        .find(|wd| is_prefix_of(&token, weekday_name(*wd)))
    {
        let ahead = days_until(now.weekday(), weekday);
        debug!(token = %token, ?weekday, ahead, "matched weekday");
        return end_of_day_after(now, ahead);
    }

    let date = parse_absolute(&token, now.year())?;
    debug!(token = %token, %date, "matched absolute date");
    end_of_day(date, &now.timezone()).ok_or(DueDateError::NonexistentLocalTime(date))
}

/// Parse `token` against [`DATE_TEMPLATES`] in order.
///
/// A token without a template's exact shape (`dd-mm-yyyy` or `dd-mm`) moves
/// on to the next template. If no template accepts the token and one of them
/// matched its shape but found a field out of range, that failure is reported
/// instead of the generic one.
pub fn parse_absolute(token: &str, current_year: i32) -> Result<NaiveDate, DueDateError> {
    let mut range_failure = None;

    for template in DATE_TEMPLATES {
        match template.parse(token, current_year) {
            None => continue,
            Some(Ok(date)) => return Ok(date),
            Some(Err(err)) => {
                if range_failure.is_none()
                    && matches!(
                        err.kind(),
                        ParseErrorKind::OutOfRange | ParseErrorKind::Impossible
                    )
                {
                    range_failure = Some((template.pattern, err));
                }
            }
        }
    }

    Err(match range_failure {
        Some((template, source)) => DueDateError::FormatParseFailure {
            token: token.to_owned(),
            template,
            source,
        },
        None => DueDateError::NoPatternMatched {
            token: token.to_owned(),
            templates: DATE_TEMPLATES.iter().map(|t| t.pattern).collect(),
        },
    })
}

fn is_prefix_of(token: &str, name: &str) -> bool {
    name.to_lowercase().starts_with(token)
}

fn days_until(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_sunday());
    let to = i64::from(to.num_days_from_sunday());
    (to - from + 7) % 7
}

fn end_of_day_after<Tz: TimeZone>(
    now: &DateTime<Tz>,
    days: i64,
) -> Result<DateTime<Tz>, DueDateError> {
    let date = shift_days(now.date_naive(), days).ok_or(DueDateError::OutOfRange)?;
    end_of_day(date, &now.timezone()).ok_or(DueDateError::NonexistentLocalTime(date))
}
