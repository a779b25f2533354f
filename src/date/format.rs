use std::fmt::Display;

use chrono::{DateTime, Datelike, TimeDelta, TimeZone};

use super::{
    end_of_day, shift_days, Relative, FULLER_FMT, FULLER_HUMAN_FMT, FULL_FMT, FULL_HUMAN_FMT,
    WEEKDAY_FMT,
};

/// Render a due instant as a short label relative to `now`.
///
/// In order: `Yesterday`/`Today`/`Tomorrow` when `due` is exactly the end of
/// that day, the weekday name when `due` lies within the next seven days, and
/// otherwise the date, with its year only when it differs from `now`'s.
/// `human` picks the long form of the date renderings.
pub fn format_due<Tz>(due: &DateTime<Tz>, now: &DateTime<Tz>, human: bool) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let today = now.date_naive();
    let tz = now.timezone();

    for relative in Relative::ALL {
        let marker =
            shift_days(today, relative.offset_days()).and_then(|date| end_of_day(date, &tz));
        if marker.as_ref() == Some(due) {
            return relative.label().to_owned();
        }
    }

    let within_week = now
        .clone()
        .checked_add_signed(TimeDelta::days(7))
        .map_or(true, |limit| *due < limit);
    if due > now && within_week {
        return due.format(WEEKDAY_FMT).to_string();
    }

    let template = match (due.year() != now.year(), human) {
        (true, true) => FULLER_HUMAN_FMT,
        (true, false) => FULLER_FMT,
        (false, true) => FULL_HUMAN_FMT,
        (false, false) => FULL_FMT,
    };
    due.format(template).to_string()
}
