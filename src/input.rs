use chrono::{DateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::{end_of_day, parse_due};
use crate::error::{AppError, DueDateError};
use crate::task::Content;

// "... due <token>" at the very end of the input
static DUE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\bdue\s+(\S+)$").unwrap_or_else(|e| panic!("Invalid due regex: {e}"))
});

/// Split raw task input into description and due date.
///
/// A trailing `due <token>` sets the due date and is removed from the
/// description; without one the task is due at the end of today.
pub fn parse_input<Tz: TimeZone>(
    input: &str,
    now: &DateTime<Tz>,
) -> Result<Content<Tz>, AppError> {
    let input = input.trim();

    let due_match = DUE_PATTERN
        .captures(input)
        .and_then(|caps| Some((caps.get(0)?, caps.get(1)?)));

    let (description, due) = match due_match {
        Some((whole, token)) => (&input[..whole.start()], parse_due(token.as_str(), now)?),
        None => {
            let today = now.date_naive();
            let due = end_of_day(today, &now.timezone())
                .ok_or(DueDateError::NonexistentLocalTime(today))?;
            (input, due)
        }
    };

    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::EmptyDescription);
    }

    Ok(Content {
        description: description.to_owned(),
        due,
    })
}
