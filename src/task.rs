use chrono::{DateTime, Local, TimeZone};
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use crate::date::format_due;
use crate::{import_datetime, LocalDT};

static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\S+)\b").unwrap_or_else(|e| panic!("Invalid keyword regex: {e}"))
});

/// The user-editable part of a task.
#[derive(Clone, Debug)]
pub struct Content<Tz: TimeZone = Local> {
    pub description: String,
    pub due: DateTime<Tz>,
}

#[derive(Clone, Debug)]
pub struct Task {
    pub id: Uuid,

    pub created: LocalDT,
    pub modified: LocalDT,
    pub completed: Option<LocalDT>,
    pub archived: Option<LocalDT>,

    pub content: Content,
}

impl Task {
    pub fn new(content: Content, now: LocalDT) -> Self {
        Task {
            id: Uuid::now_v7(),
            created: now,
            modified: now,
            completed: None,
            archived: None,
            content,
        }
    }

    pub fn from_db_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let id: String = row.get("id")?;
        let id = Uuid::parse_str(&id).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err))
        })?;
        let description: String = row.get("description")?;

        let created = timestamp_column(row, "created")?;
        let modified = timestamp_column(row, "modified")?;
        let due = timestamp_column(row, "due")?;
        let completed = optional_timestamp_column(row, "completed")?;
        let archived = optional_timestamp_column(row, "archived")?;

        Ok(Task {
            id,
            created,
            modified,
            completed,
            archived,
            content: Content { description, due },
        })
    }

    /// Text offered for editing: the description followed by the compact due
    /// date, which reads back through the same input parser.
    pub fn edit_line(&self, now: LocalDT) -> String {
        format!(
            "{} due {}",
            self.content.description,
            format_due(&self.content.due, &now, false)
        )
    }

    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        number: usize,
        now: LocalDT,
    ) -> std::fmt::Result {
        let check = if self.completed.is_some() { 'x' } else { ' ' };

        let due = format!("{:>11}", format_due(&self.content.due, &now, true));
        let due = if self.completed.is_none() && now > self.content.due {
            due.red()
        } else {
            due.cyan()
        };

        let description = KEYWORD_PATTERN
            .replace_all(&self.content.description, |caps: &regex::Captures| {
                caps[1].magenta().to_string()
            });

        write!(
            f,
            "{} {} {} {}",
            format!("{number:>2}").cyan(),
            format!("({check})").yellow(),
            due,
            description
        )
    }

    pub fn display(&self, number: usize, now: LocalDT) -> TaskDisplay<'_> {
        TaskDisplay {
            inner: self,
            number,
            now,
        }
    }
}

fn timestamp_column(row: &Row, column: &str) -> Result<LocalDT, rusqlite::Error> {
    let secs: i64 = row.get(column)?;
    import_datetime(secs).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, secs))
}

fn optional_timestamp_column(
    row: &Row,
    column: &str,
) -> Result<Option<LocalDT>, rusqlite::Error> {
    row.get::<_, Option<i64>>(column)?
        .map(|secs| {
            import_datetime(secs).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, secs))
        })
        .transpose()
}

pub struct TaskDisplay<'a> {
    inner: &'a Task,
    number: usize,
    now: LocalDT,
}

impl std::fmt::Display for TaskDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f, self.number, self.now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> LocalDT {
        Local.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap()
    }

    /// Rendered line without ANSI colors, whatever `colored` decided.
    fn plain(display: TaskDisplay<'_>) -> String {
        let ansi = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        ansi.replace_all(&display.to_string(), "").into_owned()
    }

    fn task(description: &str, due: LocalDT) -> Task {
        Task::new(
            Content {
                description: description.to_owned(),
                due,
            },
            now(),
        )
    }

    #[test]
    fn list_line_layout() {
        let due = Local.with_ymd_and_hms(2025, 3, 12, 23, 59, 59).unwrap();
        let line = plain(task("buy milk +errands", due).display(3, now()));
        assert_eq!(line, " 3 ( )       Today buy milk +errands");
    }

    #[test]
    fn completed_task_is_checked() {
        let due = Local.with_ymd_and_hms(2025, 3, 20, 23, 59, 59).unwrap();
        let mut t = task("file taxes", due);
        t.completed = Some(now());
        let line = plain(t.display(12, now()));
        assert_eq!(line, "12 (x) Thu, 20 Mar file taxes");
    }

    #[test]
    fn edit_line_uses_compact_due() {
        let due = Local.with_ymd_and_hms(2025, 3, 20, 23, 59, 59).unwrap();
        assert_eq!(task("file taxes", due).edit_line(now()), "file taxes due 20-03");

        let due = Local.with_ymd_and_hms(2026, 1, 2, 23, 59, 59).unwrap();
        assert_eq!(
            task("renew passport", due).edit_line(now()),
            "renew passport due 02-01-2026"
        );
    }

    #[test]
    fn new_tasks_get_distinct_ids() {
        let due = Local.with_ymd_and_hms(2025, 3, 12, 23, 59, 59).unwrap();
        let a = task("a", due);
        let b = task("b", due);
        assert_ne!(a.id, b.id);
        assert_eq!(a.created, a.modified);
        assert!(a.completed.is_none() && a.archived.is_none());
    }

    #[test]
    fn overdue_line_keeps_layout() {
        let due = Local.with_ymd_and_hms(2025, 3, 1, 23, 59, 59).unwrap();
        let line = plain(task("call plumber", due).display(1, now()));
        assert_eq!(line, " 1 ( ) Sat, 01 Mar call plumber");
    }
}
