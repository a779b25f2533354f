use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a due-date token could not be turned into an instant.
#[derive(Error, Debug)]
pub enum DueDateError {
    #[error("due string too short")]
    InputTooShort,

    #[error("cannot parse '{token}' as any of {}", .templates.join(", "))]
    NoPatternMatched {
        token: String,
        templates: Vec<&'static str>,
    },

    #[error("cannot parse '{token}' as {template}: {source}")]
    FormatParseFailure {
        token: String,
        template: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("end of day does not exist on {0} in the local time zone")]
    NonexistentLocalTime(NaiveDate),

    #[error("due date is out of range")]
    OutOfRange,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid due date: {0}")]
    DueDate(#[from] DueDateError),

    #[error("could not parse task number '{0}'")]
    InvalidTaskNumber(String),

    #[error("no pending task with number {0}")]
    TaskNotFound(usize),

    #[error("task {0} already completed")]
    AlreadyCompleted(usize),

    #[error("task description is empty")]
    EmptyDescription,

    #[error("edit canceled: {0}")]
    EditCanceled(#[from] dialoguer::Error),

    #[error("could not get data directory: {0}")]
    DataDir(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
