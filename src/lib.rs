pub mod date;
pub mod error;
pub mod input;
pub mod store;
pub mod task;

pub type LocalDT = chrono::DateTime<chrono::Local>;

pub use error::{AppError, DueDateError};
pub use store::Store;
pub use task::{Content, Task};

/// Convert stored Unix seconds back into a local instant.
pub fn import_datetime(x: i64) -> Option<LocalDT> {
    chrono::DateTime::from_timestamp(x, 0).map(|dt| dt.with_timezone(&chrono::Local))
}
