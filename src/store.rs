use std::path::Path;

use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::task::{Content, Task};
use crate::LocalDT;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS tasks (
                        id TEXT PRIMARY KEY,
                        description TEXT NOT NULL,
                        created INTEGER NOT NULL,
                        modified INTEGER NOT NULL,
                        completed INTEGER,
                        archived INTEGER,
                        due INTEGER NOT NULL
                      );
                      CREATE INDEX IF NOT EXISTS tasks_due ON tasks(due);
                      CREATE INDEX IF NOT EXISTS tasks_modified ON tasks(modified);
                      CREATE INDEX IF NOT EXISTS tasks_completed ON tasks(completed);
                      CREATE INDEX IF NOT EXISTS tasks_archived ON tasks(archived);";

const PENDING_QUERY: &str = "SELECT id, description, created, modified, completed, archived, due
                             FROM tasks
                             WHERE archived IS NULL
                             ORDER BY due ASC, id ASC";

/// Task storage on top of a single SQLite connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert(&self, task: &Task) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO tasks (id, description, created, modified, completed, archived, due)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                task.id.to_string(),
                &task.content.description,
                task.created.timestamp(),
                task.modified.timestamp(),
                task.completed.map(|t| t.timestamp()),
                task.archived.map(|t| t.timestamp()),
                task.content.due.timestamp(),
            ),
        )?;
        info!(id = %task.id, "inserted task");
        Ok(())
    }

    /// Tasks not yet archived, soonest due first.
    pub fn pending(&self) -> Result<Vec<Task>, AppError> {
        let mut stmt = self.conn.prepare(PENDING_QUERY)?;
        let tasks = stmt
            .query([])?
            .map(|row| Task::from_db_row(row))
            .collect::<Vec<_>>()?;
        Ok(tasks)
    }

    /// The pending task at 1-based position `number` in [`Store::pending`].
    pub fn find_pending(&self, number: usize) -> Result<Task, AppError> {
        let offset = match number.checked_sub(1) {
            Some(offset) => offset,
            None => return Err(AppError::TaskNotFound(number)),
        };

        self.conn
            .query_row(
                &format!("{PENDING_QUERY} LIMIT 1 OFFSET ?1"),
                [offset as i64],
                |row| Task::from_db_row(row),
            )
            .optional()?
            .ok_or(AppError::TaskNotFound(number))
    }

    pub fn update_content(
        &self,
        id: Uuid,
        content: &Content,
        modified: LocalDT,
    ) -> Result<(), AppError> {
        self.conn.execute(
            "UPDATE tasks SET description = ?1, due = ?2, modified = ?3 WHERE id = ?4",
            (
                &content.description,
                content.due.timestamp(),
                modified.timestamp(),
                id.to_string(),
            ),
        )?;
        info!(%id, "updated task");
        Ok(())
    }

    pub fn complete(&self, id: Uuid, at: LocalDT) -> Result<(), AppError> {
        self.conn.execute(
            "UPDATE tasks SET completed = ?1, modified = ?1 WHERE id = ?2",
            (at.timestamp(), id.to_string()),
        )?;
        info!(%id, "completed task");
        Ok(())
    }

    /// Archive every completed task and return how many were archived.
    pub fn archive_completed(&self, at: LocalDT) -> Result<usize, AppError> {
        let count = self.conn.execute(
            "UPDATE tasks SET archived = ?1 WHERE archived IS NULL AND completed IS NOT NULL",
            [at.timestamp()],
        )?;
        info!(count, "archived completed tasks");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeDelta, TimeZone};

    use super::*;

    fn now() -> LocalDT {
        Local.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap()
    }

    fn eod(day: u32) -> LocalDT {
        Local.with_ymd_and_hms(2025, 3, day, 23, 59, 59).unwrap()
    }

    fn add(store: &Store, description: &str, due: LocalDT) -> Task {
        let task = Task::new(
            Content {
                description: description.to_owned(),
                due,
            },
            now(),
        );
        store.insert(&task).unwrap();
        task
    }

    #[test]
    fn pending_is_ordered_by_due() {
        let store = Store::open_in_memory().unwrap();
        add(&store, "later", eod(20));
        add(&store, "sooner", eod(13));
        add(&store, "soonest", eod(12));

        let descriptions: Vec<_> = store
            .pending()
            .unwrap()
            .into_iter()
            .map(|t| t.content.description)
            .collect();
        assert_eq!(descriptions, ["soonest", "sooner", "later"]);
    }

    #[test]
    fn same_due_falls_back_to_id_order() {
        let store = Store::open_in_memory().unwrap();
        let first = add(&store, "first", eod(13));
        let second = add(&store, "second", eod(13));

        let ids: Vec<_> = store.pending().unwrap().into_iter().map(|t| t.id).collect();
        let mut expected = vec![first.id, second.id];
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(ids, expected);
    }

    #[test]
    fn round_trips_task_fields() {
        let store = Store::open_in_memory().unwrap();
        let task = add(&store, "buy milk +errands", eod(14));

        let stored = store.find_pending(1).unwrap();
        assert_eq!(stored.id, task.id);
        assert_eq!(stored.content.description, "buy milk +errands");
        assert_eq!(stored.content.due, eod(14));
        assert_eq!(stored.created, now());
        assert!(stored.completed.is_none());
    }

    #[test]
    fn find_pending_by_position() {
        let store = Store::open_in_memory().unwrap();
        add(&store, "b", eod(14));
        add(&store, "a", eod(13));

        assert_eq!(store.find_pending(1).unwrap().content.description, "a");
        assert_eq!(store.find_pending(2).unwrap().content.description, "b");
        assert!(matches!(
            store.find_pending(3),
            Err(AppError::TaskNotFound(3))
        ));
        assert!(matches!(
            store.find_pending(0),
            Err(AppError::TaskNotFound(0))
        ));
    }

    #[test]
    fn update_replaces_content() {
        let store = Store::open_in_memory().unwrap();
        let task = add(&store, "draft", eod(13));
        let later = now() + TimeDelta::hours(1);

        let content = Content {
            description: "final".to_owned(),
            due: eod(18),
        };
        store.update_content(task.id, &content, later).unwrap();

        let stored = store.find_pending(1).unwrap();
        assert_eq!(stored.content.description, "final");
        assert_eq!(stored.content.due, eod(18));
        assert_eq!(stored.modified, later);
        assert_eq!(stored.created, now());
    }

    #[test]
    fn archive_only_touches_completed() {
        let store = Store::open_in_memory().unwrap();
        let done = add(&store, "done", eod(12));
        add(&store, "open", eod(13));

        store.complete(done.id, now()).unwrap();
        assert_eq!(store.pending().unwrap().len(), 2);

        assert_eq!(store.archive_completed(now()).unwrap(), 1);
        let pending = store.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].content.description, "open");

        assert_eq!(store.archive_completed(now()).unwrap(), 0);
    }

    #[test]
    fn open_on_disk_keeps_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.sqlite");

        {
            let store = Store::open(&path).unwrap();
            add(&store, "persisted", eod(13));
        }

        let store = Store::open(&path).unwrap();
        let pending = store.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].content.description, "persisted");
    }
}
