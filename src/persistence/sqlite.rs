use super::{PersistenceResult, TaskStore};
use crate::Task;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub struct SqliteTaskStore {
    connection: Mutex<Connection>,
}

impl SqliteTaskStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS scheduler (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date CHAR(8) NOT NULL DEFAULT '',
                title VARCHAR(256) NOT NULL DEFAULT '',
                comment TEXT NOT NULL DEFAULT '',
                repeat VARCHAR(128) NOT NULL DEFAULT ''
            );
            CREATE INDEX IF NOT EXISTS scheduler_date ON scheduler (date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get::<_, i64>(0)?.to_string(),
            date: row.get(1)?,
            title: row.get(2)?,
            comment: row.get(3)?,
            repeat: row.get(4)?,
        })
    }
}

impl TaskStore for SqliteTaskStore {
    fn add_task(&self, task: &Task) -> PersistenceResult<i64> {
        super::validate_record(task)?;
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?1, ?2, ?3, ?4)",
            params![task.date, task.title, task.comment, task.repeat],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_task(&self, id: i64) -> PersistenceResult<Option<Task>> {
        let conn = self.connection.lock();
        let task = conn
            .query_row(
                "SELECT id, date, title, comment, repeat FROM scheduler WHERE id = ?1",
                params![id],
                Self::task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    fn update_task(&self, id: i64, task: &Task) -> PersistenceResult<bool> {
        super::validate_record(task)?;
        let conn = self.connection.lock();
        let changed = conn.execute(
            "UPDATE scheduler SET date = ?1, title = ?2, comment = ?3, repeat = ?4 WHERE id = ?5",
            params![task.date, task.title, task.comment, task.repeat, id],
        )?;
        Ok(changed > 0)
    }

    fn delete_task(&self, id: i64) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let changed = conn.execute("DELETE FROM scheduler WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn list_tasks(&self, limit: usize) -> PersistenceResult<Vec<Task>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT id, date, title, comment, repeat FROM scheduler ORDER BY date ASC, id ASC LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], Self::task_from_row)?;

        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }
}
