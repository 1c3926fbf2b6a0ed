#![cfg(feature = "sqlite")]

use task_scheduler::{PersistenceError, SqliteTaskStore, Task, TaskStore};
use tempfile::NamedTempFile;

#[test]
fn sqlite_store_round_trip_tasks() {
    let file = NamedTempFile::new().unwrap();

    let id = {
        let store = SqliteTaskStore::new(file.path()).unwrap();
        store
            .add_task(
                &Task::new("Water plants")
                    .with_date("20240203")
                    .with_comment("balcony")
                    .with_repeat("d 3"),
            )
            .expect("insert task")
    };

    let store = SqliteTaskStore::new(file.path()).unwrap();
    let task = store.get_task(id).unwrap().expect("task exists");
    assert_eq!(task.id, id.to_string());
    assert_eq!(task.title, "Water plants");
    assert_eq!(task.date, "20240203");
    assert_eq!(task.comment, "balcony");
    assert_eq!(task.repeat, "d 3");
}

#[test]
fn list_orders_by_date_and_respects_limit() {
    let store = SqliteTaskStore::in_memory().unwrap();
    for (title, date) in [("C", "20240310"), ("A", "20240101"), ("B", "20240205")] {
        store
            .add_task(&Task::new(title).with_date(date))
            .unwrap();
    }

    let titles: Vec<String> = store
        .list_tasks(10)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["A", "B", "C"]);

    assert_eq!(store.list_tasks(2).unwrap().len(), 2);
}

#[test]
fn update_and_delete_report_missing_rows() {
    let store = SqliteTaskStore::in_memory().unwrap();
    let id = store
        .add_task(&Task::new("Draft").with_date("20240101"))
        .unwrap();

    let edited = Task::new("Final").with_date("20240102").with_repeat("y");
    assert!(store.update_task(id, &edited).unwrap());
    let stored = store.get_task(id).unwrap().unwrap();
    assert_eq!(stored.title, "Final");
    assert_eq!(stored.repeat, "y");

    assert!(!store.update_task(id + 100, &edited).unwrap());
    assert!(store.delete_task(id).unwrap());
    assert!(!store.delete_task(id).unwrap());
    assert!(store.get_task(id).unwrap().is_none());
}

#[test]
fn store_rejects_unscheduled_records() {
    let store = SqliteTaskStore::in_memory().unwrap();
    assert!(matches!(
        store.add_task(&Task::new("No date")),
        Err(PersistenceError::InvalidData(_))
    ));
    assert!(matches!(
        store.add_task(&Task::new("").with_date("20240101")),
        Err(PersistenceError::InvalidData(_))
    ));
}
