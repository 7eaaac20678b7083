use std::sync::Arc;

use serde_json::json;

use periodic_core::{DatabaseConfig, NewPeriodicTask, PeriodicError, TaskStore};
use periodic_infrastructure::{connect_task_store, SqliteTaskStore};
use periodic_testing_utils::{new_task, utc};

async fn seeded_store() -> SqliteTaskStore {
    let store = SqliteTaskStore::in_memory().await.unwrap();

    let mut backup = new_task("backup", "0 2 * * *", "shell");
    backup.nodes = vec!["node1".to_string(), "node2".to_string()];
    backup.options = json!({"command": "backup.sh", "args": ["--full"]})
        .as_object()
        .cloned()
        .unwrap();
    backup.retry_if_failed = true;
    store.create_task(backup).await.unwrap();

    let mut disabled = new_task("disabled", "@hourly", "noop");
    disabled.active = false;
    store.create_task(disabled).await.unwrap();

    store
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let store = seeded_store().await;

    let tasks = store.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].name, "backup");
    assert!(tasks[0].id < tasks[1].id);
    assert_eq!(tasks[0].nodes, vec!["node1", "node2"]);
    assert_eq!(tasks[0].options["command"], "backup.sh");
    assert!(tasks[0].retry_if_failed);
    assert!(tasks[0].last_run.is_empty());
    assert!(!tasks[1].active);
    assert!(tasks[1].nodes.is_empty());
}

#[tokio::test]
async fn test_get_task_by_name() {
    let store = seeded_store().await;

    let task = store.get_task_by_name("disabled").await.unwrap();
    assert_eq!(task.interval, "@hourly");
    assert_eq!(task.taskmodule, "noop");

    let err = store.get_task_by_name("unknown").await.unwrap_err();
    assert!(matches!(err, PeriodicError::TaskNotFound { name } if name == "unknown"));
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let store = seeded_store().await;
    let err = store
        .create_task(new_task("backup", "@daily", "noop"))
        .await
        .unwrap_err();
    assert!(err.is_persistence());
}

#[tokio::test]
async fn test_record_last_run_per_node() {
    let store = seeded_store().await;
    let task = store.get_task_by_name("backup").await.unwrap();

    let first = utc("2024-01-01T02:00:00Z");
    store.record_last_run(task.id, "node1", first).await.unwrap();
    store.record_last_run(task.id, "node2", first).await.unwrap();

    let later = utc("2024-01-02T02:00:00.123456Z");
    store.record_last_run(task.id, "node1", later).await.unwrap();

    let task = store.get_task_by_name("backup").await.unwrap();
    assert_eq!(task.last_run_on("node1"), Some(later));
    assert_eq!(task.last_run_on("node2"), Some(first));

    let listed = store.list_tasks().await.unwrap();
    assert_eq!(listed[0].last_run, task.last_run);
    assert!(listed[1].last_run.is_empty());
}

#[tokio::test]
async fn test_last_run_is_monotonic() {
    let store = seeded_store().await;
    let task = store.get_task_by_name("backup").await.unwrap();

    let later = utc("2024-03-01T00:00:00Z");
    store.record_last_run(task.id, "node1", later).await.unwrap();
    store
        .record_last_run(task.id, "node1", utc("2024-02-01T00:00:00Z"))
        .await
        .unwrap();
    // 同一时间重复写入是幂等的
    store.record_last_run(task.id, "node1", later).await.unwrap();

    let task = store.get_task_by_name("backup").await.unwrap();
    assert_eq!(task.last_run_on("node1"), Some(later));
}

#[tokio::test]
async fn test_record_for_missing_task_fails() {
    let store = seeded_store().await;
    let err = store
        .record_last_run(9_999, "node1", utc("2024-01-01T00:00:00Z"))
        .await
        .unwrap_err();
    assert!(err.is_persistence());
}

#[tokio::test]
async fn test_concurrent_writers_on_different_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("periodic.db").display());
    let config = DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    };

    let store = Arc::new(SqliteTaskStore::connect(&config).await.unwrap());
    let task = store
        .create_task(NewPeriodicTask::new("shared", "every 5m", "noop"))
        .await
        .unwrap();

    let at = utc("2024-01-01T00:00:00Z");
    let task_id = task.id;
    let writes = (0..8).map(|i| {
        let store = Arc::clone(&store);
        async move {
            store
                .record_last_run(task_id, &format!("node{i}"), at)
                .await
        }
    });
    for result in futures::future::join_all(writes).await {
        result.unwrap();
    }

    let task = store.get_task_by_name("shared").await.unwrap();
    assert_eq!(task.last_run.len(), 8);
    assert!(task.last_run.values().all(|t| *t == at));
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("periodic.db").display()),
        ..DatabaseConfig::default()
    };

    {
        let store = SqliteTaskStore::connect(&config).await.unwrap();
        let task = store
            .create_task(new_task("persisted", "@daily", "noop"))
            .await
            .unwrap();
        store
            .record_last_run(task.id, "node1", utc("2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        store.pool().close().await;
    }

    let store = connect_task_store(&config).await.unwrap();
    let task = store.get_task_by_name("persisted").await.unwrap();
    assert_eq!(
        task.last_run_on("node1"),
        Some(utc("2024-01-01T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_unsupported_url() {
    let config = DatabaseConfig {
        url: "mysql://localhost/periodic".to_string(),
        ..DatabaseConfig::default()
    };
    let err = connect_task_store(&config).await.err().unwrap();
    assert!(matches!(err, PeriodicError::Configuration(_)));
}
