use std::sync::Arc;

use clap::Parser;

use periodic::{Application, Cli, Commands};
use periodic_core::{NodeResolver, TaskStore};
use periodic_dispatcher::RunCoordinator;
use periodic_infrastructure::SqliteTaskStore;
use periodic_testing_utils::{new_task, MockTaskModule};
use periodic_worker::{ModuleExecutor, ModuleRegistry};

#[test]
fn test_parse_run_scheduled_flags() {
    let cli = Cli::try_parse_from(["periodic", "run_scheduled", "--dryrun", "--cron"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::RunScheduled {
            node: None,
            dry_run: true,
            cron: true,
        }
    );
    assert!(cli.is_cron_mode());
}

#[test]
fn test_parse_run_task() {
    let cli = Cli::try_parse_from(["periodic", "run", "--task", "backup", "-n", "node2"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Run {
            task: "backup".to_string(),
            node: Some("node2".to_string()),
        }
    );
    assert!(!cli.is_cron_mode());
}

#[test]
fn test_parse_global_options_after_subcommand() {
    let cli = Cli::try_parse_from([
        "periodic",
        "list",
        "--config",
        "/etc/periodic/config.toml",
        "--log-format",
        "json",
    ])
    .unwrap();
    assert_eq!(cli.command, Commands::List { node: None });
    assert_eq!(cli.config.as_deref(), Some("/etc/periodic/config.toml"));
    assert_eq!(cli.log_format.as_deref(), Some("json"));
}

#[test]
fn test_parse_rejects_missing_task_and_bad_level() {
    assert!(Cli::try_parse_from(["periodic", "run"]).is_err());
    assert!(Cli::try_parse_from(["periodic", "list", "-l", "verbose"]).is_err());
}

async fn application() -> (Arc<SqliteTaskStore>, Application) {
    let store = Arc::new(SqliteTaskStore::in_memory().await.unwrap());

    let mut restricted = new_task("nightly", "0 0 * * *", "ok");
    restricted.nodes = vec!["node2".to_string()];
    store.create_task(restricted).await.unwrap();
    store
        .create_task(new_task("heartbeat", "every 5m", "ok"))
        .await
        .unwrap();
    store
        .create_task(new_task("broken", "@hourly", "bad"))
        .await
        .unwrap();

    let registry = Arc::new(ModuleRegistry::new());
    registry
        .register(Arc::new(MockTaskModule::succeeding("ok")))
        .await
        .unwrap();
    registry
        .register(Arc::new(MockTaskModule::failing("bad")))
        .await
        .unwrap();

    let coordinator = RunCoordinator::new(
        store.clone(),
        Arc::new(ModuleExecutor::new(registry)),
        NodeResolver::new("node1"),
    );
    (store, Application::new(coordinator))
}

async fn execute(app: &Application, command: Commands) -> (bool, String) {
    let mut out = Vec::new();
    let success = app.execute(&command, &mut out).await.unwrap();
    (success, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_list_prints_all_tasks() {
    let (_, app) = application().await;

    let (success, text) = execute(&app, Commands::List { node: None }).await;

    assert!(success);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("active"));
    assert!(lines[1].contains("nightly") && lines[1].contains("node2"));
    assert!(!lines[0].contains("next_run"));
}

#[tokio::test]
async fn test_list_with_node_shows_next_run() {
    let (_, app) = application().await;

    let (_, text) = execute(
        &app,
        Commands::List {
            node: Some("node1".to_string()),
        },
    )
    .await;

    assert!(text.lines().next().unwrap().ends_with("next_run"));
    // 不在 node1 上运行的任务没有下一次执行时间
    let nightly = text.lines().find(|l| l.contains("nightly")).unwrap();
    assert!(nightly.trim_end().ends_with('-'));
}

#[tokio::test]
async fn test_list_with_node_survives_invalid_interval() {
    let (store, app) = application().await;
    store
        .create_task(new_task("typo", "every fortnight", "ok"))
        .await
        .unwrap();

    let (success, text) = execute(
        &app,
        Commands::List {
            node: Some("node1".to_string()),
        },
    )
    .await;

    assert!(success);
    let typo = text.lines().find(|l| l.contains("typo")).unwrap();
    assert!(typo.contains("every fortnight"));
    assert!(typo.trim_end().ends_with('-'));
    let heartbeat = text.lines().find(|l| l.contains("heartbeat")).unwrap();
    assert!(!heartbeat.trim_end().ends_with('-'));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let (store, app) = application().await;

    let (success, text) = execute(
        &app,
        Commands::RunScheduled {
            node: None,
            dry_run: true,
            cron: false,
        },
    )
    .await;

    assert!(success);
    assert!(text.contains("2 task(s) due"));
    assert!(text.contains("heartbeat") && text.contains("broken"));
    assert!(!text.contains("nightly"));
    for task in store.list_tasks().await.unwrap() {
        assert!(task.last_run.is_empty());
    }
}

#[tokio::test]
async fn test_run_scheduled_reports_failure() {
    let (store, app) = application().await;

    let (success, text) = execute(
        &app,
        Commands::RunScheduled {
            node: None,
            dry_run: false,
            cron: false,
        },
    )
    .await;

    assert!(!success);
    assert!(text.contains("OK heartbeat"));
    assert!(text.contains("FAILED broken"));
    assert!(text.contains("2 task(s) run on node1, 1 failed"));

    let heartbeat = store.get_task_by_name("heartbeat").await.unwrap();
    assert!(heartbeat.last_run_on("node1").is_some());
}

#[tokio::test]
async fn test_cron_mode_is_silent() {
    let (_, app) = application().await;

    let (success, text) = execute(
        &app,
        Commands::RunScheduled {
            node: None,
            dry_run: false,
            cron: true,
        },
    )
    .await;

    assert!(!success);
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_run_by_name_ignores_node_restriction() {
    let (store, app) = application().await;

    let (success, text) = execute(
        &app,
        Commands::Run {
            task: "nightly".to_string(),
            node: None,
        },
    )
    .await;

    assert!(success);
    assert!(text.starts_with("OK nightly"));
    let nightly = store.get_task_by_name("nightly").await.unwrap();
    assert!(nightly.last_run_on("node1").is_some());
}

#[tokio::test]
async fn test_run_unknown_task_is_error() {
    let (_, app) = application().await;

    let err = app
        .execute(
            &Commands::Run {
                task: "missing".to_string(),
                node: None,
            },
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("missing"));
}
