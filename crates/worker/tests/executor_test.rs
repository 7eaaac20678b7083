use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use periodic_core::{ExecutorConfig, PeriodicError, TaskContext, TaskExecutor};
use periodic_testing_utils::{MockTaskModule, TaskBuilder};
use periodic_worker::{ModuleExecutor, ModuleRegistry};

fn context() -> TaskContext {
    TaskContext::for_task(&TaskBuilder::new().with_name("job").build(), "node1")
}

async fn executor_with(module: MockTaskModule) -> ModuleExecutor {
    let registry = Arc::new(ModuleRegistry::new());
    registry.register(Arc::new(module)).await.unwrap();
    ModuleExecutor::new(registry)
}

#[tokio::test]
async fn test_successful_module() {
    let module = MockTaskModule::succeeding("mock");
    let executor = executor_with(module.clone()).await;

    let report = executor.execute("mock", &context()).await.unwrap();
    assert!(report.success);
    assert_eq!(report.taskmodule, "mock");
    assert_eq!(report.message.as_deref(), Some("mock ok"));
    assert_eq!(module.call_count(), 1);
    assert_eq!(module.calls()[0].node, "node1");
}

#[tokio::test]
async fn test_reported_failure() {
    let executor = executor_with(MockTaskModule::failing("mock")).await;

    let report = executor.execute("mock", &context()).await.unwrap();
    assert!(!report.success);
    assert_eq!(report.message.as_deref(), Some("mock failed"));
}

#[tokio::test]
async fn test_module_error_becomes_failure() {
    let executor = executor_with(MockTaskModule::erroring("mock")).await;

    let report = executor.execute("mock", &context()).await.unwrap();
    assert!(!report.success);
    assert!(report.message.unwrap().contains("mock raised"));
}

#[tokio::test]
async fn test_panic_is_contained() {
    let executor = executor_with(MockTaskModule::panicking("mock")).await;

    let report = executor.execute("mock", &context()).await.unwrap();
    assert!(!report.success);
    assert!(report.message.unwrap().contains("mock panicked"));
}

#[tokio::test]
async fn test_unknown_module_is_configuration_error() {
    let executor = ModuleExecutor::new(Arc::new(ModuleRegistry::new()));

    let err = executor.execute("missing", &context()).await.unwrap_err();
    assert!(matches!(err, PeriodicError::Configuration(_)));
}

#[tokio::test]
async fn test_default_timeout() {
    let executor = executor_with(MockTaskModule::sleeping("slow", Duration::from_secs(5)))
        .await
        .with_timeout(Some(Duration::from_millis(50)));

    let report = executor.execute("slow", &context()).await.unwrap();
    assert!(!report.success);
    assert!(report.duration_ms < 5_000);
}

#[tokio::test]
async fn test_timeout_option_overrides_default() {
    let registry = Arc::new(ModuleRegistry::new());
    registry
        .register(Arc::new(MockTaskModule::sleeping(
            "slow",
            Duration::from_millis(1_500),
        )))
        .await
        .unwrap();
    let config = ExecutorConfig {
        task_timeout_seconds: 0,
    };
    let executor = ModuleExecutor::from_config(registry, &config);

    let unlimited = executor.execute("slow", &context()).await.unwrap();
    assert!(unlimited.success);

    let mut limited = context();
    limited.options.insert("timeout_seconds".to_string(), json!(1));
    let report = executor.execute("slow", &limited).await.unwrap();
    assert!(!report.success);
}

#[tokio::test]
async fn test_modules_lists_registry() {
    let executor = ModuleExecutor::new(Arc::new(ModuleRegistry::with_builtin_modules()));
    assert_eq!(executor.modules().await, vec!["http", "noop", "shell"]);
}
