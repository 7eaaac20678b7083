use std::sync::Arc;

use periodic_core::TaskModule;
use periodic_testing_utils::MockTaskModule;
use periodic_worker::ModuleRegistry;

#[tokio::test]
async fn test_register_and_lookup() {
    let registry = ModuleRegistry::new();
    assert_eq!(registry.count().await, 0);

    registry
        .register(Arc::new(MockTaskModule::succeeding("cleanup")))
        .await
        .unwrap();

    assert!(registry.contains("cleanup").await);
    assert!(!registry.contains("other").await);
    let module = registry.get("cleanup").await.unwrap();
    assert_eq!(module.name(), "cleanup");
    assert_eq!(registry.list_modules().await, vec!["cleanup"]);
}

#[tokio::test]
async fn test_register_replaces_same_name() {
    let registry = ModuleRegistry::new();
    registry
        .register(Arc::new(MockTaskModule::succeeding("job")))
        .await
        .unwrap();
    registry
        .register(Arc::new(MockTaskModule::failing("job")))
        .await
        .unwrap();
    assert_eq!(registry.count().await, 1);
}

#[tokio::test]
async fn test_empty_name_rejected() {
    let registry = ModuleRegistry::new();
    let result = registry
        .register(Arc::new(MockTaskModule::succeeding("  ")))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unregister() {
    let registry = ModuleRegistry::with_builtin_modules();
    assert!(registry.unregister("http").await);
    assert!(!registry.unregister("http").await);
    assert_eq!(registry.list_modules().await, vec!["noop", "shell"]);
}
