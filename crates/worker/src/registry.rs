use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use periodic_core::{PeriodicError, PeriodicResult, TaskModule};

use crate::modules::{HttpModule, NoopModule, ShellModule};

/// 任务模块注册表
///
/// 以模块名为键保存 [`TaskModule`]，新的任务类型在启动时注册。
pub struct ModuleRegistry {
    modules: Arc<RwLock<HashMap<String, Arc<dyn TaskModule>>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 预先注册 `shell`、`http` 和 `noop`
    pub fn with_builtin_modules() -> Self {
        let builtin: [Arc<dyn TaskModule>; 3] = [
            Arc::new(ShellModule::new()),
            Arc::new(HttpModule::new()),
            Arc::new(NoopModule),
        ];
        let modules = builtin
            .into_iter()
            .map(|module| (module.name().to_string(), module))
            .collect();
        Self {
            modules: Arc::new(RwLock::new(modules)),
        }
    }

    /// 注册模块，同名模块会被替换
    pub async fn register(&self, module: Arc<dyn TaskModule>) -> PeriodicResult<()> {
        let name = module.name().trim().to_string();
        if name.is_empty() {
            return Err(PeriodicError::config_error("任务模块名称不能为空"));
        }
        debug!("注册任务模块: {}", name);
        let mut registry = self.modules.write().await;
        registry.insert(name, module);
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn TaskModule>> {
        let registry = self.modules.read().await;
        registry.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        let registry = self.modules.read().await;
        registry.contains_key(name)
    }

    /// 已注册的模块名，按名称排序
    pub async fn list_modules(&self) -> Vec<String> {
        let registry = self.modules.read().await;
        let mut names: Vec<String> = registry.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn unregister(&self, name: &str) -> bool {
        let mut registry = self.modules.write().await;
        registry.remove(name).is_some()
    }

    pub async fn count(&self) -> usize {
        let registry = self.modules.read().await;
        registry.len()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
