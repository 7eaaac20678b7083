use async_trait::async_trait;
use tracing::info;

use periodic_core::{PeriodicResult, TaskContext, TaskModule, TaskResult};

/// 什么也不做的模块，用于连通性检查和占位任务
#[derive(Debug, Default, Clone)]
pub struct NoopModule;

#[async_trait]
impl TaskModule for NoopModule {
    fn name(&self) -> &str {
        "noop"
    }

    async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult> {
        let message = context.option_str("message").unwrap_or("noop");
        info!(
            task.name = %context.task_name,
            node = %context.node,
            "{}",
            message
        );
        Ok(TaskResult::success(message))
    }
}
