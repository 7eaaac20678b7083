//! 任务执行器
//!
//! 在独立的 tokio 任务中运行模块：模块 panic 表现为 `JoinError`，超时后
//! 任务被中止。两种情况都转换为失败的 [`ExecutionReport`]，不会越过执行器边界。

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::task::JoinError;
use tracing::{debug, warn};

use periodic_core::{
    ExecutionReport, ExecutorConfig, PeriodicError, PeriodicResult, TaskContext, TaskExecutor,
    TaskResult,
};

use crate::registry::ModuleRegistry;

/// 任务参数中覆盖默认超时的键
pub const TIMEOUT_OPTION: &str = "timeout_seconds";

pub struct ModuleExecutor {
    registry: Arc<ModuleRegistry>,
    default_timeout: Option<Duration>,
}

impl ModuleExecutor {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self::from_config(registry, &ExecutorConfig::default())
    }

    pub fn from_config(registry: Arc<ModuleRegistry>, config: &ExecutorConfig) -> Self {
        Self {
            registry,
            default_timeout: config.task_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// 任务参数 `timeout_seconds` 优先，0 表示不限时
    fn timeout_for(&self, context: &TaskContext) -> Option<Duration> {
        match context.option_u64(TIMEOUT_OPTION) {
            Some(0) => None,
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => self.default_timeout,
        }
    }
}

#[async_trait]
impl TaskExecutor for ModuleExecutor {
    async fn execute(
        &self,
        taskmodule: &str,
        context: &TaskContext,
    ) -> PeriodicResult<ExecutionReport> {
        let module = self.registry.get(taskmodule).await.ok_or_else(|| {
            PeriodicError::config_error(format!("未注册的任务模块: {taskmodule}"))
        })?;

        let timeout = self.timeout_for(context);
        let started = Instant::now();
        let owned = context.clone();
        let mut handle = tokio::spawn(async move { module.run(&owned).await });

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    let err = PeriodicError::ExecutionTimeout {
                        seconds: limit.as_secs(),
                    };
                    warn!("任务 {} 执行超时: {}", context.task_name, err);
                    return Ok(ExecutionReport::failed(
                        taskmodule,
                        err.to_string(),
                        elapsed_ms(started),
                    ));
                }
            },
            None => handle.await,
        };

        let duration_ms = elapsed_ms(started);
        let report = match joined {
            Ok(Ok(result)) => from_task_result(taskmodule, result, duration_ms),
            Ok(Err(err)) => {
                warn!("任务 {} 执行出错: {}", context.task_name, err);
                ExecutionReport::failed(taskmodule, err.to_string(), duration_ms)
            }
            Err(join_err) => {
                let message = join_error_message(join_err);
                warn!("任务 {} 异常终止: {}", context.task_name, message);
                ExecutionReport::failed(taskmodule, message, duration_ms)
            }
        };

        debug!(
            "任务模块 {} 执行结束: success={}, duration={}ms",
            taskmodule, report.success, report.duration_ms
        );
        Ok(report)
    }

    async fn modules(&self) -> Vec<String> {
        self.registry.list_modules().await
    }
}

fn from_task_result(taskmodule: &str, result: TaskResult, duration_ms: u64) -> ExecutionReport {
    let message = if result.success {
        result.output
    } else {
        result
            .error_message
            .or(result.output)
            .or_else(|| Some("任务模块报告失败".to_string()))
    };
    ExecutionReport {
        taskmodule: taskmodule.to_string(),
        success: result.success,
        message,
        duration_ms,
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        format!("任务模块 panic: {}", panic_message(err.into_panic()))
    } else {
        "任务被取消".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
