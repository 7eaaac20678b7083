//! 任务执行接口定义
//!
//! 此模块定义了任务执行的两层抽象：
//! - [`TaskModule`]：具体的任务行为，按名称注册（如 `shell`、`http`）
//! - [`TaskExecutor`]：按 `taskmodule` 名称分派到已注册的模块，并把模块
//!   内部的任何故障（错误、panic、超时）转换为失败结果
//!
//! ## 实现自定义任务模块
//!
//! ```rust
//! use async_trait::async_trait;
//! use periodic_core::models::{TaskContext, TaskResult};
//! use periodic_core::traits::TaskModule;
//! use periodic_core::PeriodicResult;
//!
//! pub struct CleanupModule;
//!
//! #[async_trait]
//! impl TaskModule for CleanupModule {
//!     fn name(&self) -> &str {
//!         "cleanup"
//!     }
//!
//!     async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult> {
//!         let dir = context.option_str("dir").unwrap_or("/tmp");
//!         Ok(TaskResult::success(format!("cleaned {dir}")))
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::models::{ExecutionReport, TaskContext, TaskResult};
use crate::PeriodicResult;

/// 可执行的任务模块
///
/// 返回 `Err` 表示模块执行过程中出现故障，执行器会将其转换为失败。
#[async_trait]
pub trait TaskModule: Send + Sync {
    /// 注册名称，对应任务定义中的 `taskmodule`
    fn name(&self) -> &str;

    async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult>;
}

/// 任务执行器
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// 执行指定模块
    ///
    /// 只有未注册的模块会返回 `PeriodicError::Configuration`；模块本身的
    /// 任何故障都体现在 `ExecutionReport.success == false` 中。
    async fn execute(
        &self,
        taskmodule: &str,
        context: &TaskContext,
    ) -> PeriodicResult<ExecutionReport>;

    /// 已注册的模块名称
    async fn modules(&self) -> Vec<String>;
}
