//! 任务存储接口定义
//!
//! 任务定义和各节点的执行记录保存在整个集群共享的数据库中。
//! 本系统对任务定义只读，唯一的写操作是 `record_last_run`。
//!
//! ## 并发约定
//!
//! 多个节点会同时写入同一张表，但每个节点只写自己的 `(task_id, node)`
//! 记录，因此按键"后写者胜"即可；实现必须保证不会覆盖其他节点的记录，
//! 并且同一键上的时间戳只增不减。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use periodic_core::traits::TaskStore;
//!
//! async fn show(store: &dyn TaskStore) -> PeriodicResult<()> {
//!     for task in store.list_tasks().await? {
//!         println!("{} {}", task.id, task.name);
//!     }
//!     let task = store.get_task_by_name("nightly_backup").await?;
//!     store.record_last_run(task.id, "node1", Utc::now()).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::PeriodicTask;
use crate::PeriodicResult;

/// 周期任务存储
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 按 id 升序返回全部任务（含各节点 last_run）
    async fn list_tasks(&self) -> PeriodicResult<Vec<PeriodicTask>>;

    /// 按名称查找任务，不存在时返回 `PeriodicError::TaskNotFound`
    async fn get_task_by_name(&self, name: &str) -> PeriodicResult<PeriodicTask>;

    /// 记录任务在某节点上的执行时间
    ///
    /// 幂等的 upsert；若已有记录不早于 `timestamp` 则保持不变。
    async fn record_last_run(
        &self,
        task_id: i64,
        node: &str,
        timestamp: DateTime<Utc>,
    ) -> PeriodicResult<()>;
}
