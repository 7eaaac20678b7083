use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use periodic_core::{
    IntervalEvaluator, PeriodicResult, PeriodicTask, RunLogger, TaskStore,
};

use crate::cron_utils::CronIntervalEvaluator;

/// 到期判定
///
/// 任务到期当且仅当：处于活跃状态，不限节点或包含当前节点，并且从未在
/// 该节点执行过，或者上次执行后的下一个时间点已经到达。判定本身没有副作用。
pub struct ScheduleEvaluator {
    store: Arc<dyn TaskStore>,
    intervals: Arc<dyn IntervalEvaluator>,
}

impl ScheduleEvaluator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self::with_interval_evaluator(store, Arc::new(CronIntervalEvaluator))
    }

    pub fn with_interval_evaluator(
        store: Arc<dyn TaskStore>,
        intervals: Arc<dyn IntervalEvaluator>,
    ) -> Self {
        Self { store, intervals }
    }

    pub fn is_due(
        &self,
        task: &PeriodicTask,
        node: &str,
        now: DateTime<Utc>,
    ) -> PeriodicResult<bool> {
        if !task.is_active() {
            debug!("任务 {} 不处于活跃状态，跳过调度", task.name);
            return Ok(false);
        }
        if !task.runs_on(node) {
            debug!("任务 {} 不在节点 {} 上执行", task.name, node);
            return Ok(false);
        }
        self.intervals
            .is_due(&task.interval, task.last_run_on(node), now)
    }

    /// 下一次到期时间；从未在该节点执行过的任务返回 `now`
    ///
    /// 不活跃或不在该节点上执行的任务返回 None。
    pub fn next_due_at(
        &self,
        task: &PeriodicTask,
        node: &str,
        now: DateTime<Utc>,
    ) -> PeriodicResult<Option<DateTime<Utc>>> {
        if !task.is_active() || !task.runs_on(node) {
            return Ok(None);
        }
        match task.last_run_on(node) {
            None => {
                self.intervals.validate(&task.interval)?;
                Ok(Some(now))
            }
            Some(last) => self.intervals.next_run_after(&task.interval, last),
        }
    }

    /// 查询在 `node` 上于 `now` 时刻到期的任务，按 id 排序
    ///
    /// 间隔表达式无法解析的任务记录错误日志后跳过；存储错误直接返回。
    pub async fn get_scheduled_tasks(
        &self,
        node: &str,
        now: DateTime<Utc>,
    ) -> PeriodicResult<Vec<PeriodicTask>> {
        let tasks = self.store.list_tasks().await?;
        let total = tasks.len();

        let mut due = Vec::new();
        for task in tasks {
            match self.is_due(&task, node, now) {
                Ok(true) => {
                    RunLogger::log_task_due(&task, node, task.last_run_on(node));
                    due.push(task);
                }
                Ok(false) => {}
                Err(e) => RunLogger::log_invalid_interval(&task, node, &e),
            }
        }
        due.sort_by_key(|task| task.id);

        info!(
            "节点 {} 共有 {} 个任务，其中 {} 个到期",
            node,
            total,
            due.len()
        );
        Ok(due)
    }
}
