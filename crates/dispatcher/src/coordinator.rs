//! 运行协调
//!
//! 把到期判定、任务执行和 last_run 记录串成一次调用。任务按顺序逐个执行；
//! 单个任务的执行故障只影响它自己，存储故障会中止整个批次。

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

use periodic_core::{
    BatchEntry, BatchReport, ExecutionReport, NodeResolver, PeriodicResult, PeriodicTask,
    RunLogger, RunOutcome, TaskContext, TaskExecutor, TaskStore,
};

use crate::scheduler::ScheduleEvaluator;

pub struct RunCoordinator {
    store: Arc<dyn TaskStore>,
    evaluator: ScheduleEvaluator,
    executor: Arc<dyn TaskExecutor>,
    nodes: NodeResolver,
}

impl RunCoordinator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        executor: Arc<dyn TaskExecutor>,
        nodes: NodeResolver,
    ) -> Self {
        let evaluator = ScheduleEvaluator::new(Arc::clone(&store));
        Self {
            store,
            evaluator,
            executor,
            nodes,
        }
    }

    pub fn with_evaluator(mut self, evaluator: ScheduleEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn evaluator(&self) -> &ScheduleEvaluator {
        &self.evaluator
    }

    pub fn resolve_node(&self, explicit: Option<&str>) -> PeriodicResult<String> {
        self.nodes.resolve(explicit)
    }

    pub async fn list_tasks(&self) -> PeriodicResult<Vec<PeriodicTask>> {
        self.store.list_tasks().await
    }

    pub async fn get_task_by_name(&self, name: &str) -> PeriodicResult<PeriodicTask> {
        self.store.get_task_by_name(name).await
    }

    pub async fn get_scheduled_tasks(
        &self,
        node: &str,
        now: DateTime<Utc>,
    ) -> PeriodicResult<Vec<PeriodicTask>> {
        self.evaluator.get_scheduled_tasks(node, now).await
    }

    /// 立即执行一个任务，以当前时间记录 last_run
    ///
    /// 不检查任务是否活跃、是否到期、是否属于该节点：这是运维人员的手动覆盖。
    pub async fn run_one(&self, task: &PeriodicTask, node: &str) -> PeriodicResult<RunOutcome> {
        self.run_one_at(task, node, Utc::now(), true).await
    }

    /// 按名称手动执行，任务不存在时返回 `TaskNotFound`
    pub async fn run_task_by_name(&self, name: &str, node: &str) -> PeriodicResult<RunOutcome> {
        let task = self.store.get_task_by_name(name).await?;
        self.run_one(&task, node).await
    }

    /// 执行 `node` 上所有到期任务
    ///
    /// 演练模式只返回到期列表，不执行也不写入。到期任务的 last_run 以
    /// `now` 记录。
    pub async fn run_scheduled(
        &self,
        node: &str,
        now: DateTime<Utc>,
        dry_run: bool,
    ) -> PeriodicResult<BatchReport> {
        let due = self.evaluator.get_scheduled_tasks(node, now).await?;

        let mut entries = Vec::with_capacity(due.len());
        for task in due {
            let outcome = if dry_run {
                info!("演练模式: 任务 {} 将在节点 {} 上执行", task.name, node);
                None
            } else {
                Some(self.run_one_at(&task, node, now, false).await?)
            };
            entries.push(BatchEntry { task, outcome });
        }

        let report = BatchReport {
            node: node.to_string(),
            now,
            dry_run,
            entries,
        };
        RunLogger::log_batch_complete(&report);
        Ok(report)
    }

    async fn run_one_at(
        &self,
        task: &PeriodicTask,
        node: &str,
        now: DateTime<Utc>,
        manual: bool,
    ) -> PeriodicResult<RunOutcome> {
        RunLogger::log_task_execution_start(task, node, manual);

        let started = Instant::now();
        let context = TaskContext::for_task(task, node);
        let report = match self.executor.execute(&task.taskmodule, &context).await {
            Ok(report) => report,
            Err(e) => ExecutionReport::failed(
                &task.taskmodule,
                e.to_string(),
                started.elapsed().as_millis() as u64,
            ),
        };

        RunLogger::log_task_execution_complete(
            task,
            node,
            report.success,
            report.duration_ms,
            report.message.as_deref(),
        );

        // 允许重试的任务失败时不记录，下次调用仍然到期
        let recorded_at = if report.success || !task.retry_if_failed {
            self.store.record_last_run(task.id, node, now).await?;
            RunLogger::log_last_run_recorded(task, node, now);
            Some(now)
        } else {
            RunLogger::log_last_run_suppressed(task, node);
            None
        };

        Ok(RunOutcome {
            task_id: task.id,
            task_name: task.name.clone(),
            node: node.to_string(),
            success: report.success,
            message: report.message,
            recorded_at,
            duration_ms: report.duration_ms,
        })
    }
}
