use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use periodic_core::{AppConfig, NodeResolver, RunLogger};
use periodic_dispatcher::RunCoordinator;
use periodic_infrastructure::connect_task_store;
use periodic_worker::{ModuleExecutor, ModuleRegistry};

use crate::cli::Commands;
use crate::output;

/// 组装好的应用实例
pub struct Application {
    coordinator: RunCoordinator,
}

impl Application {
    pub fn new(coordinator: RunCoordinator) -> Self {
        Self { coordinator }
    }

    /// 按配置连接存储、注册内置任务模块
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = connect_task_store(&config.database)
            .await
            .with_context(|| format!("连接任务存储失败: {}", config.database.url))?;

        let registry = Arc::new(ModuleRegistry::with_builtin_modules());
        let executor = Arc::new(ModuleExecutor::from_config(registry, &config.executor));
        let nodes = NodeResolver::from_config(&config.node);

        Ok(Self::new(RunCoordinator::new(store, executor, nodes)))
    }

    pub fn coordinator(&self) -> &RunCoordinator {
        &self.coordinator
    }

    /// 执行一条命令，数据输出写入 `out`
    ///
    /// 返回值表示命令是否成功，决定进程退出码。
    pub async fn execute<W: Write>(&self, command: &Commands, out: &mut W) -> Result<bool> {
        match command {
            Commands::List { node } => {
                let tasks = self.coordinator.list_tasks().await.context("读取任务列表失败")?;
                let next_runs = match node {
                    Some(node) => {
                        let node = self.coordinator.resolve_node(Some(node))?;
                        let now = Utc::now();
                        let evaluator = self.coordinator.evaluator();
                        Some(
                            tasks
                                .iter()
                                .map(|task| match evaluator.next_due_at(task, &node, now) {
                                    Ok(next) => next,
                                    Err(e) => {
                                        RunLogger::log_invalid_interval(task, &node, &e);
                                        None
                                    }
                                })
                                .collect::<Vec<_>>(),
                        )
                    }
                    None => None,
                };
                write!(out, "{}", output::task_table(&tasks, next_runs.as_deref()))?;
                Ok(true)
            }
            Commands::Run { task, node } => {
                let node = self.coordinator.resolve_node(node.as_deref())?;
                let outcome = self
                    .coordinator
                    .run_task_by_name(task, &node)
                    .await
                    .with_context(|| format!("执行任务失败: {task}"))?;
                writeln!(out, "{}", output::outcome_line(&outcome))?;
                Ok(outcome.success)
            }
            Commands::RunScheduled {
                node,
                dry_run,
                cron,
            } => {
                let node = self.coordinator.resolve_node(node.as_deref())?;
                let now = Utc::now();
                info!("节点 {} 开始执行到期任务", node);

                let report = self
                    .coordinator
                    .run_scheduled(&node, now, *dry_run)
                    .await
                    .context("执行到期任务失败")?;

                if !*cron {
                    write!(out, "{}", output::batch_summary(&report))?;
                }
                Ok(report.is_success())
            }
        }
    }
}
