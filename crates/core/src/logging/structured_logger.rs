//! Structured logging utilities
//!
//! Events emitted while evaluating and running periodic tasks. Failures are
//! logged at `error` level so that cron mode, which only lets errors through,
//! still surfaces them.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::models::{BatchReport, PeriodicTask};

pub struct RunLogger;

impl RunLogger {
    pub fn log_task_due(task: &PeriodicTask, node: &str, last_run: Option<DateTime<Utc>>) {
        debug!(
            event = "task_due",
            task.id = task.id,
            task.name = %task.name,
            task.interval = %task.interval,
            node = node,
            task.last_run = ?last_run,
            "Task is due"
        );
    }

    pub fn log_invalid_interval(task: &PeriodicTask, node: &str, error: &dyn std::fmt::Display) {
        error!(
            event = "task_interval_invalid",
            task.id = task.id,
            task.name = %task.name,
            task.interval = %task.interval,
            node = node,
            error = %error,
            "Task skipped: interval cannot be evaluated"
        );
    }

    pub fn log_task_execution_start(task: &PeriodicTask, node: &str, manual: bool) {
        info!(
            event = "task_execution_start",
            task.id = task.id,
            task.name = %task.name,
            task.module = %task.taskmodule,
            node = node,
            manual = manual,
            "Task execution started"
        );
    }

    pub fn log_task_execution_complete(
        task: &PeriodicTask,
        node: &str,
        success: bool,
        duration_ms: u64,
        message: Option<&str>,
    ) {
        if success {
            info!(
                event = "task_execution_complete",
                task.id = task.id,
                task.name = %task.name,
                task.module = %task.taskmodule,
                node = node,
                task.duration_ms = duration_ms,
                "Task execution completed successfully"
            );
        } else {
            error!(
                event = "task_execution_failed",
                task.id = task.id,
                task.name = %task.name,
                task.module = %task.taskmodule,
                node = node,
                task.duration_ms = duration_ms,
                task.error = message.unwrap_or("Unknown error"),
                "Task execution failed"
            );
        }
    }

    pub fn log_last_run_recorded(task: &PeriodicTask, node: &str, timestamp: DateTime<Utc>) {
        debug!(
            event = "last_run_recorded",
            task.id = task.id,
            task.name = %task.name,
            node = node,
            last_run = %timestamp,
            "Last run recorded"
        );
    }

    pub fn log_last_run_suppressed(task: &PeriodicTask, node: &str) {
        warn!(
            event = "last_run_suppressed",
            task.id = task.id,
            task.name = %task.name,
            node = node,
            "Last run not recorded, task stays due for retry"
        );
    }

    pub fn log_batch_complete(report: &BatchReport) {
        let failed = report.failed_count();
        if failed > 0 {
            error!(
                event = "batch_complete",
                node = %report.node,
                batch.due = report.entries.len(),
                batch.executed = report.executed_count(),
                batch.failed = failed,
                batch.dry_run = report.dry_run,
                "Scheduled run finished with failures"
            );
        } else {
            info!(
                event = "batch_complete",
                node = %report.node,
                batch.due = report.entries.len(),
                batch.executed = report.executed_count(),
                batch.dry_run = report.dry_run,
                "Scheduled run finished"
            );
        }
    }
}
