use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::{PeriodicTask, TaskOptions};

/// 任务模块执行上下文
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskContext {
    pub task_id: i64,
    pub task_name: String,
    pub node: String,
    pub options: TaskOptions,
}

impl TaskContext {
    pub fn for_task(task: &PeriodicTask, node: &str) -> Self {
        Self {
            task_id: task.id,
            task_name: task.name.clone(),
            node: node.to_string(),
            options: task.options.clone(),
        }
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(|v| v.as_u64())
    }
}

/// 任务模块自身报告的执行结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResult {
    pub success: bool,
    pub output: Option<String>,
    pub error_message: Option<String>,
}

impl TaskResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error_message: None,
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error_message: Some(error_message.into()),
        }
    }
}

/// 执行器边界的结果，故障已被转换为失败
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub taskmodule: String,
    pub success: bool,
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl ExecutionReport {
    pub fn failed(taskmodule: &str, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            taskmodule: taskmodule.to_string(),
            success: false,
            message: Some(message.into()),
            duration_ms,
        }
    }
}

/// 单个任务一次运行的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub task_id: i64,
    pub task_name: String,
    pub node: String,
    pub success: bool,
    pub message: Option<String>,
    /// 写入 last_run 的时间；失败且允许重试时为 None
    pub recorded_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub task: PeriodicTask,
    /// 演练模式下为 None
    pub outcome: Option<RunOutcome>,
}

/// 一次 run_scheduled 调用的汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub node: String,
    pub now: DateTime<Utc>,
    pub dry_run: bool,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(&e.outcome, Some(o) if !o.success))
            .count()
    }

    pub fn executed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_some()).count()
    }

    /// 只要有一个任务失败，整个批次就视为失败
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPeriodicTask;

    fn outcome(success: bool) -> RunOutcome {
        RunOutcome {
            task_id: 1,
            task_name: "t".to_string(),
            node: "node1".to_string(),
            success,
            message: None,
            recorded_at: None,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_batch_report_aggregation() {
        let task = NewPeriodicTask::new("t", "@hourly", "noop").into_task(1);
        let mut report = BatchReport {
            node: "node1".to_string(),
            now: Utc::now(),
            dry_run: false,
            entries: vec![
                BatchEntry {
                    task: task.clone(),
                    outcome: Some(outcome(true)),
                },
                BatchEntry {
                    task: task.clone(),
                    outcome: Some(outcome(true)),
                },
            ],
        };
        assert!(report.is_success());
        assert_eq!(report.executed_count(), 2);

        report.entries.push(BatchEntry {
            task,
            outcome: Some(outcome(false)),
        });
        assert!(!report.is_success());
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_dry_run_report_is_success() {
        let task = NewPeriodicTask::new("t", "@hourly", "noop").into_task(1);
        let report = BatchReport {
            node: "node1".to_string(),
            now: Utc::now(),
            dry_run: true,
            entries: vec![BatchEntry {
                task,
                outcome: None,
            }],
        };
        assert!(report.is_success());
        assert_eq!(report.executed_count(), 0);
    }
}
