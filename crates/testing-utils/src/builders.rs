//! Test data builders

use chrono::{DateTime, Utc};
use serde_json::Value;

use periodic_core::{NewPeriodicTask, PeriodicTask, TaskOptions};

/// Builder for creating test PeriodicTask values
pub struct TaskBuilder {
    task: PeriodicTask,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: NewPeriodicTask::new("test_task", "@daily", "noop").into_task(1),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.task.name = name.to_string();
        self
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.task.interval = interval.to_string();
        self
    }

    pub fn with_module(mut self, taskmodule: &str) -> Self {
        self.task.taskmodule = taskmodule.to_string();
        self
    }

    pub fn with_nodes(mut self, nodes: &[&str]) -> Self {
        self.task.nodes = nodes.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.task.options.insert(key.to_string(), value);
        self
    }

    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.task.options = options;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.task.active = false;
        self
    }

    pub fn retry_if_failed(mut self) -> Self {
        self.task.retry_if_failed = true;
        self
    }

    pub fn with_last_run(mut self, node: &str, at: DateTime<Utc>) -> Self {
        self.task.last_run.insert(node.to_string(), at);
        self
    }

    pub fn build(self) -> PeriodicTask {
        self.task
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 供 SQL 存储的 create_task 使用
pub fn new_task(name: &str, interval: &str, taskmodule: &str) -> NewPeriodicTask {
    NewPeriodicTask::new(name, interval, taskmodule)
}

/// 解析 RFC3339 时间，测试里用来写固定时间点
pub fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| panic!("invalid test timestamp {rfc3339}: {e}"))
}
