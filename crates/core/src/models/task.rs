use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 传递给任务模块的参数
pub type TaskOptions = serde_json::Map<String, serde_json::Value>;

/// 周期任务定义
///
/// 表示共享数据库中的一条周期任务，本系统只读取定义并写入各节点的
/// `last_run` 记录，任务的增删改由外部管理界面负责。
///
/// # 字段说明
///
/// - `id`: 任务的唯一标识符，不可变
/// - `name`: 任务的唯一名称，手动执行时按名称查找
/// - `active`: 非活跃任务不会被调度（手动执行不受限制）
/// - `interval`: 调度间隔表达式，cron 表达式或固定间隔
/// - `nodes`: 限定执行的节点列表，为空表示所有节点都可执行
/// - `taskmodule`: 任务模块名称，用于分派到具体实现
/// - `options`: 传递给任务模块的参数
/// - `retry_if_failed`: 失败时是否保留"待执行"状态以便下次重试
/// - `last_run`: 节点名到该节点最近一次被记录的执行时间
///
/// # 使用示例
///
/// ```rust
/// use periodic_core::models::PeriodicTask;
///
/// let task = PeriodicTask {
///     id: 1,
///     name: "nightly_backup".to_string(),
///     active: true,
///     interval: "0 2 * * *".to_string(), // 每天凌晨2点
///     nodes: vec!["node1".to_string()],
///     taskmodule: "shell".to_string(),
///     options: Default::default(),
///     retry_if_failed: true,
///     last_run: Default::default(),
/// };
/// assert!(task.runs_on("node1"));
/// assert!(!task.runs_on("node2"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodicTask {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub interval: String,
    pub nodes: Vec<String>,
    pub taskmodule: String,
    pub options: TaskOptions,
    pub retry_if_failed: bool,
    pub last_run: BTreeMap<String, DateTime<Utc>>,
}

impl PeriodicTask {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 节点列表为空时任务不受节点限制
    pub fn is_node_restricted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn runs_on(&self, node: &str) -> bool {
        !self.is_node_restricted() || self.nodes.iter().any(|n| n == node)
    }

    pub fn last_run_on(&self, node: &str) -> Option<DateTime<Utc>> {
        self.last_run.get(node).copied()
    }

    pub fn options_json(&self) -> String {
        serde_json::Value::Object(self.options.clone()).to_string()
    }

    pub fn nodes_display(&self) -> String {
        if self.nodes.is_empty() {
            "*".to_string()
        } else {
            self.nodes.join(",")
        }
    }
}

/// 新建任务的输入，仅用于初始化数据和测试
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPeriodicTask {
    pub name: String,
    pub active: bool,
    pub interval: String,
    pub nodes: Vec<String>,
    pub taskmodule: String,
    pub options: TaskOptions,
    pub retry_if_failed: bool,
}

impl NewPeriodicTask {
    pub fn new(name: &str, interval: &str, taskmodule: &str) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            interval: interval.to_string(),
            nodes: Vec::new(),
            taskmodule: taskmodule.to_string(),
            options: TaskOptions::new(),
            retry_if_failed: false,
        }
    }

    pub fn into_task(self, id: i64) -> PeriodicTask {
        PeriodicTask {
            id,
            name: self.name,
            active: self.active,
            interval: self.interval,
            nodes: self.nodes,
            taskmodule: self.taskmodule,
            options: self.options,
            retry_if_failed: self.retry_if_failed,
            last_run: BTreeMap::new(),
        }
    }
}
