use serde::{Deserialize, Serialize};

/// 本进程代表的节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// 未配置时取主机名
    #[serde(default = "default_node_name")]
    pub name: String,
}

pub fn default_node_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: default_node_name(),
        }
    }
}

impl NodeConfig {
    /// 空名称在这里放行，命令行可以显式指定节点；由 `NodeResolver` 兜底
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.chars().any(char::is_whitespace) {
            return Err(anyhow::anyhow!("节点名称不能包含空白字符: {:?}", self.name));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// 单个任务的超时时间，0 表示不限制
    pub task_timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            task_timeout_seconds: 3600,
        }
    }
}

impl ExecutorConfig {
    pub fn task_timeout(&self) -> Option<std::time::Duration> {
        (self.task_timeout_seconds > 0)
            .then(|| std::time::Duration::from_secs(self.task_timeout_seconds))
    }
}
