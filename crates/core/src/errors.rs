use thiserror::Error;

/// 周期任务系统错误类型定义
#[derive(Debug, Error)]
pub enum PeriodicError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("持久化错误: {0}")]
    Persistence(String),

    #[error("任务未找到: {name}")]
    TaskNotFound { name: String },

    #[error("无效的调度间隔表达式: {expr} - {message}")]
    InvalidInterval { expr: String, message: String },

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("任务执行错误: {0}")]
    TaskExecution(String),

    #[error("任务执行超时: {seconds}秒")]
    ExecutionTimeout { seconds: u64 },

    #[error("无效的任务参数: {0}")]
    InvalidTaskOptions(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl PeriodicError {
    pub fn config_error(message: impl Into<String>) -> Self {
        PeriodicError::Configuration(message.into())
    }

    pub fn persistence_error(message: impl Into<String>) -> Self {
        PeriodicError::Persistence(message.into())
    }

    /// 存储层故障会破坏 last_run 记录的正确性，调用方必须中止本批次
    pub fn is_persistence(&self) -> bool {
        matches!(self, PeriodicError::Database(_) | PeriodicError::Persistence(_))
    }
}

impl From<serde_json::Error> for PeriodicError {
    fn from(err: serde_json::Error) -> Self {
        PeriodicError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(PeriodicError::persistence_error("down").is_persistence());
        assert!(PeriodicError::Database(sqlx::Error::PoolTimedOut).is_persistence());
        assert!(!PeriodicError::config_error("bad").is_persistence());
    }

    #[test]
    fn test_error_display() {
        let err = PeriodicError::TaskNotFound {
            name: "nightly_backup".to_string(),
        };
        assert_eq!(err.to_string(), "任务未找到: nightly_backup");

        let err = PeriodicError::InvalidInterval {
            expr: "bogus".to_string(),
            message: "无法识别".to_string(),
        };
        assert!(err.to_string().contains("bogus"));
    }
}
