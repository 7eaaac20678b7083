use serde::{Deserialize, Serialize};

use crate::logging::{LogFormat, LogLevel};
use crate::PeriodicResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 校验与日志初始化共用同一套解析，`warning`、`INFO` 等写法都归一
    pub fn level(&self) -> PeriodicResult<LogLevel> {
        self.log_level.parse()
    }

    pub fn format(&self) -> PeriodicResult<LogFormat> {
        self.log_format.parse()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.level()?;
        self.format()?;
        Ok(())
    }
}
