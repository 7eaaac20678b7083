use crate::config::NodeConfig;
use crate::{PeriodicError, PeriodicResult};

/// 节点身份解析
///
/// 进程启动时用配置中的节点名构造一次，此后只读。命令行显式传入的
/// 节点名优先。
#[derive(Debug, Clone)]
pub struct NodeResolver {
    configured: String,
}

impl NodeResolver {
    pub fn new(configured: impl Into<String>) -> Self {
        Self {
            configured: configured.into(),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(config.name.clone())
    }

    pub fn configured(&self) -> &str {
        &self.configured
    }

    pub fn resolve(&self, explicit: Option<&str>) -> PeriodicResult<String> {
        if let Some(node) = explicit.map(str::trim).filter(|n| !n.is_empty()) {
            return Ok(node.to_string());
        }
        let configured = self.configured.trim();
        if configured.is_empty() {
            return Err(PeriodicError::config_error(
                "未指定节点名称，且配置中的 node.name 为空",
            ));
        }
        Ok(configured.to_string())
    }
}
