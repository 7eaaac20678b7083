//! 内置任务模块

mod http;
mod noop;
mod shell;

pub use http::{HttpModule, HttpTaskParams};
pub use noop::NoopModule;
pub use shell::{ShellModule, ShellTaskParams};

use serde::de::DeserializeOwned;
use serde_json::Value;

use periodic_core::{PeriodicError, PeriodicResult, TaskContext};

/// 把任务参数解析为模块自己的参数结构
pub(crate) fn parse_options<T: DeserializeOwned>(
    module: &str,
    context: &TaskContext,
) -> PeriodicResult<T> {
    serde_json::from_value(Value::Object(context.options.clone())).map_err(|e| {
        PeriodicError::InvalidTaskOptions(format!("解析{module}任务参数失败: {e}"))
    })
}
