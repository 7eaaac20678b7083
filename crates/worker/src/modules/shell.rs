use std::collections::HashMap;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::info;

use periodic_core::{PeriodicError, PeriodicResult, TaskContext, TaskModule, TaskResult};

use super::parse_options;

/// Shell任务参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellTaskParams {
    /// 要执行的命令
    pub command: String,
    /// 命令参数
    #[serde(default)]
    pub args: Vec<String>,
    /// 工作目录
    pub working_dir: Option<String>,
    /// 环境变量
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// Shell任务模块，退出码为 0 时成功
#[derive(Debug, Default, Clone)]
pub struct ShellModule;

impl ShellModule {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TaskModule for ShellModule {
    fn name(&self) -> &str {
        "shell"
    }

    async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult> {
        let params: ShellTaskParams = parse_options("Shell", context)?;

        info!(
            "执行Shell任务: task={}, command={}, args={:?}",
            context.task_name, params.command, params.args
        );

        let mut cmd = Command::new(&params.command);
        cmd.args(&params.args)
            .envs(&params.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // 超时中止时一并结束子进程
            .kill_on_drop(true);
        if let Some(dir) = &params.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| PeriodicError::TaskExecution(format!("启动Shell命令失败: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        let exit_code = output.status.code();

        info!(
            "Shell任务执行完成: task={}, success={}, exit_code={:?}",
            context.task_name,
            output.status.success(),
            exit_code
        );

        if output.status.success() {
            Ok(TaskResult {
                success: true,
                output: (!stdout.is_empty()).then_some(stdout),
                error_message: None,
            })
        } else {
            let error_message = if stderr.is_empty() {
                format!("命令执行失败，退出码: {exit_code:?}")
            } else {
                format!("命令执行失败，退出码: {exit_code:?}: {stderr}")
            };
            Ok(TaskResult {
                success: false,
                output: (!stdout.is_empty()).then_some(stdout),
                error_message: Some(error_message),
            })
        }
    }
}
