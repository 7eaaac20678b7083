use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use periodic_core::{PeriodicError, PeriodicResult, TaskContext, TaskModule, TaskResult};

use super::parse_options;

/// HTTP任务参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTaskParams {
    /// 请求URL
    pub url: String,
    /// HTTP方法，默认 GET
    pub method: Option<String>,
    /// 请求头
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// 请求体，字符串原样发送，其他 JSON 值按 JSON 发送
    pub body: Option<Value>,
    /// 期望的状态码，未设置时任何 2xx 都算成功
    pub expected_status: Option<u16>,
}

/// HTTP任务模块
#[derive(Debug, Clone)]
pub struct HttpModule {
    client: reqwest::Client,
}

impl HttpModule {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskModule for HttpModule {
    fn name(&self) -> &str {
        "http"
    }

    async fn run(&self, context: &TaskContext) -> PeriodicResult<TaskResult> {
        let params: HttpTaskParams = parse_options("HTTP", context)?;
        let method = params.method.as_deref().unwrap_or("GET").to_uppercase();

        info!(
            "执行HTTP任务: task={}, method={}, url={}",
            context.task_name, method, params.url
        );

        let mut request_builder = match method.as_str() {
            "GET" => self.client.get(&params.url),
            "POST" => self.client.post(&params.url),
            "PUT" => self.client.put(&params.url),
            "DELETE" => self.client.delete(&params.url),
            "PATCH" => self.client.patch(&params.url),
            "HEAD" => self.client.head(&params.url),
            _ => {
                return Err(PeriodicError::InvalidTaskOptions(format!(
                    "不支持的HTTP方法: {method}"
                )));
            }
        };

        for (key, value) in &params.headers {
            request_builder = request_builder.header(key, value);
        }

        request_builder = match params.body {
            Some(Value::String(text)) => request_builder.body(text),
            Some(Value::Null) | None => request_builder,
            Some(json) => request_builder.json(&json),
        };

        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let error_message = format!("HTTP请求失败: {e}");
                error!("HTTP任务执行失败: task={}, error={}", context.task_name, error_message);
                return Ok(TaskResult::failure(error_message));
            }
        };

        let status = response.status();
        let success = match params.expected_status {
            Some(expected) => status.as_u16() == expected,
            None => status.is_success(),
        };
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("读取响应体失败: {e}"));

        info!(
            "HTTP任务执行完成: task={}, success={}, status={}",
            context.task_name,
            success,
            status.as_u16()
        );

        Ok(TaskResult {
            success,
            output: Some(format!(
                "HTTP {method} {}\nStatus: {}\nResponse:\n{response_body}",
                params.url,
                status.as_u16()
            )),
            error_message: (!success)
                .then(|| format!("HTTP请求失败，状态码: {}", status.as_u16())),
        })
    }
}
