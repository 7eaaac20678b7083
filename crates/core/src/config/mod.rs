//! 配置管理
//!
//! 配置按以下顺序合并，后者覆盖前者：
//!
//! 1. 内置默认值（节点名默认取主机名）
//! 2. TOML 配置文件（命令行指定，或依次查找 [`DEFAULT_CONFIG_PATHS`]）
//! 3. `PERIODIC_` 前缀的环境变量，嵌套键用 `__` 连接
//!
//! ```toml
//! [database]
//! url = "postgres://periodic@db.internal/periodic"
//! max_connections = 5
//! min_connections = 1
//! connection_timeout_seconds = 30
//!
//! [node]
//! name = "node1"
//!
//! [executor]
//! task_timeout_seconds = 600
//!
//! [observability]
//! log_level = "info"
//! log_format = "json"
//! ```

pub mod models;

pub use models::*;

#[cfg(test)]
mod tests;
