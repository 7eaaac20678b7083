//! # Periodic Testing Utils
//!
//! 各 crate 共享的测试替身与测试数据构造器。
//!
//! - **MockTaskStore**: 内存中的任务存储，可以切换为写入失败
//! - **MockTaskModule**: 按预设行为成功、失败、报错、panic 或睡眠的任务模块
//! - **TaskBuilder**: 带默认值的任务构造器
//! - **PostgresTestContainer**: 基于 testcontainers 的 PostgreSQL 实例
//!
//! ```toml
//! [dev-dependencies]
//! periodic-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod containers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use mocks::*;
