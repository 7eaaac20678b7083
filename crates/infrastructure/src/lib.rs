//! 任务存储的 SQL 实现

pub mod database;

pub use database::{connect_task_store, PostgresTaskStore, SqliteTaskStore};
