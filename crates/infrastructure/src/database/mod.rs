mod mapping;
pub mod postgres;
pub mod sqlite;

use std::sync::Arc;

use tracing::info;

use periodic_core::config::DatabaseBackend;
use periodic_core::{DatabaseConfig, PeriodicError, PeriodicResult, TaskStore};

pub use postgres::PostgresTaskStore;
pub use sqlite::SqliteTaskStore;

/// 按 URL 协议选择存储后端
///
/// SQLite 在连接时自动建表；PostgreSQL 是共享数据库，表结构由外部维护。
pub async fn connect_task_store(config: &DatabaseConfig) -> PeriodicResult<Arc<dyn TaskStore>> {
    match config.backend() {
        Some(DatabaseBackend::Sqlite) => {
            info!("使用SQLite任务存储");
            Ok(Arc::new(SqliteTaskStore::connect(config).await?))
        }
        Some(DatabaseBackend::Postgres) => {
            info!("使用PostgreSQL任务存储");
            Ok(Arc::new(PostgresTaskStore::connect(config).await?))
        }
        None => Err(PeriodicError::config_error(format!(
            "不支持的数据库URL: {}",
            config.url
        ))),
    }
}
