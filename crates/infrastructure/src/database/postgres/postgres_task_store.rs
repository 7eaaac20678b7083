use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use periodic_core::{
    DatabaseConfig, NewPeriodicTask, PeriodicError, PeriodicResult, PeriodicTask, TaskStore,
};

use crate::database::mapping::{
    attach_last_runs, encode_nodes, encode_options, parse_nodes, parse_options, TASK_COLUMNS,
};

/// 基于 PostgreSQL 的任务存储，供多节点共享
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 连接共享数据库；表结构由任务管理端维护，这里不自动创建
    pub async fn connect(config: &DatabaseConfig) -> PeriodicResult<Self> {
        debug!("Connecting to PostgreSQL task store");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 创建缺失的表，不做版本迁移
    pub async fn bootstrap(&self) -> PeriodicResult<()> {
        debug!("Bootstrapping PostgreSQL task store tables");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS periodic_tasks (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                "interval" TEXT NOT NULL,
                nodes TEXT NOT NULL DEFAULT '[]',
                taskmodule TEXT NOT NULL,
                options TEXT NOT NULL DEFAULT '{}',
                retry_if_failed BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS periodic_task_last_runs (
                task_id BIGINT NOT NULL REFERENCES periodic_tasks(id) ON DELETE CASCADE,
                node TEXT NOT NULL,
                last_run TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (task_id, node)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, task), fields(task_name = %task.name))]
    pub async fn create_task(&self, task: NewPeriodicTask) -> PeriodicResult<PeriodicTask> {
        let row = sqlx::query(
            r#"
            INSERT INTO periodic_tasks (name, active, "interval", nodes, taskmodule, options, retry_if_failed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&task.name)
        .bind(task.active)
        .bind(&task.interval)
        .bind(encode_nodes(&task.nodes)?)
        .bind(&task.taskmodule)
        .bind(encode_options(&task.options)?)
        .bind(task.retry_if_failed)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        debug!("Created task {} with id {}", task.name, id);
        Ok(task.into_task(id))
    }

    fn row_to_task(row: &PgRow) -> PeriodicResult<PeriodicTask> {
        let nodes: String = row.try_get("nodes")?;
        let options: String = row.try_get("options")?;
        Ok(PeriodicTask {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            active: row.try_get("active")?,
            interval: row.try_get("interval")?,
            nodes: parse_nodes(&nodes)?,
            taskmodule: row.try_get("taskmodule")?,
            options: parse_options(&options)?,
            retry_if_failed: row.try_get("retry_if_failed")?,
            last_run: Default::default(),
        })
    }

    fn row_to_last_run(row: &PgRow) -> PeriodicResult<(i64, String, DateTime<Utc>)> {
        Ok((
            row.try_get("task_id")?,
            row.try_get("node")?,
            row.try_get("last_run")?,
        ))
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    #[instrument(skip(self))]
    async fn list_tasks(&self) -> PeriodicResult<Vec<PeriodicTask>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM periodic_tasks ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let mut tasks = rows
            .iter()
            .map(Self::row_to_task)
            .collect::<PeriodicResult<Vec<_>>>()?;

        let run_rows = sqlx::query("SELECT task_id, node, last_run FROM periodic_task_last_runs")
            .fetch_all(&self.pool)
            .await?;
        let runs = run_rows
            .iter()
            .map(Self::row_to_last_run)
            .collect::<PeriodicResult<Vec<_>>>()?;
        attach_last_runs(&mut tasks, runs);

        debug!("Loaded {} tasks", tasks.len());
        Ok(tasks)
    }

    #[instrument(skip(self))]
    async fn get_task_by_name(&self, name: &str) -> PeriodicResult<PeriodicTask> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM periodic_tasks WHERE name = $1");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PeriodicError::TaskNotFound {
                name: name.to_string(),
            })?;
        let mut task = Self::row_to_task(&row)?;

        let run_rows = sqlx::query(
            "SELECT task_id, node, last_run FROM periodic_task_last_runs WHERE task_id = $1",
        )
        .bind(task.id)
        .fetch_all(&self.pool)
        .await?;
        for run in run_rows.iter().map(Self::row_to_last_run) {
            let (_, node, last_run) = run?;
            task.last_run.insert(node, last_run);
        }
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn record_last_run(
        &self,
        task_id: i64,
        node: &str,
        timestamp: DateTime<Utc>,
    ) -> PeriodicResult<()> {
        sqlx::query(
            r#"
            INSERT INTO periodic_task_last_runs (task_id, node, last_run)
            VALUES ($1, $2, $3)
            ON CONFLICT (task_id, node) DO UPDATE SET last_run = EXCLUDED.last_run
            WHERE EXCLUDED.last_run > periodic_task_last_runs.last_run
            "#,
        )
        .bind(task_id)
        .bind(node)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
