//! 两种数据库共用的行映射工具
//!
//! `nodes` 与 `options` 在两种数据库里都以 JSON 文本保存。SQLite 没有时间
//! 类型，last_run 用定长的 UTC 文本保存，字符串顺序与时间顺序一致，
//! 单调写入的比较可以直接在 SQL 中完成。

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use periodic_core::{PeriodicError, PeriodicResult, PeriodicTask, TaskOptions};

/// 微秒精度，与 PostgreSQL 的 TIMESTAMPTZ 一致
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub(crate) const TASK_COLUMNS: &str =
    r#"id, name, active, "interval", nodes, taskmodule, options, retry_if_failed"#;

pub(crate) fn parse_nodes(raw: &str) -> PeriodicResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| PeriodicError::Serialization(format!("解析节点列表失败: {e}")))
}

pub(crate) fn parse_options(raw: &str) -> PeriodicResult<TaskOptions> {
    if raw.trim().is_empty() {
        return Ok(TaskOptions::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| PeriodicError::Serialization(format!("解析任务参数失败: {e}")))
}

pub(crate) fn encode_nodes(nodes: &[String]) -> PeriodicResult<String> {
    Ok(serde_json::to_string(nodes)?)
}

pub(crate) fn encode_options(options: &TaskOptions) -> PeriodicResult<String> {
    Ok(serde_json::to_string(options)?)
}

pub(crate) fn format_sqlite_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(SQLITE_TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_sqlite_timestamp(raw: &str) -> PeriodicResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|t| t.with_timezone(&Utc)))
        .map_err(|e| PeriodicError::Serialization(format!("解析执行时间失败: {raw}: {e}")))
}

/// 把 (task_id, node, last_run) 记录合并到对应任务上
pub(crate) fn attach_last_runs(
    tasks: &mut [PeriodicTask],
    runs: impl IntoIterator<Item = (i64, String, DateTime<Utc>)>,
) {
    let index: HashMap<i64, usize> = tasks
        .iter()
        .enumerate()
        .map(|(position, task)| (task.id, position))
        .collect();
    for (task_id, node, last_run) in runs {
        if let Some(&position) = index.get(&task_id) {
            tasks[position].last_run.insert(node, last_run);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use periodic_core::NewPeriodicTask;

    #[test]
    fn test_sqlite_timestamp_orders_like_time() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        let a = format_sqlite_timestamp(earlier);
        let b = format_sqlite_timestamp(later);
        assert_eq!(a, "2024-01-02T03:04:05.000000Z");
        assert!(a < b);
        assert_eq!(parse_sqlite_timestamp(&b).unwrap(), later);
    }

    #[test]
    fn test_parse_accepts_rfc3339() {
        let parsed = parse_sqlite_timestamp("2024-01-02T03:04:05+00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert!(parse_sqlite_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_json_columns() {
        assert!(parse_nodes("").unwrap().is_empty());
        assert_eq!(parse_nodes(r#"["a","b"]"#).unwrap(), vec!["a", "b"]);
        assert!(parse_nodes("not json").is_err());
        assert_eq!(parse_options(r#"{"k":1}"#).unwrap()["k"], 1);
        assert_eq!(encode_nodes(&["a".to_string()]).unwrap(), r#"["a"]"#);
    }

    #[test]
    fn test_attach_last_runs() {
        let mut tasks = vec![
            NewPeriodicTask::new("a", "@daily", "noop").into_task(1),
            NewPeriodicTask::new("b", "@daily", "noop").into_task(2),
        ];
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        attach_last_runs(
            &mut tasks,
            vec![
                (2, "node1".to_string(), at),
                (2, "node2".to_string(), at),
                (9, "node1".to_string(), at),
            ],
        );
        assert!(tasks[0].last_run.is_empty());
        assert_eq!(tasks[1].last_run.len(), 2);
    }
}
