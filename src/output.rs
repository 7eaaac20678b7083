//! 标准输出上的表格与摘要

use chrono::{DateTime, SecondsFormat, Utc};

use periodic_core::{BatchReport, PeriodicTask, RunOutcome};

const TASK_HEADERS: [&str; 7] = [
    "active",
    "id",
    "name",
    "interval",
    "taskmodule",
    "nodes",
    "options",
];

/// 任务列表；给出 `next_runs` 时追加一列下一次执行时间
pub fn task_table(tasks: &[PeriodicTask], next_runs: Option<&[Option<DateTime<Utc>>]>) -> String {
    let mut headers: Vec<&str> = TASK_HEADERS.to_vec();
    if next_runs.is_some() {
        headers.push("next_run");
    }

    let rows: Vec<Vec<String>> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let mut row = vec![
                if task.active { "yes" } else { "no" }.to_string(),
                task.id.to_string(),
                task.name.clone(),
                task.interval.clone(),
                task.taskmodule.clone(),
                task.nodes_display(),
                task.options_json(),
            ];
            if let Some(next_runs) = next_runs {
                let next = next_runs.get(index).copied().flatten();
                row.push(next.map(timestamp).unwrap_or_else(|| "-".to_string()));
            }
            row
        })
        .collect();

    render(&headers, &rows)
}

pub fn outcome_line(outcome: &RunOutcome) -> String {
    let status = if outcome.success { "OK" } else { "FAILED" };
    let mut line = format!(
        "{status} {} (id={}) node={} duration={}ms",
        outcome.task_name, outcome.task_id, outcome.node, outcome.duration_ms
    );
    if let Some(message) = outcome.message.as_deref().filter(|m| !m.is_empty()) {
        line.push_str(": ");
        line.push_str(message.lines().next().unwrap_or_default());
    }
    line
}

/// run_scheduled 的结果摘要
pub fn batch_summary(report: &BatchReport) -> String {
    let mut text = String::new();
    if report.dry_run {
        text.push_str(&format!(
            "dry run on {} at {}: {} task(s) due\n",
            report.node,
            timestamp(report.now),
            report.entries.len()
        ));
        let tasks: Vec<PeriodicTask> = report.entries.iter().map(|e| e.task.clone()).collect();
        if !tasks.is_empty() {
            text.push_str(&task_table(&tasks, None));
        }
        return text;
    }

    for outcome in report.entries.iter().filter_map(|e| e.outcome.as_ref()) {
        text.push_str(&outcome_line(outcome));
        text.push('\n');
    }
    text.push_str(&format!(
        "{} task(s) run on {}, {} failed\n",
        report.executed_count(),
        report.node,
        report.failed_count()
    ));
    text
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        let last = cells.len().saturating_sub(1);
        let mut line = String::new();
        for (index, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if index == last {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{cell:<width$}  ", width = width));
            }
        }
        line.push('\n');
        line
    };

    let mut text = format_row(headers.to_vec());
    for row in rows {
        text.push_str(&format_row(row.iter().map(String::as_str).collect()));
    }
    text
}
