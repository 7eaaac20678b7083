//! 调度间隔表达式解析
//!
//! 支持的语法（全部按 UTC 计算）：
//!
//! - 固定间隔：`every 30m`、`@every 1h30m` 或直接写 `6h`，单位 `s`/`m`/`h`/`d`/`w`
//! - 宏：`@yearly` `@annually` `@monthly` `@weekly` `@daily` `@midnight` `@hourly`
//! - cron 表达式：5 段（分 时 日 月 周）、6 段（秒 分 时 日 月 周）或 7 段（再加年）
//!
//! 星期字段使用 crontab 编号（0 和 7 都表示周日）。日和星期同时受限时按
//! crontab 惯例取并集：任一字段匹配即触发。

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use cron::Schedule;
use tracing::warn;

use periodic_core::{IntervalEvaluator, PeriodicError, PeriodicResult};

const MACROS: [(&str, &str); 7] = [
    ("@yearly", "0 0 1 1 *"),
    ("@annually", "0 0 1 1 *"),
    ("@monthly", "0 0 1 * *"),
    ("@weekly", "0 0 * * 0"),
    ("@daily", "0 0 * * *"),
    ("@midnight", "0 0 * * *"),
    ("@hourly", "0 * * * *"),
];

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// 解析后的调度间隔
#[derive(Debug, Clone)]
pub enum Interval {
    /// 距上次执行固定时长
    Every(Duration),
    /// 日历时间点
    Cron(CronSchedule),
}

/// 一个或两个 cron 调度的并集
#[derive(Debug, Clone)]
pub struct CronSchedule {
    source: String,
    schedules: Vec<Schedule>,
}

impl CronSchedule {
    pub fn source(&self) -> &str {
        &self.source
    }

    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedules
            .iter()
            .filter_map(|schedule| schedule.after(&after).next())
            .min()
    }
}

impl Interval {
    pub fn parse(expr: &str) -> PeriodicResult<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(invalid(expr, "表达式为空"));
        }

        let lower = trimmed.to_ascii_lowercase();
        if let Some(rest) = lower
            .strip_prefix("@every")
            .or_else(|| lower.strip_prefix("every "))
        {
            return parse_duration(rest.trim())
                .map(Interval::Every)
                .map_err(|message| invalid(expr, &message));
        }

        if lower.starts_with('@') {
            let (_, cron_expr) = MACROS
                .iter()
                .find(|(name, _)| *name == lower)
                .ok_or_else(|| invalid(expr, "未知的宏"))?;
            return parse_cron(cron_expr, trimmed).map(Interval::Cron);
        }

        if !trimmed.contains(char::is_whitespace) {
            return parse_duration(trimmed)
                .map(Interval::Every)
                .map_err(|message| invalid(expr, &message));
        }

        parse_cron(trimmed, trimmed).map(Interval::Cron)
    }

    /// 严格晚于 `after` 的下一个可执行时间点
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Interval::Every(period) => after.checked_add_signed(*period),
            Interval::Cron(cron) => cron.next_after(after),
        }
    }

    pub fn is_due(&self, last_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_run {
            None => true,
            Some(last) => match self.next_after(last) {
                Some(next) => next <= now,
                None => {
                    warn!("无法计算下一次执行时间，上次执行时间: {}", last);
                    false
                }
            },
        }
    }

    /// 从指定时间开始的多个执行时间
    pub fn upcoming(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut times = Vec::with_capacity(count);
        let mut cursor = from;
        while times.len() < count {
            match self.next_after(cursor) {
                Some(next) => {
                    times.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        times
    }
}

impl FromStr for Interval {
    type Err = PeriodicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Every(period) => write!(f, "every {}s", period.num_seconds()),
            Interval::Cron(cron) => write!(f, "{}", cron.source),
        }
    }
}

fn invalid(expr: &str, message: &str) -> PeriodicError {
    PeriodicError::InvalidInterval {
        expr: expr.to_string(),
        message: message.to_string(),
    }
}

/// 解析 `1h30m` 形式的时长
fn parse_duration(text: &str) -> Result<Duration, String> {
    if text.is_empty() {
        return Err("缺少时长".to_string());
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let unit: i64 = match ch.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            other => return Err(format!("未知的时间单位: {other}")),
        };
        if digits.is_empty() {
            return Err(format!("时间单位 {ch} 前缺少数值"));
        }
        let value: i64 = digits
            .parse()
            .map_err(|_| format!("数值过大: {digits}"))?;
        digits.clear();
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| "时长溢出".to_string())?;
    }

    if !digits.is_empty() {
        return Err(format!("数值 {digits} 缺少时间单位"));
    }
    if total <= 0 {
        return Err("时长必须大于0".to_string());
    }
    Duration::try_seconds(total).ok_or_else(|| "时长溢出".to_string())
}

fn parse_cron(expr: &str, source: &str) -> PeriodicResult<CronSchedule> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let (sec, min, hour, dom, month, dow, year) = match fields.as_slice() {
        [min, hour, dom, month, dow] => ("0", *min, *hour, *dom, *month, *dow, None),
        [sec, min, hour, dom, month, dow] => (*sec, *min, *hour, *dom, *month, *dow, None),
        [sec, min, hour, dom, month, dow, year] => {
            (*sec, *min, *hour, *dom, *month, *dow, Some(*year))
        }
        _ => {
            return Err(invalid(
                source,
                &format!("cron 表达式需要5到7个字段，实际为{}个", fields.len()),
            ))
        }
    };

    let dom_restricted = is_restricted(dom);
    let dow_restricted = is_restricted(dow);
    let dom = if dom == "?" { "*" } else { dom };
    let dow = expand_day_of_week(dow).map_err(|message| invalid(source, &message))?;

    let build = |dom: &str, dow: &str| -> PeriodicResult<Schedule> {
        let mut parts = vec![sec, min, hour, dom, month, dow];
        if let Some(year) = year {
            parts.push(year);
        }
        Schedule::from_str(&parts.join(" ")).map_err(|e| invalid(source, &e.to_string()))
    };

    let schedules = if dom_restricted && dow_restricted {
        vec![build(dom, "*")?, build("*", dow.as_str())?]
    } else {
        vec![build(dom, dow.as_str())?]
    };

    Ok(CronSchedule {
        source: source.to_string(),
        schedules,
    })
}

/// 以 `*` 开头或为 `?` 的字段视为不受限
fn is_restricted(field: &str) -> bool {
    !(field.starts_with('*') || field == "?")
}

/// 把 crontab 星期字段展开为显式的星期名列表
fn expand_day_of_week(field: &str) -> Result<String, String> {
    if field == "*" || field == "?" {
        return Ok("*".to_string());
    }

    let mut days = BTreeSet::new();
    for part in field.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step: u8 = step
                    .parse()
                    .map_err(|_| format!("无效的星期步长: {part}"))?;
                if step == 0 {
                    return Err(format!("星期步长必须大于0: {part}"));
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (start, end) = if range == "*" {
            (0, 6)
        } else if let Some((start, end)) = range.split_once('-') {
            (parse_weekday(start)?, parse_weekday(end)?)
        } else {
            let start = parse_weekday(range)?;
            (start, if step.is_some() { 6 } else { start })
        };

        if start > end {
            return Err(format!("无效的星期范围: {part}"));
        }

        let step = step.unwrap_or(1) as usize;
        for day in (start..=end).step_by(step) {
            days.insert(day % 7);
        }
    }

    if days.len() == 7 {
        return Ok("*".to_string());
    }
    Ok(days
        .iter()
        .map(|day| WEEKDAY_NAMES[*day as usize])
        .collect::<Vec<_>>()
        .join(","))
}

fn parse_weekday(value: &str) -> Result<u8, String> {
    if let Ok(number) = value.parse::<u8>() {
        if number <= 7 {
            return Ok(number);
        }
        return Err(format!("星期取值超出范围: {value}"));
    }
    let lower = value.to_ascii_lowercase();
    lower
        .get(..3)
        .filter(|_| lower.len() == 3 || is_full_weekday_name(&lower))
        .and_then(|prefix| {
            WEEKDAY_NAMES
                .iter()
                .position(|name| name.eq_ignore_ascii_case(prefix))
        })
        .map(|index| index as u8)
        .ok_or_else(|| format!("无效的星期: {value}"))
}

fn is_full_weekday_name(lower: &str) -> bool {
    matches!(
        lower,
        "sunday" | "monday" | "tuesday" | "wednesday" | "thursday" | "friday" | "saturday"
    )
}

/// 基于 [`Interval`] 的默认表达式求值器
#[derive(Debug, Clone, Default)]
pub struct CronIntervalEvaluator;

impl IntervalEvaluator for CronIntervalEvaluator {
    fn validate(&self, expr: &str) -> PeriodicResult<()> {
        Interval::parse(expr).map(|_| ())
    }

    fn next_run_after(
        &self,
        expr: &str,
        after: DateTime<Utc>,
    ) -> PeriodicResult<Option<DateTime<Utc>>> {
        Ok(Interval::parse(expr)?.next_after(after))
    }

    fn is_due(
        &self,
        expr: &str,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> PeriodicResult<bool> {
        Ok(Interval::parse(expr)?.is_due(last_run, now))
    }
}
