use chrono::{DateTime, Utc};

use crate::PeriodicResult;

/// 调度间隔表达式求值接口
///
/// 把表达式解析从调度逻辑中剥离出来，便于替换语法或在测试中注入。
pub trait IntervalEvaluator: Send + Sync {
    /// 校验表达式
    fn validate(&self, expr: &str) -> PeriodicResult<()>;

    /// 严格晚于 `after` 的下一个可执行时间点
    fn next_run_after(
        &self,
        expr: &str,
        after: DateTime<Utc>,
    ) -> PeriodicResult<Option<DateTime<Utc>>>;

    /// 从未执行过的任务立即到期；否则当 `now` 不早于上次执行后的下一个
    /// 时间点时到期
    fn is_due(
        &self,
        expr: &str,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> PeriodicResult<bool> {
        match last_run {
            None => {
                self.validate(expr)?;
                Ok(true)
            }
            Some(last) => Ok(self
                .next_run_after(expr, last)?
                .is_some_and(|next| next <= now)),
        }
    }
}
