//! 周期任务的到期判定与运行协调

pub mod coordinator;
pub mod cron_utils;
pub mod scheduler;

pub use coordinator::RunCoordinator;
pub use cron_utils::{CronIntervalEvaluator, Interval};
pub use scheduler::ScheduleEvaluator;
