pub mod run;
pub mod task;

pub use run::{BatchEntry, BatchReport, ExecutionReport, RunOutcome, TaskContext, TaskResult};
pub use task::{NewPeriodicTask, PeriodicTask, TaskOptions};
