pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod node;
pub mod traits;

pub use config::{AppConfig, DatabaseConfig, ExecutorConfig, NodeConfig};
pub use errors::*;
pub use logging::RunLogger;
pub use models::{
    BatchEntry, BatchReport, ExecutionReport, NewPeriodicTask, PeriodicTask, RunOutcome,
    TaskContext, TaskOptions, TaskResult,
};
pub use node::NodeResolver;
pub use traits::{IntervalEvaluator, TaskExecutor, TaskModule, TaskStore};

/// 统一的Result类型
pub type PeriodicResult<T> = std::result::Result<T, PeriodicError>;
