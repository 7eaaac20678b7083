pub mod repository;
pub mod scheduler;
pub mod task_executor;

pub use repository::TaskStore;
pub use scheduler::IntervalEvaluator;
pub use task_executor::{TaskExecutor, TaskModule};
