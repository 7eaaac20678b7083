//! 任务模块注册与执行

pub mod executor;
pub mod modules;
pub mod registry;

pub use executor::{ModuleExecutor, TIMEOUT_OPTION};
pub use modules::{HttpModule, HttpTaskParams, NoopModule, ShellModule, ShellTaskParams};
pub use registry::ModuleRegistry;
