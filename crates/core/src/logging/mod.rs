pub mod log_level;
pub mod structured_logger;

pub use log_level::{LogFormat, LogLevel};
pub use structured_logger::RunLogger;
