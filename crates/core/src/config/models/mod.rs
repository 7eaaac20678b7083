pub mod app_config;
pub mod database;
pub mod node_executor;
pub mod observability;

pub use app_config::{AppConfig, DEFAULT_CONFIG_PATHS};
pub use database::{DatabaseBackend, DatabaseConfig};
pub use node_executor::{ExecutorConfig, NodeConfig};
pub use observability::ObservabilityConfig;
