pub mod app;
pub mod cli;
pub mod output;

pub use app::Application;
pub use cli::{Cli, Commands};
