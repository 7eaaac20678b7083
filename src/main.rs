use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use periodic::{Application, Cli};
use periodic_core::logging::{LogFormat, LogLevel};
use periodic_core::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("命令执行失败: {e:#}");
            eprintln!("错误: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = AppConfig::load(cli.config.as_deref()).context("加载配置失败")?;

    // cron 模式下只保留错误日志
    let log_level = if cli.is_cron_mode() {
        LogLevel::Error
    } else {
        match cli.log_level.as_deref() {
            Some(level) => level.parse::<LogLevel>()?,
            None => config.observability.level()?,
        }
    };
    let log_format = match cli.log_format.as_deref() {
        Some(format) => format.parse::<LogFormat>()?,
        None => config.observability.format()?,
    };
    init_logging(log_level, log_format)?;

    debug!("节点: {}, 数据库: {}", config.node.name, config.database.url);

    let app = Application::from_config(&config).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let success = app.execute(&cli.command, &mut out).await?;
    out.flush()?;
    Ok(success)
}

/// 未设置 `RUST_LOG` 时使用的过滤器
fn default_filter(log_level: LogLevel) -> EnvFilter {
    EnvFilter::new(log_level.as_filter())
}

/// 初始化日志系统，日志统一写到标准错误
fn init_logging(log_level: LogLevel, log_format: LogFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr))
                .try_init()
                .context("初始化Pretty日志格式失败")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_canonical_level() {
        let level: LogLevel = "WARNING".parse().unwrap();
        assert_eq!(default_filter(level).to_string(), "warn");
        assert_eq!(default_filter(LogLevel::Error).to_string(), "error");
    }

    #[test]
    fn test_warning_level_keeps_error_events() {
        use tracing::level_filters::LevelFilter;

        let filter = default_filter("warning".parse().unwrap());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
