use clap::{Parser, Subcommand};

/// 命令行入口
#[derive(Parser, Debug)]
#[command(name = "periodic")]
#[command(version)]
#[command(about = "周期任务调度执行工具")]
#[command(long_about = "由系统 cron 定时调用，执行共享数据库中到期的周期任务")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 配置文件路径
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(
        short = 'l',
        long,
        global = true,
        value_name = "LEVEL",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: Option<String>,

    /// 日志格式，覆盖配置文件
    #[arg(long, global = true, value_name = "FORMAT", value_parser = ["json", "pretty"])]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// 列出所有任务
    List {
        /// 额外显示该节点上的下一次执行时间
        #[arg(short, long)]
        node: Option<String>,
    },
    /// 立即执行指定任务，忽略活跃状态、节点限制和调度间隔
    Run {
        /// 任务名称
        #[arg(short, long)]
        task: String,
        /// 节点名称，默认取配置
        #[arg(short, long)]
        node: Option<String>,
    },
    /// 执行当前节点上所有到期的任务
    #[command(name = "run_scheduled")]
    RunScheduled {
        /// 节点名称，默认取配置
        #[arg(short, long)]
        node: Option<String>,
        /// 只列出到期任务，不执行
        #[arg(long = "dryrun")]
        dry_run: bool,
        /// cron 模式：不输出到标准输出，日志只保留错误
        #[arg(long)]
        cron: bool,
    },
}

impl Cli {
    pub fn is_cron_mode(&self) -> bool {
        matches!(self.command, Commands::RunScheduled { cron: true, .. })
    }
}
