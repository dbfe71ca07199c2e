//! 模块锁定调试工具
//!
//! 加载配置、初始化日志后执行子命令，结果以 JSON 输出到 stdout。

use anyhow::Result;
use clap::Parser;
use hackathon_shared::config::AppConfig;
use hackathon_shared::observability;
use module_lock::LockSettings;
use module_lock::cli::{Cli, CommandRunner};
use tracing::info;

const SERVICE_NAME: &str = "module-lock";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 命令行日志级别优先于配置文件
    let mut obs_config = config.observability_for(SERVICE_NAME);
    if let Some(level) = &cli.log_level {
        obs_config = obs_config.with_log_level(level.as_str());
    }
    let _guard = observability::init(&obs_config)?;

    let settings = LockSettings::load(SERVICE_NAME)?;
    let runner = CommandRunner::from_settings(settings)?;

    info!(command = ?cli.command, "Running command");
    let output = runner.run(&cli.command)?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
