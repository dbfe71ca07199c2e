//! 日志订阅器初始化
//!
//! 根据配置选择 JSON 或人类可读格式，并通过 `EnvFilter` 控制日志级别。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

/// Tracing 资源守卫
///
/// 日志订阅器为全局单例，守卫仅标记它已被安装。
pub struct TracingGuard;

/// 初始化 tracing 日志
///
/// 过滤器优先读取 `RUST_LOG`，其次使用配置中的级别，都无效时回退到 info。
pub fn init(config: &ObservabilityConfig) -> Result<TracingGuard> {
    let env_filter = build_filter(config);

    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(TracingGuard)
}

fn build_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_uses_configured_directives() {
        // RUST_LOG 优先，运行环境设置了它时无法校验配置中的级别
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let config = ObservabilityConfig::default().with_log_level("module_lock=debug,warn");
        let filter = build_filter(&config).to_string();

        assert!(filter.contains("module_lock=debug"), "filter: {}", filter);
        assert!(filter.contains("warn"), "filter: {}", filter);
    }

    #[test]
    fn test_second_init_fails() {
        let config = ObservabilityConfig::default();
        let first = init(&config);
        let second = init(&config);
        // 全局订阅器只能安装一次
        assert!(first.is_err() || second.is_err());
    }
}
