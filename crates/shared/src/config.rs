//! 配置管理模块
//!
//! 支持分层 TOML 配置文件加载与环境变量覆盖，供各可执行程序和引擎设置共用。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 环境变量前缀（HACKATHON_OBSERVABILITY__LOG_LEVEL -> observability.log_level）
pub const ENV_PREFIX: &str = "HACKATHON";

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（程序特定配置）
    /// 4. 环境变量（HACKATHON_ 前缀）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let mut config: Self = layered_sources(service_name)?.try_deserialize()?;

        // 服务名未在任何来源中覆盖时，日志也沿用它
        if config.observability.service_name.is_empty() {
            config.observability.service_name = config.service_name.clone();
        }

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 生成指定程序的日志配置，生产环境强制输出 JSON 日志
    pub fn observability_for(&self, service_name: &str) -> ObservabilityConfig {
        let mut observability = self.observability.clone().with_service_name(service_name);
        if self.is_production() {
            observability.json_logs = true;
        }
        observability
    }
}

/// 构建分层配置源
///
/// 环境由 `HACKATHON_ENV` 指定（默认 development），目录由 `CONFIG_DIR` 指定（默认 config）。
pub fn layered_sources(service_name: &str) -> Result<Config, ConfigError> {
    let env = std::env::var("HACKATHON_ENV").unwrap_or_else(|_| "development".to_string());
    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    layered_sources_in(Path::new(&config_dir), &env, service_name)
}

/// 在指定目录下构建分层配置源
pub fn layered_sources_in(
    config_dir: &Path,
    env: &str,
    service_name: &str,
) -> Result<Config, ConfigError> {
    Config::builder()
        .set_default("service_name", service_name)?
        .set_default("environment", env)?
        .add_source(File::from(config_dir.join("default.toml")).required(false))
        .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
        .add_source(File::from(config_dir.join(format!("{}.toml", service_name))).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
}

/// 读取配置中的某个子表，子表不存在时返回默认值
pub fn section_or_default<T>(config: &Config, key: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match config.get::<T>(key) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(T::default()),
        Err(e) => Err(e),
    }
}
