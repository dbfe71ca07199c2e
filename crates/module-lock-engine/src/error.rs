//! 规则引擎错误类型
//!
//! 评估、应用与同步本身不会失败，只有规则/配置的加载和映射表构建会返回错误。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("无效的模块映射: {0}")]
    InvalidMapping(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("配置加载失败: {0}")]
    ConfigError(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, LockError>;
