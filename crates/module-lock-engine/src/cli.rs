//! 调试命令行
//!
//! - `modules` - 计算主模块状态
//! - `scores` - 计算计分模块状态
//! - `rules` - 列出安装时使用的规则
//! - `mapping` - 输出主模块与计分模块的对照表
//!
//! ```bash
//! module-lock modules --email hackathon@example.com
//! module-lock scores --email learner@example.com --context '{"progress_based": 8}'
//! ```

use crate::catalog::module_score;
use crate::error::Result;
use crate::models::EvaluationContext;
use crate::pipeline::{DynamicModules, ModuleSource, StaticModuleSource};
use crate::settings::LockSettings;
use crate::sync::mapping_report;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};

/// 模块锁定调试工具
#[derive(Parser, Debug)]
#[command(name = "module-lock")]
#[command(version, about = "模块锁定规则调试工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// 计算主模块状态
    Modules {
        /// 当前用户邮箱
        #[arg(short, long)]
        email: Option<String>,

        /// 额外的评估上下文（JSON 对象）
        #[arg(short, long)]
        context: Option<String>,
    },

    /// 计算计分模块状态及得分
    Scores {
        #[arg(short, long)]
        email: Option<String>,

        #[arg(short, long)]
        context: Option<String>,
    },

    /// 列出规则
    Rules,

    /// 输出映射对照表
    Mapping {
        #[arg(short, long)]
        email: Option<String>,
    },
}

/// 命令执行器
pub struct CommandRunner<S> {
    dynamic: DynamicModules<S>,
}

impl CommandRunner<StaticModuleSource> {
    pub fn from_settings(settings: LockSettings) -> Result<Self> {
        Ok(Self::new(settings.into_dynamic_modules()?))
    }
}

impl<S: ModuleSource> CommandRunner<S> {
    pub fn new(dynamic: DynamicModules<S>) -> Self {
        Self { dynamic }
    }

    /// 执行子命令，返回待输出的 JSON
    pub fn run(&self, command: &Commands) -> Result<Value> {
        match command {
            Commands::Modules { email, context } => {
                let context = parse_context(context.as_deref())?;
                let modules = self.dynamic.main_modules(email.as_deref(), &context);
                Ok(serde_json::to_value(modules)?)
            }
            Commands::Scores { email, context } => {
                let context = parse_context(context.as_deref())?;
                let modules = self.dynamic.score_modules(email.as_deref(), &context);
                let rows: Vec<Value> = modules
                    .iter()
                    .map(|m| {
                        json!({
                            "id": m.id,
                            "status": m.status,
                            "score": module_score(m),
                        })
                    })
                    .collect();
                Ok(Value::Array(rows))
            }
            Commands::Rules => Ok(serde_json::to_value(self.dynamic.rules())?),
            Commands::Mapping { email } => {
                let set = self
                    .dynamic
                    .all_modules(email.as_deref(), &EvaluationContext::new());
                let report = mapping_report(
                    self.dynamic.mapping(),
                    &set.main_modules,
                    &set.score_modules,
                );
                Ok(serde_json::to_value(report)?)
            }
        }
    }
}

fn parse_context(context: Option<&str>) -> Result<EvaluationContext> {
    match context {
        Some(json) => Ok(EvaluationContext::from_json(json)?),
        None => Ok(EvaluationContext::new()),
    }
}
