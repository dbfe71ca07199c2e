//! 模块锁定规则引擎
//!
//! 根据声明式规则动态覆盖课程模块的状态，并将主模块投影为计分模块：
//! - 条件评估（user_email / progress_based / time_based / custom）
//! - 有序规则存储，首个匹配规则生效
//! - 主模块到计分模块的 ID 与状态映射
//! - 调试用命令行工具

pub mod bootstrap;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod models;
pub mod operators;
pub mod pipeline;
pub mod settings;
pub mod store;
pub mod sync;

pub use bootstrap::{
    HACKATHON_TEST_EMAIL, default_rules, setup_module_locking, setup_module_locking_with,
};
pub use error::{LockError, Result};
pub use evaluator::ConditionEvaluator;
pub use executor::{ApplicationResult, RuleExecutor, RuleOverride, apply_rules};
pub use models::{
    Comparison, EvaluationContext, Level, LockCondition, LockRule, Module, ModuleStatus,
    ScoreModule, ScoreModuleStatus,
};
pub use operators::{ConditionOperator, ConditionType};
pub use pipeline::{DynamicModules, ModuleSet, ModuleSource, StaticModuleSource};
pub use settings::LockSettings;
pub use store::LockRuleStore;
pub use sync::{MappingRow, ModuleMapping, SCORE_MODULE_IDS, sync_main_to_score};
