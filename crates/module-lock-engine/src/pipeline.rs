//! 动态模块流水线
//!
//! 基线模块 -> 安装规则 -> 应用规则 -> 同步为计分模块。每次调用都基于新的上下文
//! 从头计算，不缓存结果。

use crate::bootstrap::{default_rules, setup_module_locking_with};
use crate::catalog::default_main_modules;
use crate::models::{EvaluationContext, LockRule, Module, ScoreModule};
use crate::store::LockRuleStore;
use crate::sync::{ModuleMapping, debug_module_mappings, sync_main_to_score};
use serde::Serialize;
use tracing::{debug, instrument};

/// 基线模块来源
#[cfg_attr(test, mockall::automock)]
pub trait ModuleSource: Send + Sync {
    /// 返回静态定义的主模块列表
    fn main_modules(&self) -> Vec<Module>;
}

/// 固定列表的模块来源
#[derive(Debug, Clone)]
pub struct StaticModuleSource {
    modules: Vec<Module>,
}

impl StaticModuleSource {
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }
}

impl Default for StaticModuleSource {
    fn default() -> Self {
        Self::new(default_main_modules())
    }
}

impl ModuleSource for StaticModuleSource {
    fn main_modules(&self) -> Vec<Module> {
        self.modules.clone()
    }
}

/// 主模块与计分模块
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSet {
    pub main_modules: Vec<Module>,
    pub score_modules: Vec<ScoreModule>,
}

/// 动态模块计算入口
pub struct DynamicModules<S> {
    source: S,
    store: LockRuleStore,
    rules: Vec<LockRule>,
    mapping: ModuleMapping,
}

impl<S: ModuleSource> DynamicModules<S> {
    /// 使用内置规则与默认映射
    pub fn new(source: S) -> Self {
        Self {
            source,
            store: LockRuleStore::new(),
            rules: default_rules(),
            mapping: ModuleMapping::default(),
        }
    }

    /// 替换安装时使用的规则
    pub fn with_rules(mut self, rules: Vec<LockRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_mapping(mut self, mapping: ModuleMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// 共享外部的规则存储
    pub fn with_store(mut self, store: LockRuleStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &LockRuleStore {
        &self.store
    }

    pub fn mapping(&self) -> &ModuleMapping {
        &self.mapping
    }

    pub fn rules(&self) -> &[LockRule] {
        &self.rules
    }

    /// 计算主模块
    ///
    /// 没有用户邮箱（或邮箱为空串）时直接返回基线模块，不安装也不应用规则。
    #[instrument(skip(self, additional_context))]
    pub fn main_modules(
        &self,
        user_email: Option<&str>,
        additional_context: &EvaluationContext,
    ) -> Vec<Module> {
        let base = self.source.main_modules();

        let Some(email) = user_email.filter(|e| !e.is_empty()) else {
            debug!(
                modules = ?labels(&base),
                "No user email provided - using base module configuration"
            );
            return base;
        };

        setup_module_locking_with(&self.store, &self.rules);

        let context = EvaluationContext::new()
            .with_user_email(Some(email))
            .merged(additional_context);

        let processed = self.store.apply_rules(&base, &context);

        debug!(
            original = ?labels(&base),
            processed = ?labels(&processed),
            "Dynamic main modules processed"
        );

        processed
    }

    /// 计算计分模块
    pub fn score_modules(
        &self,
        user_email: Option<&str>,
        additional_context: &EvaluationContext,
    ) -> Vec<ScoreModule> {
        self.all_modules(user_email, additional_context).score_modules
    }

    /// 同时计算主模块与计分模块
    pub fn all_modules(
        &self,
        user_email: Option<&str>,
        additional_context: &EvaluationContext,
    ) -> ModuleSet {
        let main_modules = self.main_modules(user_email, additional_context);
        let score_modules = sync_main_to_score(&main_modules, &self.mapping);

        debug_module_mappings(&self.mapping, &main_modules, &score_modules);

        ModuleSet {
            main_modules,
            score_modules,
        }
    }
}

fn labels<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(|m| m.to_string()).collect()
}
