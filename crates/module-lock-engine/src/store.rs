//! 锁定规则存储
//!
//! 按插入顺序保存规则。读取端通过 `ArcSwap` 拿到不可变快照（无锁），写入端发布
//! 新的规则列表，因此"清空后重建"可以用 `replace_all` 一步完成，读取端不会看到中间状态。

use crate::error::{LockError, Result};
use crate::executor::RuleExecutor;
use crate::models::{EvaluationContext, LockRule, Module};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 规则存储
///
/// 由调用方创建并持有，clone 后共享同一份规则。规则 ID 不要求唯一。
#[derive(Clone)]
pub struct LockRuleStore {
    rules: Arc<ArcSwap<Vec<LockRule>>>,
}

impl LockRuleStore {
    /// 创建空的规则存储
    pub fn new() -> Self {
        Self {
            rules: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// 用给定规则创建存储
    pub fn with_rules(rules: Vec<LockRule>) -> Self {
        Self {
            rules: Arc::new(ArcSwap::from_pointee(rules)),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.load().is_empty()
    }

    /// 是否存在该 ID 的规则
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.load().iter().any(|r| r.id == rule_id)
    }

    /// 追加规则
    #[instrument(skip(self, rule), fields(rule_id = %rule.id, module_id = %rule.module_id))]
    pub fn add_rule(&self, rule: LockRule) {
        if self.contains(&rule.id) {
            warn!("规则 ID 重复，两条规则都会保留");
        }

        self.rules.rcu(|current| {
            let mut next = current.as_ref().clone();
            next.push(rule.clone());
            next
        });
    }

    /// 删除所有 ID 完全一致的规则，返回删除数量
    #[instrument(skip(self))]
    pub fn remove_rule(&self, rule_id: &str) -> usize {
        let mut removed = 0;
        self.rules.rcu(|current| {
            let next: Vec<LockRule> = current
                .iter()
                .filter(|r| r.id != rule_id)
                .cloned()
                .collect();
            removed = current.len() - next.len();
            next
        });

        info!(removed, "规则已删除: {}", rule_id);
        removed
    }

    /// 删除规则，没有任何规则被删除时返回错误
    pub fn remove_rule_strict(&self, rule_id: &str) -> Result<()> {
        if self.remove_rule(rule_id) == 0 {
            warn!("删除不存在的规则: {}", rule_id);
            return Err(LockError::RuleNotFound(rule_id.to_string()));
        }
        Ok(())
    }

    /// 清空所有规则
    #[instrument(skip(self))]
    pub fn clear_rules(&self) {
        let previous = self.rules.swap(Arc::new(Vec::new()));
        info!("已清空 {} 条规则", previous.len());
    }

    /// 整体替换规则列表
    #[instrument(skip(self, rules), fields(count = rules.len()))]
    pub fn replace_all(&self, rules: Vec<LockRule>) {
        self.rules.store(Arc::new(rules));
    }

    /// 从 JSON 数组追加规则，返回加载数量
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<usize> {
        let rules: Vec<LockRule> =
            serde_json::from_str(json).map_err(|e| LockError::ParseError(e.to_string()))?;
        let count = rules.len();

        self.rules.rcu(|current| {
            let mut next = current.as_ref().clone();
            next.extend(rules.iter().cloned());
            next
        });

        info!("规则已加载: {} 条", count);
        Ok(count)
    }

    /// 获取规则副本，修改返回值不影响存储
    pub fn get_rules(&self) -> Vec<LockRule> {
        self.rules.load().as_ref().clone()
    }

    /// 获取当前规则快照
    pub fn snapshot(&self) -> Arc<Vec<LockRule>> {
        self.rules.load_full()
    }

    /// 在当前快照上应用规则
    pub fn apply_rules(&self, modules: &[Module], context: &EvaluationContext) -> Vec<Module> {
        let rules = self.snapshot();
        RuleExecutor::new().apply(&rules, modules, context).modules
    }
}

impl Default for LockRuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LockRuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockRuleStore")
            .field("rules", &self.rules.load_full())
            .finish()
    }
}
