//! 规则执行器
//!
//! 对模块列表逐个应用规则：只看 `module_id` 相同的规则，按插入顺序评估，
//! 第一条条件成立的规则生效，其余规则不再评估。输入的模块和规则都不会被修改。

use crate::evaluator::ConditionEvaluator;
use crate::models::{EvaluationContext, LockRule, Module, ModuleStatus};
use serde::Serialize;
use tracing::debug;

/// 一次状态覆盖记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOverride {
    pub module_id: String,
    pub rule_id: String,
    pub from: ModuleStatus,
    pub to: ModuleStatus,
}

/// 应用结果
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResult {
    pub modules: Vec<Module>,
    pub overrides: Vec<RuleOverride>,
    pub evaluation_trace: Vec<String>,
}

/// 规则执行器
#[derive(Debug, Default)]
pub struct RuleExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl RuleExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 对模块列表应用规则
    pub fn apply(
        &self,
        rules: &[LockRule],
        modules: &[Module],
        context: &EvaluationContext,
    ) -> ApplicationResult {
        let mut result = ApplicationResult {
            modules: Vec::with_capacity(modules.len()),
            overrides: Vec::new(),
            evaluation_trace: Vec::new(),
        };

        for module in modules {
            let next = match self.first_match(rules, module, context, &mut result.evaluation_trace) {
                Some(rule) => {
                    debug!(
                        module_id = %module.id,
                        rule_id = %rule.id,
                        from = %module.status,
                        to = %rule.unlock_action,
                        "规则命中"
                    );
                    result.overrides.push(RuleOverride {
                        module_id: module.id.clone(),
                        rule_id: rule.id.clone(),
                        from: module.status.clone(),
                        to: rule.unlock_action.clone(),
                    });
                    module.with_status(rule.unlock_action.clone())
                }
                None => module.clone(),
            };
            result.modules.push(next);
        }

        result
    }

    /// 查找第一条适用于该模块且条件成立的规则
    fn first_match<'a>(
        &self,
        rules: &'a [LockRule],
        module: &Module,
        context: &EvaluationContext,
        trace: &mut Vec<String>,
    ) -> Option<&'a LockRule> {
        let mut candidates = rules.iter().filter(|r| r.module_id == module.id).peekable();

        if candidates.peek().is_none() {
            if self.trace_enabled {
                trace.push(format!("{}: 无适用规则", module.id));
            }
            return None;
        }

        for rule in candidates {
            let matched = ConditionEvaluator::evaluate(&rule.condition, context);

            if self.trace_enabled {
                trace.push(format!(
                    "{}: {} [{}] => {}",
                    module.id,
                    rule.id,
                    rule.condition,
                    if matched { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }

            if matched {
                return Some(rule);
            }
        }

        None
    }
}

/// 对模块列表应用规则（不记录追踪）
pub fn apply_rules(
    rules: &[LockRule],
    modules: &[Module],
    context: &EvaluationContext,
) -> Vec<Module> {
    RuleExecutor::new().apply(rules, modules, context).modules
}
