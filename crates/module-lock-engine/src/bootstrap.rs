//! 内置规则集
//!
//! 每次调用都先清空再安装固定规则，重复调用得到的规则集合相同。

use crate::models::{LockCondition, LockRule, ModuleStatus};
use crate::store::LockRuleStore;
use tracing::info;

/// 黑客松测试账号
pub const HACKATHON_TEST_EMAIL: &str = "hackathon@example.com";

/// 内置规则：为测试账号解锁模块 1 和 HL2
pub fn default_rules() -> Vec<LockRule> {
    vec![
        LockRule::new(
            "hackathon_user_module_1",
            "1",
            LockCondition::user_email(HACKATHON_TEST_EMAIL),
            ModuleStatus::Available,
        )
        .with_description("Unlock module 1 for hackathon user"),
        LockRule::new(
            "hackathon_user_module_hl2",
            "HL2",
            LockCondition::user_email(HACKATHON_TEST_EMAIL),
            ModuleStatus::Available,
        )
        .with_description("Unlock HL2 for hackathon user"),
    ]
}

/// 安装内置规则
pub fn setup_module_locking(store: &LockRuleStore) {
    setup_module_locking_with(store, &default_rules());
}

/// 安装给定规则，替换存储中已有的全部规则
pub fn setup_module_locking_with(store: &LockRuleStore, rules: &[LockRule]) {
    store.replace_all(rules.to_vec());
    info!(rules = store.len(), "Module locking rules configured");
}
