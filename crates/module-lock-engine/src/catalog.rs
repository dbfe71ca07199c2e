//! 静态模块目录与分数汇总

use crate::models::{Level, Module, ModuleStatus, ScoreModule};
use crate::sync::SCORE_MODULE_IDS;

/// 主模块 ID 顺序
pub const MAIN_MODULE_IDS: [&str; 6] = ["1", "2", "3", "4", "HL1", "HL2"];

/// 默认主模块目录，全部处于 locked
pub fn default_main_modules() -> Vec<Module> {
    MAIN_MODULE_IDS
        .iter()
        .map(|id| Module::new(*id, ModuleStatus::Locked))
        .collect()
}

/// 未经同步时使用的计分模块，全部处于 locked
pub fn static_score_modules() -> Vec<ScoreModule> {
    SCORE_MODULE_IDS.map(ScoreModule::locked).collect()
}

/// 关卡平均分（四舍五入），没有关卡时为 0
pub fn average_score(levels: &[Level]) -> u32 {
    if levels.is_empty() {
        return 0;
    }

    let total: u64 = levels.iter().map(|l| u64::from(l.score)).sum();
    (total as f64 / levels.len() as f64).round() as u32
}

/// 计分模块得分
pub fn module_score(module: &ScoreModule) -> u32 {
    average_score(&module.levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreModuleStatus;

    #[test]
    fn test_default_main_modules() {
        let modules = default_main_modules();
        let ids: Vec<&str> = modules.iter().map(|m| m.id.as_str()).collect();

        assert_eq!(ids, MAIN_MODULE_IDS);
        assert!(modules.iter().all(|m| m.status == ModuleStatus::Locked));
    }

    #[test]
    fn test_static_score_modules() {
        let modules = static_score_modules();
        assert_eq!(modules.len(), 6);
        assert_eq!(modules[0].id, 1);
        assert!(modules.iter().all(|m| m.status == ScoreModuleStatus::Locked));
    }

    #[test]
    fn test_module_score() {
        let mut module = ScoreModule::locked(1);
        assert_eq!(module_score(&module), 0);

        module.levels = vec![Level::new(1, 90), Level::new(2, 75)];
        // 82.5 -> 83
        assert_eq!(module_score(&module), 83);

        module.levels = vec![Level::new(1, 10), Level::new(2, 10), Level::new(3, 11)];
        assert_eq!(module_score(&module), 10);
    }
}
