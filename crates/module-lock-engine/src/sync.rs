//! 主模块与计分模块同步
//!
//! 主模块使用字符串 ID 和三态状态（locked / available / completed），计分模块使用
//! 1..=6 的数字 ID 和 locked / unlocked / completed。两者之间的对应关系由
//! `ModuleMapping` 中的 ID 表与状态表确定。同步是全函数：缺失或无法映射的数据
//! 一律退化为 locked，输出固定为 6 个按 ID 升序排列的计分模块。

use crate::error::{LockError, Result};
use crate::models::{Module, ModuleStatus, ScoreModule, ScoreModuleStatus};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use tracing::debug;

/// 计分模块 ID 的完整取值范围
pub const SCORE_MODULE_IDS: RangeInclusive<u8> = 1..=6;

const CANONICAL_IDS: [(&str, u8); 6] = [
    ("1", 1),
    ("2", 2),
    ("3", 3),
    ("4", 4),
    ("HL1", 5),
    ("HL2", 6),
];

/// 模块映射表
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMapping {
    /// (主模块 ID, 计分模块 ID)，按计分模块 ID 升序
    ids: Vec<(String, u8)>,
    statuses: HashMap<ModuleStatus, ScoreModuleStatus>,
}

impl ModuleMapping {
    /// 用自定义 ID 表构建映射，状态表使用默认值
    ///
    /// 计分模块 ID 必须落在 1..=6 内，且两侧 ID 都不能重复。
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, u8)> = Vec::new();
        let mut seen_main = HashSet::new();
        let mut seen_score = HashSet::new();

        for (main_id, score_id) in ids {
            let main_id = main_id.into();

            if !SCORE_MODULE_IDS.contains(&score_id) {
                return Err(LockError::InvalidMapping(format!(
                    "计分模块 ID {} 超出范围 {}..={}",
                    score_id,
                    SCORE_MODULE_IDS.start(),
                    SCORE_MODULE_IDS.end()
                )));
            }
            if !seen_main.insert(main_id.clone()) {
                return Err(LockError::InvalidMapping(format!(
                    "主模块 ID 重复: {}",
                    main_id
                )));
            }
            if !seen_score.insert(score_id) {
                return Err(LockError::InvalidMapping(format!(
                    "计分模块 ID {} 被多个主模块映射",
                    score_id
                )));
            }

            entries.push((main_id, score_id));
        }

        entries.sort_by_key(|(_, score_id)| *score_id);

        Ok(Self {
            ids: entries,
            statuses: default_status_table(),
        })
    }

    /// 替换状态表
    pub fn with_status_table(mut self, statuses: HashMap<ModuleStatus, ScoreModuleStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// 主模块 ID -> 计分模块 ID
    pub fn score_id_for(&self, main_id: &str) -> Option<u8> {
        self.ids
            .iter()
            .find(|(id, _)| id == main_id)
            .map(|(_, score_id)| *score_id)
    }

    /// 计分模块 ID -> 主模块 ID
    pub fn main_id_for(&self, score_id: u8) -> Option<&str> {
        self.ids
            .iter()
            .find(|(_, id)| *id == score_id)
            .map(|(main_id, _)| main_id.as_str())
    }

    /// 状态映射，表中没有的状态一律视为 locked
    pub fn score_status(&self, status: &ModuleStatus) -> ScoreModuleStatus {
        self.statuses
            .get(status)
            .copied()
            .unwrap_or(ScoreModuleStatus::Locked)
    }

    pub fn entries(&self) -> &[(String, u8)] {
        &self.ids
    }
}

impl Default for ModuleMapping {
    fn default() -> Self {
        Self {
            ids: CANONICAL_IDS
                .iter()
                .map(|(main_id, score_id)| (main_id.to_string(), *score_id))
                .collect(),
            statuses: default_status_table(),
        }
    }
}

/// 默认状态表：locked -> locked, available -> unlocked, completed -> completed
pub fn default_status_table() -> HashMap<ModuleStatus, ScoreModuleStatus> {
    HashMap::from([
        (ModuleStatus::Locked, ScoreModuleStatus::Locked),
        (ModuleStatus::Available, ScoreModuleStatus::Unlocked),
        (ModuleStatus::Completed, ScoreModuleStatus::Completed),
    ])
}

/// 将主模块投影为计分模块
///
/// 主模块 ID 重复时以最后一个为准。投影出的计分模块沿用主模块的关卡列表，
/// 占位模块的关卡列表为空。
pub fn sync_main_to_score(main_modules: &[Module], mapping: &ModuleMapping) -> Vec<ScoreModule> {
    let by_id: HashMap<&str, &Module> = main_modules
        .iter()
        .map(|m| (m.id.as_str(), m))
        .collect();

    SCORE_MODULE_IDS
        .map(|score_id| {
            match mapping
                .main_id_for(score_id)
                .and_then(|main_id| by_id.get(main_id))
            {
                Some(module) => ScoreModule {
                    id: score_id,
                    status: mapping.score_status(&module.status),
                    levels: module.levels.clone(),
                },
                None => ScoreModule::locked(score_id),
            }
        })
        .collect()
}

/// 映射对照行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingRow {
    pub main_id: String,
    pub main_status: Option<ModuleStatus>,
    pub score_id: u8,
    pub score_status: Option<ScoreModuleStatus>,
}

/// 生成主模块与计分模块的对照表，不修改任何状态
pub fn mapping_report(
    mapping: &ModuleMapping,
    main_modules: &[Module],
    score_modules: &[ScoreModule],
) -> Vec<MappingRow> {
    mapping
        .entries()
        .iter()
        .map(|(main_id, score_id)| MappingRow {
            main_id: main_id.clone(),
            main_status: main_modules
                .iter()
                .find(|m| &m.id == main_id)
                .map(|m| m.status.clone()),
            score_id: *score_id,
            score_status: score_modules
                .iter()
                .find(|m| m.id == *score_id)
                .map(|m| m.status),
        })
        .collect()
}

/// 以 debug 级别输出映射对照
pub fn debug_module_mappings(
    mapping: &ModuleMapping,
    main_modules: &[Module],
    score_modules: &[ScoreModule],
) {
    debug!(
        main = ?main_modules.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
        score = ?score_modules.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
        "Module mapping debug"
    );

    for row in mapping_report(mapping, main_modules, score_modules) {
        debug!(
            "{}({}) -> {}({})",
            row.main_id,
            row.main_status.as_ref().map_or("N/A", |s| s.as_str()),
            row.score_id,
            row.score_status.map_or("N/A", |s| s.as_str())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    fn full_roster(status: ModuleStatus) -> Vec<Module> {
        ["1", "2", "3", "4", "HL1", "HL2"]
            .iter()
            .map(|id| Module::new(*id, status.clone()))
            .collect()
    }

    fn ids(score: &[ScoreModule]) -> Vec<u8> {
        score.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_empty_input_yields_six_locked() {
        let score = sync_main_to_score(&[], &ModuleMapping::default());

        assert_eq!(ids(&score), vec![1, 2, 3, 4, 5, 6]);
        assert!(score.iter().all(|m| m.status == ScoreModuleStatus::Locked));
        assert!(score.iter().all(|m| m.levels.is_empty()));
    }

    #[test]
    fn test_full_roster_maps_statuses() {
        let mut main = full_roster(ModuleStatus::Locked);
        main[0].status = ModuleStatus::Available;
        main[4].status = ModuleStatus::Completed;
        main[5].status = ModuleStatus::Available;

        let score = sync_main_to_score(&main, &ModuleMapping::default());

        assert_eq!(ids(&score), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(score[0].status, ScoreModuleStatus::Unlocked);
        assert_eq!(score[1].status, ScoreModuleStatus::Locked);
        assert_eq!(score[4].status, ScoreModuleStatus::Completed);
        assert_eq!(score[5].status, ScoreModuleStatus::Unlocked);
    }

    #[test]
    fn test_partial_input_defaults_missing_to_locked() {
        let main = vec![
            Module::new("HL2", ModuleStatus::Completed),
            Module::new("unknown-module", ModuleStatus::Available),
        ];

        let score = sync_main_to_score(&main, &ModuleMapping::default());

        assert_eq!(score.len(), 6);
        assert_eq!(score[5].status, ScoreModuleStatus::Completed);
        assert!(score[..5].iter().all(|m| m.status == ScoreModuleStatus::Locked));
    }

    #[test]
    fn test_unrecognized_status_maps_to_locked() {
        let main = vec![Module::new("1", ModuleStatus::from("unlock"))];

        let score = sync_main_to_score(&main, &ModuleMapping::default());

        assert_eq!(score[0].status, ScoreModuleStatus::Locked);
    }

    #[test]
    fn test_unmapped_score_id_is_locked_placeholder() {
        let mapping = ModuleMapping::new([("1", 1), ("2", 2)]).unwrap();
        let main = full_roster(ModuleStatus::Available);

        let score = sync_main_to_score(&main, &mapping);

        assert_eq!(ids(&score), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(score[1].status, ScoreModuleStatus::Unlocked);
        assert!(score[2..].iter().all(|m| m.status == ScoreModuleStatus::Locked));
    }

    #[test]
    fn test_levels_follow_projected_module() {
        let main = vec![
            Module::new("3", ModuleStatus::Completed)
                .with_levels(vec![Level::new(1, 90), Level::new(2, 70)]),
        ];

        let score = sync_main_to_score(&main, &ModuleMapping::default());

        assert_eq!(score[2].levels.len(), 2);
    }

    #[test]
    fn test_duplicate_main_ids_last_wins() {
        let main = vec![
            Module::new("2", ModuleStatus::Completed),
            Module::new("2", ModuleStatus::Available),
        ];

        let score = sync_main_to_score(&main, &ModuleMapping::default());

        assert_eq!(score[1].status, ScoreModuleStatus::Unlocked);
    }

    #[test]
    fn test_bidirectional_lookup() {
        let mapping = ModuleMapping::default();

        assert_eq!(mapping.score_id_for("HL1"), Some(5));
        assert_eq!(mapping.score_id_for("HL3"), None);
        assert_eq!(mapping.main_id_for(6), Some("HL2"));
        assert_eq!(mapping.main_id_for(7), None);
    }

    #[test]
    fn test_new_mapping_validation() {
        assert!(matches!(
            ModuleMapping::new([("1", 0)]),
            Err(LockError::InvalidMapping(_))
        ));
        assert!(matches!(
            ModuleMapping::new([("1", 7)]),
            Err(LockError::InvalidMapping(_))
        ));
        assert!(matches!(
            ModuleMapping::new([("1", 1), ("2", 1)]),
            Err(LockError::InvalidMapping(_))
        ));
        assert!(matches!(
            ModuleMapping::new([("1", 1), ("1", 2)]),
            Err(LockError::InvalidMapping(_))
        ));

        let mapping = ModuleMapping::new(CANONICAL_IDS).unwrap();
        assert_eq!(mapping, ModuleMapping::default());
    }

    #[test]
    fn test_custom_status_table() {
        let table = HashMap::from([(ModuleStatus::Available, ScoreModuleStatus::Completed)]);
        let mapping = ModuleMapping::default().with_status_table(table);

        assert_eq!(
            mapping.score_status(&ModuleStatus::Available),
            ScoreModuleStatus::Completed
        );
        assert_eq!(
            mapping.score_status(&ModuleStatus::Completed),
            ScoreModuleStatus::Locked
        );
    }

    #[test]
    fn test_mapping_report() {
        let main = vec![Module::new("1", ModuleStatus::Available)];
        let mapping = ModuleMapping::default();
        let score = sync_main_to_score(&main, &mapping);

        let report = mapping_report(&mapping, &main, &score);

        assert_eq!(report.len(), 6);
        assert_eq!(report[0].main_status, Some(ModuleStatus::Available));
        assert_eq!(report[0].score_status, Some(ScoreModuleStatus::Unlocked));
        assert_eq!(report[5].main_id, "HL2");
        assert_eq!(report[5].main_status, None);
        assert_eq!(report[5].score_status, Some(ScoreModuleStatus::Locked));

        // 仅输出日志
        debug_module_mappings(&mapping, &main, &score);
    }
}
