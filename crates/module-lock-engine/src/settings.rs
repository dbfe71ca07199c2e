//! 引擎设置
//!
//! 从分层配置的 `[lock]` 表读取模块目录、内置规则和 ID 映射表；
//! 任何字段缺失时使用内置默认值。

use crate::bootstrap::default_rules;
use crate::catalog::default_main_modules;
use crate::error::Result;
use crate::models::{LockRule, Module};
use crate::pipeline::{DynamicModules, StaticModuleSource};
use crate::sync::ModuleMapping;
use config::Config;
use hackathon_shared::config::{layered_sources, section_or_default};
use serde::Deserialize;
use tracing::info;

/// 配置中的子表名
pub const SETTINGS_KEY: &str = "lock";

/// 引擎设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// 静态主模块目录
    pub modules: Vec<Module>,
    /// 安装时使用的规则
    pub rules: Vec<LockRule>,
    /// 主模块 ID -> 计分模块 ID；缺省时使用内置映射
    pub mapping: Option<Vec<MappingEntry>>,
}

/// ID 映射表中的一行
///
/// 用数组而不是表键表达映射，避免模块 ID 作为配置键时大小写被改写。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MappingEntry {
    pub main_id: String,
    pub score_id: u8,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            modules: default_main_modules(),
            rules: default_rules(),
            mapping: None,
        }
    }
}

impl LockSettings {
    /// 从配置文件和环境变量加载
    pub fn load(service_name: &str) -> Result<Self> {
        let config = layered_sources(service_name)?;
        Self::from_config(&config)
    }

    /// 从已构建的配置读取
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings: Self = section_or_default(config, SETTINGS_KEY)?;

        info!(
            modules = settings.modules.len(),
            rules = settings.rules.len(),
            custom_mapping = settings.mapping.is_some(),
            "Lock settings loaded"
        );

        Ok(settings)
    }

    /// 构建映射表
    pub fn build_mapping(&self) -> Result<ModuleMapping> {
        match &self.mapping {
            Some(entries) => ModuleMapping::new(
                entries
                    .iter()
                    .map(|entry| (entry.main_id.clone(), entry.score_id)),
            ),
            None => Ok(ModuleMapping::default()),
        }
    }

    /// 构建动态模块流水线
    pub fn into_dynamic_modules(self) -> Result<DynamicModules<StaticModuleSource>> {
        let mapping = self.build_mapping()?;

        Ok(DynamicModules::new(StaticModuleSource::new(self.modules))
            .with_rules(self.rules)
            .with_mapping(mapping))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LockError;
    use crate::models::ModuleStatus;
    use config::{File, FileFormat};

    fn config_from_toml(toml: &str) -> Config {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let settings = LockSettings::from_config(&config_from_toml("")).unwrap();

        assert_eq!(settings.modules, default_main_modules());
        assert_eq!(settings.rules, default_rules());
        assert_eq!(settings.build_mapping().unwrap(), ModuleMapping::default());
    }

    #[test]
    fn test_settings_from_toml() {
        let toml = r#"
            [lock]
            modules = [
                { id = "1", status = "completed", levels = [{ id = 1, score = 80 }] },
                { id = "HL1", status = "available" },
            ]

            [[lock.rules]]
            id = "beta_cohort_hl1"
            module_id = "HL1"
            unlock_action = "completed"
            condition = { type = "custom", value = "beta" }

            [[lock.mapping]]
            main_id = "1"
            score_id = 1

            [[lock.mapping]]
            main_id = "HL1"
            score_id = 5
        "#;

        let settings = LockSettings::from_config(&config_from_toml(toml)).unwrap();

        assert_eq!(settings.modules.len(), 2);
        assert_eq!(settings.modules[0].status, ModuleStatus::Completed);
        assert_eq!(settings.modules[0].levels[0].score, 80);
        assert_eq!(settings.rules.len(), 1);
        assert_eq!(settings.rules[0].module_id, "HL1");

        let mapping = settings.build_mapping().unwrap();
        assert_eq!(mapping.main_id_for(5), Some("HL1"));
        assert_eq!(mapping.main_id_for(6), None);
    }

    #[test]
    fn test_invalid_mapping_is_rejected() {
        let toml = r#"
            [[lock.mapping]]
            main_id = "1"
            score_id = 9
        "#;

        let settings = LockSettings::from_config(&config_from_toml(toml)).unwrap();

        assert!(matches!(
            settings.into_dynamic_modules(),
            Err(LockError::InvalidMapping(_))
        ));
    }
}
